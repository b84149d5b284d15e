//! State-transition layer of the DEX subsystem.
//!
//! [`DexState`] is the per-block cache view over the external stores (account
//! store, active-order index, operator and asset registries). Handlers first
//! build a fully-validated operation plan, then apply it; the enclosing node
//! commits or discards the whole cache with the block.

pub mod handler;
pub mod state;


pub use handler::{CancelOrder, OpSuccess, PlaceOrder, SettleOrders, TxHandler};
pub use state::DexState;
