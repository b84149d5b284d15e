//! Block-pipeline entry point of the DEX transaction subsystem.
//!
//! The enclosing node hands every DEX-tagged transaction blob to
//! [`DexExecutor`], which decodes it with the consensus codec, verifies the
//! user (and, in authenticated mode, operator) signatures, runs the
//! validation gauntlet and executes the state transition. Execution is
//! single-threaded and deterministic: transactions apply in block order, one
//! at a time, inside a per-block state cache the node commits or discards
//! wholesale.

mod executor;

pub use executor::DexExecutor;

pub use dex_state::{DexState, OpSuccess};
pub use dex_types::{DexError, DexTx, DexTxType};
