//! Entity model, wire codec and transaction definitions of the DEX subsystem.
//!
//! Everything here is a pure value layer: constructors enforce cross-field
//! rules at construction time, the codec pins the consensus byte layout, and
//! the transaction types carry their own signature-digest rules. State lives
//! in the `dex_state` crate.

pub mod account;
pub mod asset;
pub mod codec;
pub mod error;
pub mod helpers;
pub mod operations;
pub mod operator;
pub mod order;
pub mod params;
pub mod tx;

pub use account::{Account, AccountUpdate, AccountUpdates, TokenBalance};
pub use asset::AssetInfo;
pub use codec::{Decode, Encode};
pub use error::{CodecError, DexError, InvalidOrderReason, SettleError, TxError};
pub use operator::DexOperator;
pub use order::{
    ActiveOrder, OperatorMode, OrderDetail, OrderGenerateType, OrderPair, OrderSide, OrderType,
};
pub use tx::{
    AccountPubKey, CancelOrderTx, DealItem, DexTx, DexTxType, LimitOrderExTx, LimitOrderTx,
    MarketBuyOrderExTx, MarketBuyOrderTx, MarketSellOrderExTx, MarketSellOrderTx, OperatorParams,
    SettleExTx, SettleTx, SignaturePair, TxSignature,
};

pub use dex_basic_types::{BlockHeight, DexId, RegId, TokenSymbol, TxCord, TxId};
