//! DEX transactions and their authorization primitives.

mod cancel;
mod dex_tx;
mod order_tx;
mod primitives;
mod settle;

pub mod validators;

// Re-export transactions.
#[doc(hidden)]
pub use self::{
    cancel::CancelOrderTx,
    dex_tx::{DexTx, DexTxType},
    order_tx::{
        LimitOrderExTx, LimitOrderTx, MarketBuyOrderExTx, MarketBuyOrderTx, MarketSellOrderExTx,
        MarketSellOrderTx, OperatorParams,
    },
    settle::{DealItem, SettleExTx, SettleTx},
};

// Re-export primitives associated with transactions.
pub use self::primitives::{
    signature::{keypair_from_seed, AccountPubKey, SignaturePair, TxSignature},
    tx_hash::double_sha256,
    KeyPair, Public, Secret,
};
