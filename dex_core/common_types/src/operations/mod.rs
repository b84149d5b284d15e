//! Operation wrappers: the fully-validated execution plans the state handlers
//! build from a transaction before touching any balance.
//!
//! A handler first turns a transaction into one of these (re-running every
//! stateful check), then applies it. The split keeps settlement all-or-nothing:
//! a settle plan either exists in full or the transaction is rejected with no
//! effects.

use serde::{Deserialize, Serialize};

use crate::operator::DexOperator;
use crate::order::{ActiveOrder, OrderDetail, OrderSide};
use dex_basic_types::{DexId, RegId, TokenSymbol, TxId};

/// Plan for placing one order: the validated record plus the id it will be
/// stored under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderOp {
    pub order: OrderDetail,
    pub order_id: TxId,
}

/// Plan for cancelling an open order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrderOp {
    pub order_id: TxId,
    pub order: OrderDetail,
    pub active: ActiveOrder,
    /// Frozen balance returned to the owner: the original freeze minus the
    /// already-settled side.
    pub refund: u64,
}

/// One fully-checked deal of a settle plan, with fees and completion already
/// decided.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealExecution {
    pub buy_order_id: TxId,
    pub sell_order_id: TxId,
    pub buyer: RegId,
    pub seller: RegId,
    pub coin_symbol: TokenSymbol,
    pub asset_symbol: TokenSymbol,
    pub deal_price: u64,
    pub deal_coin_amount: u64,
    pub deal_asset_amount: u64,
    /// Which side pays the taker ratio this deal.
    pub taker_side: OrderSide,
    /// Buyer fee, charged in asset; seller fee, charged in coin.
    pub buyer_fee: u64,
    pub seller_fee: u64,
    pub buy_complete: bool,
    pub sell_complete: bool,
    /// Residual coin unfrozen back to the buyer when its order completes
    /// (market-buy dust or rounding slack of a filled buy-limit).
    pub buy_residual_refund: u64,
}

/// Plan for a whole settle transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleOp {
    pub dex_id: DexId,
    pub submitter: RegId,
    /// Operator the fees accrue to; synthesized for the reserved dex.
    pub operator: DexOperator,
    pub executions: Vec<DealExecution>,
}

/// Executed-operation wrapper returned to the block pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DexOp {
    PlaceOrder(Box<PlaceOrderOp>),
    CancelOrder(Box<CancelOrderOp>),
    Settle(Box<SettleOp>),
}

impl From<PlaceOrderOp> for DexOp {
    fn from(op: PlaceOrderOp) -> Self {
        Self::PlaceOrder(Box::new(op))
    }
}

impl From<CancelOrderOp> for DexOp {
    fn from(op: CancelOrderOp) -> Self {
        Self::CancelOrder(Box::new(op))
    }
}

impl From<SettleOp> for DexOp {
    fn from(op: SettleOp) -> Self {
        Self::Settle(Box::new(op))
    }
}
