use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::codec::{write_varint, Encode};
use crate::error::InvalidOrderReason;
use crate::order::{OrderDetail, OrderPair, OrderSide};
use crate::params::RESERVED_DEX_ID;
use crate::tx::primitives::tx_hash::double_sha256;
use crate::tx::{
    CancelOrderTx, LimitOrderExTx, LimitOrderTx, MarketBuyOrderExTx, MarketBuyOrderTx,
    MarketSellOrderExTx, MarketSellOrderTx, OperatorParams, Secret, SettleExTx, SettleTx,
    SignaturePair, TxSignature,
};
use dex_basic_types::{RegId, TokenSymbol, TxId};

/// Wire tag of every DEX transaction. The values live inside the node-wide
/// transaction-type enumeration; the DEX block starts at 84.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DexTxType {
    LimitBuyOrder = 84,
    LimitSellOrder = 85,
    MarketBuyOrder = 86,
    MarketSellOrder = 87,
    CancelOrder = 88,
    TradeSettle = 89,
    LimitBuyOrderEx = 90,
    LimitSellOrderEx = 91,
    MarketBuyOrderEx = 92,
    MarketSellOrderEx = 93,
    TradeSettleEx = 94,
}

impl DexTxType {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            84 => DexTxType::LimitBuyOrder,
            85 => DexTxType::LimitSellOrder,
            86 => DexTxType::MarketBuyOrder,
            87 => DexTxType::MarketSellOrder,
            88 => DexTxType::CancelOrder,
            89 => DexTxType::TradeSettle,
            90 => DexTxType::LimitBuyOrderEx,
            91 => DexTxType::LimitSellOrderEx,
            92 => DexTxType::MarketBuyOrderEx,
            93 => DexTxType::MarketSellOrderEx,
            94 => DexTxType::TradeSettleEx,
            _ => return None,
        })
    }
}

/// The set of DEX transactions. Validation, hashing and execution dispatch
/// by pattern match; there is no runtime polymorphism anywhere in the
/// subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DexTx {
    BuyLimitOrder(Box<LimitOrderTx>),
    SellLimitOrder(Box<LimitOrderTx>),
    BuyMarketOrder(Box<MarketBuyOrderTx>),
    SellMarketOrder(Box<MarketSellOrderTx>),
    BuyLimitOrderEx(Box<LimitOrderExTx>),
    SellLimitOrderEx(Box<LimitOrderExTx>),
    BuyMarketOrderEx(Box<MarketBuyOrderExTx>),
    SellMarketOrderEx(Box<MarketSellOrderExTx>),
    CancelOrder(Box<CancelOrderTx>),
    Settle(Box<SettleTx>),
    SettleEx(Box<SettleExTx>),
}

impl From<CancelOrderTx> for DexTx {
    fn from(tx: CancelOrderTx) -> Self {
        Self::CancelOrder(Box::new(tx))
    }
}

impl From<SettleTx> for DexTx {
    fn from(tx: SettleTx) -> Self {
        Self::Settle(Box::new(tx))
    }
}

impl From<SettleExTx> for DexTx {
    fn from(tx: SettleExTx) -> Self {
        Self::SettleEx(Box::new(tx))
    }
}

impl DexTx {
    pub fn buy_limit(tx: LimitOrderTx) -> Self {
        Self::BuyLimitOrder(Box::new(tx))
    }

    pub fn sell_limit(tx: LimitOrderTx) -> Self {
        Self::SellLimitOrder(Box::new(tx))
    }

    pub fn buy_market(tx: MarketBuyOrderTx) -> Self {
        Self::BuyMarketOrder(Box::new(tx))
    }

    pub fn sell_market(tx: MarketSellOrderTx) -> Self {
        Self::SellMarketOrder(Box::new(tx))
    }

    pub fn buy_limit_ex(tx: LimitOrderExTx) -> Self {
        Self::BuyLimitOrderEx(Box::new(tx))
    }

    pub fn sell_limit_ex(tx: LimitOrderExTx) -> Self {
        Self::SellLimitOrderEx(Box::new(tx))
    }

    pub fn buy_market_ex(tx: MarketBuyOrderExTx) -> Self {
        Self::BuyMarketOrderEx(Box::new(tx))
    }

    pub fn sell_market_ex(tx: MarketSellOrderExTx) -> Self {
        Self::SellMarketOrderEx(Box::new(tx))
    }

    pub fn tx_type(&self) -> DexTxType {
        match self {
            DexTx::BuyLimitOrder(_) => DexTxType::LimitBuyOrder,
            DexTx::SellLimitOrder(_) => DexTxType::LimitSellOrder,
            DexTx::BuyMarketOrder(_) => DexTxType::MarketBuyOrder,
            DexTx::SellMarketOrder(_) => DexTxType::MarketSellOrder,
            DexTx::BuyLimitOrderEx(_) => DexTxType::LimitBuyOrderEx,
            DexTx::SellLimitOrderEx(_) => DexTxType::LimitSellOrderEx,
            DexTx::BuyMarketOrderEx(_) => DexTxType::MarketBuyOrderEx,
            DexTx::SellMarketOrderEx(_) => DexTxType::MarketSellOrderEx,
            DexTx::CancelOrder(_) => DexTxType::CancelOrder,
            DexTx::Settle(_) => DexTxType::TradeSettle,
            DexTx::SettleEx(_) => DexTxType::TradeSettleEx,
        }
    }

    pub fn tx_uid(&self) -> RegId {
        match self {
            DexTx::BuyLimitOrder(tx) | DexTx::SellLimitOrder(tx) => tx.tx_uid,
            DexTx::BuyMarketOrder(tx) => tx.tx_uid,
            DexTx::SellMarketOrder(tx) => tx.tx_uid,
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => tx.order.tx_uid,
            DexTx::BuyMarketOrderEx(tx) => tx.order.tx_uid,
            DexTx::SellMarketOrderEx(tx) => tx.order.tx_uid,
            DexTx::CancelOrder(tx) => tx.tx_uid,
            DexTx::Settle(tx) => tx.tx_uid,
            DexTx::SettleEx(tx) => tx.settle.tx_uid,
        }
    }

    pub fn valid_height(&self) -> u32 {
        match self {
            DexTx::BuyLimitOrder(tx) | DexTx::SellLimitOrder(tx) => tx.valid_height,
            DexTx::BuyMarketOrder(tx) => tx.valid_height,
            DexTx::SellMarketOrder(tx) => tx.valid_height,
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => tx.order.valid_height,
            DexTx::BuyMarketOrderEx(tx) => tx.order.valid_height,
            DexTx::SellMarketOrderEx(tx) => tx.order.valid_height,
            DexTx::CancelOrder(tx) => tx.valid_height,
            DexTx::Settle(tx) => tx.valid_height,
            DexTx::SettleEx(tx) => tx.settle.valid_height,
        }
    }

    pub fn signature(&self) -> &TxSignature {
        match self {
            DexTx::BuyLimitOrder(tx) | DexTx::SellLimitOrder(tx) => &tx.signature,
            DexTx::BuyMarketOrder(tx) => &tx.signature,
            DexTx::SellMarketOrder(tx) => &tx.signature,
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => &tx.order.signature,
            DexTx::BuyMarketOrderEx(tx) => &tx.order.signature,
            DexTx::SellMarketOrderEx(tx) => &tx.order.signature,
            DexTx::CancelOrder(tx) => &tx.signature,
            DexTx::Settle(tx) => &tx.signature,
            DexTx::SettleEx(tx) => &tx.settle.signature,
        }
    }

    /// Operator block of the extended order forms; `None` for everything else.
    pub fn operator_params(&self) -> Option<&OperatorParams> {
        match self {
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => Some(&tx.operator),
            DexTx::BuyMarketOrderEx(tx) => Some(&tx.operator),
            DexTx::SellMarketOrderEx(tx) => Some(&tx.operator),
            _ => None,
        }
    }

    /// Operator co-signature slot, present on every extended wire form.
    pub fn operator_signature(&self) -> Option<&SignaturePair> {
        match self {
            DexTx::SettleEx(tx) => tx.operator_signature.as_ref(),
            _ => self
                .operator_params()
                .and_then(|operator| operator.operator_signature.as_ref()),
        }
    }

    /// Check tx format
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            DexTx::BuyLimitOrder(tx) | DexTx::SellLimitOrder(tx) => tx.validate(),
            DexTx::BuyMarketOrder(tx) => tx.validate(),
            DexTx::SellMarketOrder(tx) => tx.validate(),
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => tx.validate(),
            DexTx::BuyMarketOrderEx(tx) => tx.validate(),
            DexTx::SellMarketOrderEx(tx) => tx.validate(),
            DexTx::CancelOrder(tx) => tx.validate(),
            DexTx::Settle(tx) => tx.validate(),
            DexTx::SettleEx(tx) => tx.validate(),
        }
    }

    pub fn check_correctness(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns the hash identifying the transaction; for order-placing
    /// transactions this is also the order id.
    pub fn hash(&self) -> TxId {
        double_sha256(&self.encoded())
    }

    /// The digest both the user and (in authenticated mode) the operator
    /// sign. Excludes the two signature slots; everything else a variant puts
    /// on the wire is covered, with one historical exception in the extended
    /// settle form (see `encode_sign_fields`).
    pub fn signature_digest(&self) -> TxId {
        let mut out = Vec::new();
        self.encode_sign_fields(&mut out);
        double_sha256(&out)
    }

    pub fn sign_user(&mut self, secret: &Secret) -> Result<(), anyhow::Error> {
        let signature = TxSignature::sign(secret, &self.signature_digest())?;
        *self.signature_mut() = signature;
        Ok(())
    }

    /// Attaches an operator co-signature over the same digest the user signs.
    /// Fails on variants whose wire form has no operator slot.
    pub fn sign_operator(&mut self, regid: RegId, secret: &Secret) -> Result<(), anyhow::Error> {
        let signature = TxSignature::sign(secret, &self.signature_digest())?;
        let pair = SignaturePair { regid, signature };
        match self {
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => {
                tx.operator.operator_signature = Some(pair)
            }
            DexTx::BuyMarketOrderEx(tx) => tx.operator.operator_signature = Some(pair),
            DexTx::SellMarketOrderEx(tx) => tx.operator.operator_signature = Some(pair),
            DexTx::SettleEx(tx) => tx.operator_signature = Some(pair),
            _ => anyhow::bail!("transaction form carries no operator signature slot"),
        }
        Ok(())
    }

    fn signature_mut(&mut self) -> &mut TxSignature {
        match self {
            DexTx::BuyLimitOrder(tx) | DexTx::SellLimitOrder(tx) => &mut tx.signature,
            DexTx::BuyMarketOrder(tx) => &mut tx.signature,
            DexTx::SellMarketOrder(tx) => &mut tx.signature,
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => &mut tx.order.signature,
            DexTx::BuyMarketOrderEx(tx) => &mut tx.order.signature,
            DexTx::SellMarketOrderEx(tx) => &mut tx.order.signature,
            DexTx::CancelOrder(tx) => &mut tx.signature,
            DexTx::Settle(tx) => &mut tx.signature,
            DexTx::SettleEx(tx) => &mut tx.settle.signature,
        }
    }

    /// The order record an order-placing variant creates; `None` for cancel
    /// and settle. `tx_cord` stays empty until the executor assigns it.
    pub fn to_order_detail(&self) -> Option<Result<OrderDetail, InvalidOrderReason>> {
        match self {
            DexTx::BuyLimitOrder(tx) => Some(limit_order_detail(tx, OrderSide::Buy, None)),
            DexTx::SellLimitOrder(tx) => Some(limit_order_detail(tx, OrderSide::Sell, None)),
            DexTx::BuyMarketOrder(tx) => Some(market_buy_order_detail(tx, None)),
            DexTx::SellMarketOrder(tx) => Some(market_sell_order_detail(tx, None)),
            DexTx::BuyLimitOrderEx(tx) => {
                Some(limit_order_detail(&tx.order, OrderSide::Buy, Some(&tx.operator)))
            }
            DexTx::SellLimitOrderEx(tx) => {
                Some(limit_order_detail(&tx.order, OrderSide::Sell, Some(&tx.operator)))
            }
            DexTx::BuyMarketOrderEx(tx) => {
                Some(market_buy_order_detail(&tx.order, Some(&tx.operator)))
            }
            DexTx::SellMarketOrderEx(tx) => {
                Some(market_sell_order_detail(&tx.order, Some(&tx.operator)))
            }
            DexTx::CancelOrder(_) | DexTx::Settle(_) | DexTx::SettleEx(_) => None,
        }
    }

    /// Serializes the fields covered by the signature digest, in wire order,
    /// with the tx type folded in after the version.
    fn encode_sign_fields(&self, out: &mut Vec<u8>) {
        match self {
            DexTx::BuyLimitOrder(tx) | DexTx::SellLimitOrder(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.version,
                    tx.valid_height,
                    tx.tx_uid,
                    &tx.fee_symbol,
                    tx.fees,
                );
                tx.coin_symbol.encode(out);
                tx.asset_symbol.encode(out);
                write_varint(out, tx.asset_amount);
                write_varint(out, tx.price);
            }
            DexTx::BuyMarketOrder(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.version,
                    tx.valid_height,
                    tx.tx_uid,
                    &tx.fee_symbol,
                    tx.fees,
                );
                tx.coin_symbol.encode(out);
                tx.asset_symbol.encode(out);
                write_varint(out, tx.coin_amount);
            }
            DexTx::SellMarketOrder(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.version,
                    tx.valid_height,
                    tx.tx_uid,
                    &tx.fee_symbol,
                    tx.fees,
                );
                tx.coin_symbol.encode(out);
                tx.asset_symbol.encode(out);
                write_varint(out, tx.asset_amount);
            }
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.order.version,
                    tx.order.valid_height,
                    tx.order.tx_uid,
                    &tx.order.fee_symbol,
                    tx.order.fees,
                );
                sign_operator_head(out, &tx.operator);
                tx.order.coin_symbol.encode(out);
                tx.order.asset_symbol.encode(out);
                write_varint(out, tx.order.asset_amount);
                write_varint(out, tx.order.price);
                sign_operator_tail(out, &tx.operator);
            }
            DexTx::BuyMarketOrderEx(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.order.version,
                    tx.order.valid_height,
                    tx.order.tx_uid,
                    &tx.order.fee_symbol,
                    tx.order.fees,
                );
                sign_operator_head(out, &tx.operator);
                tx.order.coin_symbol.encode(out);
                tx.order.asset_symbol.encode(out);
                write_varint(out, tx.order.coin_amount);
                sign_operator_tail(out, &tx.operator);
            }
            DexTx::SellMarketOrderEx(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.order.version,
                    tx.order.valid_height,
                    tx.order.tx_uid,
                    &tx.order.fee_symbol,
                    tx.order.fees,
                );
                sign_operator_head(out, &tx.operator);
                tx.order.coin_symbol.encode(out);
                tx.order.asset_symbol.encode(out);
                write_varint(out, tx.order.asset_amount);
                sign_operator_tail(out, &tx.operator);
            }
            DexTx::CancelOrder(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.version,
                    tx.valid_height,
                    tx.tx_uid,
                    &tx.fee_symbol,
                    tx.fees,
                );
                tx.order_id.encode(out);
            }
            DexTx::Settle(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.version,
                    tx.valid_height,
                    tx.tx_uid,
                    &tx.fee_symbol,
                    tx.fees,
                );
                tx.deal_items.encode(out);
            }
            DexTx::SettleEx(tx) => {
                sign_prefix(
                    out,
                    self.tx_type(),
                    tx.settle.version,
                    tx.settle.valid_height,
                    tx.settle.tx_uid,
                    &tx.settle.fee_symbol,
                    tx.settle.fees,
                );
                // dex_id and memo travel on the wire but are NOT covered by
                // the digest, so a matcher can rewrite both under an existing
                // signature. Kept as-is: changing the digest invalidates every
                // signed settle in the wild.
                // TODO: fold dex_id and memo into the digest at the next tx
                // version bump.
                tx.settle.deal_items.encode(out);
            }
        }
    }
}

fn sign_prefix(
    out: &mut Vec<u8>,
    tx_type: DexTxType,
    version: u32,
    valid_height: u32,
    tx_uid: RegId,
    fee_symbol: &TokenSymbol,
    fees: u64,
) {
    write_varint(out, version as u64);
    out.push(tx_type.as_byte());
    write_varint(out, valid_height as u64);
    tx_uid.encode(out);
    fee_symbol.encode(out);
    write_varint(out, fees);
}

fn sign_operator_head(out: &mut Vec<u8>, operator: &OperatorParams) {
    operator.mode.encode(out);
    write_varint(out, *operator.dex_id as u64);
    write_varint(out, operator.operator_fee_ratio);
}

fn sign_operator_tail(out: &mut Vec<u8>, operator: &OperatorParams) {
    operator.memo.encode(out);
    operator.operator_regid.encode(out);
}

fn limit_order_detail(
    tx: &LimitOrderTx,
    side: OrderSide,
    operator: Option<&OperatorParams>,
) -> Result<OrderDetail, InvalidOrderReason> {
    let pair = OrderPair {
        coin_symbol: tx.coin_symbol.clone(),
        asset_symbol: tx.asset_symbol.clone(),
    };
    let dex_id = operator.map(|o| o.dex_id).unwrap_or(RESERVED_DEX_ID);
    let mut order = match side {
        OrderSide::Buy => OrderDetail::user_buy_limit(dex_id, pair, tx.asset_amount, tx.price)?,
        OrderSide::Sell => OrderDetail::user_sell_limit(dex_id, pair, tx.asset_amount, tx.price)?,
    };
    apply_operator_fields(&mut order, tx.tx_uid, operator);
    Ok(order)
}

fn market_buy_order_detail(
    tx: &MarketBuyOrderTx,
    operator: Option<&OperatorParams>,
) -> Result<OrderDetail, InvalidOrderReason> {
    let pair = OrderPair {
        coin_symbol: tx.coin_symbol.clone(),
        asset_symbol: tx.asset_symbol.clone(),
    };
    let dex_id = operator.map(|o| o.dex_id).unwrap_or(RESERVED_DEX_ID);
    let mut order = OrderDetail::user_buy_market(dex_id, pair, tx.coin_amount)?;
    apply_operator_fields(&mut order, tx.tx_uid, operator);
    Ok(order)
}

fn market_sell_order_detail(
    tx: &MarketSellOrderTx,
    operator: Option<&OperatorParams>,
) -> Result<OrderDetail, InvalidOrderReason> {
    let pair = OrderPair {
        coin_symbol: tx.coin_symbol.clone(),
        asset_symbol: tx.asset_symbol.clone(),
    };
    let dex_id = operator.map(|o| o.dex_id).unwrap_or(RESERVED_DEX_ID);
    let mut order = OrderDetail::user_sell_market(dex_id, pair, tx.asset_amount)?;
    apply_operator_fields(&mut order, tx.tx_uid, operator);
    Ok(order)
}

fn apply_operator_fields(order: &mut OrderDetail, tx_uid: RegId, operator: Option<&OperatorParams>) {
    order.user_regid = tx_uid;
    if let Some(operator) = operator {
        order.mode = operator.mode;
        order.operator_fee_ratio = operator.operator_fee_ratio;
    }
}
