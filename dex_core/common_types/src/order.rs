//! Order entities: the full order record and the compact active-order index entry.

use serde::{Deserialize, Serialize};

use crate::error::InvalidOrderReason;
use crate::helpers::coin_amount_of;
use dex_basic_types::{DexId, RegId, TokenSymbol, TxCord};

/// Which side of the book an order sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy = 1,
    Sell = 2,
}

/// Pricing discipline of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    LimitPrice = 1,
    MarketPrice = 2,
}

/// How an order came into existence. `SystemGen` orders are created by
/// protocol-internal operations and carry a synthetic user regid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderGenerateType {
    Empty = 0,
    UserGen = 1,
    SystemGen = 2,
}

/// Per-order authorization model. `Default` forbids an operator fee ratio;
/// `RequireAuth` requires an operator co-signature and permits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorMode {
    Default = 0,
    RequireAuth = 1,
}

impl Default for OrderSide {
    fn default() -> Self {
        OrderSide::Buy
    }
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::LimitPrice
    }
}

impl Default for OrderGenerateType {
    fn default() -> Self {
        OrderGenerateType::Empty
    }
}

impl Default for OperatorMode {
    fn default() -> Self {
        OperatorMode::Default
    }
}

/// The full record of an accepted order.
///
/// Owned by the originating transaction record inside the block; the state
/// store keeps a copy keyed by order id so settlement and cancel can re-read
/// it without touching the block store.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub mode: OperatorMode,
    pub dex_id: DexId,
    pub operator_fee_ratio: u64,
    pub generate_type: OrderGenerateType,
    pub order_type: OrderType,
    pub order_side: OrderSide,
    pub coin_symbol: TokenSymbol,
    pub asset_symbol: TokenSymbol,
    pub coin_amount: u64,
    pub asset_amount: u64,
    pub price: u64,
    pub tx_cord: TxCord,
    pub user_regid: RegId,
    pub total_deal_coin_amount: u64,
    pub total_deal_asset_amount: u64,
}

/// Pair/amount arguments shared by every order constructor.
#[derive(Debug, Clone)]
pub struct OrderPair {
    pub coin_symbol: TokenSymbol,
    pub asset_symbol: TokenSymbol,
}

impl OrderDetail {
    /// Buy-limit order. The coin side to freeze is derived from the asset
    /// amount and the price at construction time, rounded up.
    pub fn user_buy_limit(
        dex_id: DexId,
        pair: OrderPair,
        asset_amount: u64,
        price: u64,
    ) -> Result<Self, InvalidOrderReason> {
        if asset_amount == 0 {
            return Err(InvalidOrderReason::AmountOutOfRange);
        }
        if price == 0 {
            return Err(InvalidOrderReason::PriceOutOfRange);
        }
        let coin_amount =
            coin_amount_of(asset_amount, price).ok_or(InvalidOrderReason::AmountOutOfRange)?;
        Ok(Self {
            dex_id,
            generate_type: OrderGenerateType::UserGen,
            order_type: OrderType::LimitPrice,
            order_side: OrderSide::Buy,
            coin_symbol: pair.coin_symbol,
            asset_symbol: pair.asset_symbol,
            coin_amount,
            asset_amount,
            price,
            ..Default::default()
        })
    }

    /// Sell-limit order. The coin amount stays zero; the asset side is frozen.
    pub fn user_sell_limit(
        dex_id: DexId,
        pair: OrderPair,
        asset_amount: u64,
        price: u64,
    ) -> Result<Self, InvalidOrderReason> {
        if asset_amount == 0 {
            return Err(InvalidOrderReason::AmountOutOfRange);
        }
        if price == 0 {
            return Err(InvalidOrderReason::PriceOutOfRange);
        }
        Ok(Self {
            dex_id,
            generate_type: OrderGenerateType::UserGen,
            order_type: OrderType::LimitPrice,
            order_side: OrderSide::Sell,
            coin_symbol: pair.coin_symbol,
            asset_symbol: pair.asset_symbol,
            asset_amount,
            price,
            ..Default::default()
        })
    }

    /// Market buy order: spends a fixed coin amount, asset amount and price zero.
    pub fn user_buy_market(
        dex_id: DexId,
        pair: OrderPair,
        coin_amount: u64,
    ) -> Result<Self, InvalidOrderReason> {
        if coin_amount == 0 {
            return Err(InvalidOrderReason::AmountOutOfRange);
        }
        Ok(Self {
            dex_id,
            generate_type: OrderGenerateType::UserGen,
            order_type: OrderType::MarketPrice,
            order_side: OrderSide::Buy,
            coin_symbol: pair.coin_symbol,
            asset_symbol: pair.asset_symbol,
            coin_amount,
            ..Default::default()
        })
    }

    /// Market sell order: sells a fixed asset amount, coin amount and price zero.
    pub fn user_sell_market(
        dex_id: DexId,
        pair: OrderPair,
        asset_amount: u64,
    ) -> Result<Self, InvalidOrderReason> {
        if asset_amount == 0 {
            return Err(InvalidOrderReason::AmountOutOfRange);
        }
        Ok(Self {
            dex_id,
            generate_type: OrderGenerateType::UserGen,
            order_type: OrderType::MarketPrice,
            order_side: OrderSide::Sell,
            coin_symbol: pair.coin_symbol,
            asset_symbol: pair.asset_symbol,
            asset_amount,
            ..Default::default()
        })
    }

    /// Market buy order generated by a protocol-internal operation
    /// (e.g. collateral liquidation) on behalf of a synthetic account.
    pub fn system_buy_market(
        dex_id: DexId,
        pair: OrderPair,
        coin_amount: u64,
        user_regid: RegId,
    ) -> Result<Self, InvalidOrderReason> {
        let mut order = Self::user_buy_market(dex_id, pair, coin_amount)?;
        order.generate_type = OrderGenerateType::SystemGen;
        order.user_regid = user_regid;
        Ok(order)
    }

    pub fn is_buy(&self) -> bool {
        self.order_side == OrderSide::Buy
    }

    pub fn is_limit(&self) -> bool {
        self.order_type == OrderType::LimitPrice
    }

    /// Symbol whose balance was frozen when this order was placed.
    pub fn frozen_symbol(&self) -> &TokenSymbol {
        if self.is_buy() {
            &self.coin_symbol
        } else {
            &self.asset_symbol
        }
    }

    /// Amount frozen when this order was placed. For buy-limit orders
    /// `coin_amount` already holds the rounded-up coin value of the order.
    pub fn frozen_amount(&self) -> u64 {
        if self.is_buy() {
            self.coin_amount
        } else {
            self.asset_amount
        }
    }

    /// Frozen balance not yet consumed by settlement.
    pub fn residual_frozen(&self) -> u64 {
        if self.is_buy() {
            self.coin_amount.saturating_sub(self.total_deal_coin_amount)
        } else {
            self.asset_amount
                .saturating_sub(self.total_deal_asset_amount)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.generate_type == OrderGenerateType::Empty
            && self.coin_symbol.is_empty()
            && self.asset_symbol.is_empty()
            && self.coin_amount == 0
            && self.asset_amount == 0
    }

    pub fn set_empty(&mut self) {
        *self = Self::default();
    }
}

/// Compact index entry of an order that is accepted and not yet retired.
///
/// Holds only the mutable deal progress; the full [`OrderDetail`] is re-read
/// from the originating transaction. Created on placement, removed on full
/// fill or cancel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrder {
    pub generate_type: OrderGenerateType,
    pub tx_cord: TxCord,
    pub total_deal_coin_amount: u64,
    pub total_deal_asset_amount: u64,
}

impl ActiveOrder {
    pub fn new(generate_type: OrderGenerateType, tx_cord: TxCord) -> Self {
        Self {
            generate_type,
            tx_cord,
            total_deal_coin_amount: 0,
            total_deal_asset_amount: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.generate_type == OrderGenerateType::Empty
            && self.tx_cord.is_empty()
            && self.total_deal_coin_amount == 0
            && self.total_deal_asset_amount == 0
    }

    pub fn set_empty(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> OrderPair {
        OrderPair {
            coin_symbol: "WUSD".into(),
            asset_symbol: "WICC".into(),
        }
    }

    #[test]
    fn buy_limit_derives_rounded_up_coin_amount() {
        let order =
            OrderDetail::user_buy_limit(DexId(1), pair(), 10, 1_000_000_000).unwrap();
        assert_eq!(order.coin_amount, 100);
        assert_eq!(order.frozen_amount(), 100);
        assert_eq!(order.frozen_symbol().as_str(), "WUSD");

        // 1 sawi at price 1 is worth less than one coin sawi, still freezes 1.
        let dust = OrderDetail::user_buy_limit(DexId(1), pair(), 1, 1).unwrap();
        assert_eq!(dust.coin_amount, 1);
    }

    #[test]
    fn limit_constructors_refuse_degenerate_values() {
        assert_eq!(
            OrderDetail::user_buy_limit(DexId(1), pair(), 10, 0),
            Err(InvalidOrderReason::PriceOutOfRange)
        );
        assert_eq!(
            OrderDetail::user_sell_limit(DexId(1), pair(), 0, 10),
            Err(InvalidOrderReason::AmountOutOfRange)
        );
        assert_eq!(
            OrderDetail::user_buy_market(DexId(1), pair(), 0),
            Err(InvalidOrderReason::AmountOutOfRange)
        );
    }

    #[test]
    fn market_orders_zero_the_unused_side() {
        let buy = OrderDetail::user_buy_market(DexId(1), pair(), 500).unwrap();
        assert_eq!((buy.asset_amount, buy.price), (0, 0));
        assert_eq!(buy.frozen_amount(), 500);

        let sell = OrderDetail::user_sell_market(DexId(1), pair(), 500).unwrap();
        assert_eq!((sell.coin_amount, sell.price), (0, 0));
        assert_eq!(sell.frozen_symbol().as_str(), "WICC");
    }

    #[test]
    fn emptiness_is_idempotent() {
        let mut order =
            OrderDetail::user_sell_limit(DexId(1), pair(), 10, 1_000_000_000).unwrap();
        assert!(!order.is_empty());
        order.set_empty();
        assert!(order.is_empty());
        order.set_empty();
        assert!(order.is_empty());

        let mut active = ActiveOrder::new(OrderGenerateType::UserGen, TxCord::new(5, 1));
        assert!(!active.is_empty());
        active.set_empty();
        active.set_empty();
        assert!(active.is_empty());
    }
}
