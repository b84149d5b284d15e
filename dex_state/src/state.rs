use std::collections::HashMap;

use dex_types::params::OPERATOR_FEE_RATIO_MAX;
use dex_types::{
    Account, ActiveOrder, AssetInfo, DexOperator, InvalidOrderReason, OperatorMode, OrderDetail,
    OrderSide, OrderType,
};
use dex_basic_types::{DexId, RegId, TokenSymbol, TxId};

/// Per-block cache view over the stores the DEX core touches.
///
/// All reads see writes made earlier in the same block; the enclosing node
/// owns commit and rollback. The subsystem keeps no state of its own between
/// transactions.
#[derive(Debug, Default, Clone)]
pub struct DexState {
    accounts: HashMap<RegId, Account>,
    active_orders: HashMap<TxId, ActiveOrder>,
    order_details: HashMap<TxId, OrderDetail>,
    operators: HashMap<DexId, DexOperator>,
    assets: HashMap<TokenSymbol, AssetInfo>,
}

impl DexState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register_asset(&mut self, asset: AssetInfo) {
        self.assets.insert(asset.symbol.clone(), asset);
    }

    pub fn register_operator(&mut self, dex_id: DexId, operator: DexOperator) {
        self.operators.insert(dex_id, operator);
    }

    pub fn asset_info(&self, symbol: &TokenSymbol) -> Option<&AssetInfo> {
        self.assets.get(symbol)
    }

    /// Operator record for a dex. The reserved dex has no persisted record;
    /// its implicit operator is synthesized.
    pub fn get_operator(&self, dex_id: DexId) -> Option<DexOperator> {
        if dex_id.is_reserved() {
            return Some(DexOperator::reserved());
        }
        self.operators.get(&dex_id).cloned()
    }

    pub fn get_account(&self, regid: RegId) -> Option<Account> {
        self.accounts.get(&regid).cloned()
    }

    pub fn insert_account(&mut self, regid: RegId, account: Account) {
        self.accounts.insert(regid, account);
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&RegId, &Account)> {
        self.accounts.iter()
    }

    pub fn get_active_order(&self, order_id: &TxId) -> Option<ActiveOrder> {
        self.active_orders.get(order_id).copied()
    }

    pub fn insert_active_order(&mut self, order_id: TxId, active: ActiveOrder) {
        self.active_orders.insert(order_id, active);
    }

    pub fn remove_active_order(&mut self, order_id: &TxId) {
        self.active_orders.remove(order_id);
    }

    pub fn active_orders(&self) -> impl Iterator<Item = (&TxId, &ActiveOrder)> {
        self.active_orders.iter()
    }

    pub fn get_order_detail(&self, order_id: &TxId) -> Option<OrderDetail> {
        self.order_details.get(order_id).cloned()
    }

    pub fn insert_order_detail(&mut self, order_id: TxId, order: OrderDetail) {
        self.order_details.insert(order_id, order);
    }

    pub fn remove_order_detail(&mut self, order_id: &TxId) {
        self.order_details.remove(order_id);
    }

    /// Re-reads an open order with its deal progress overlaid from the active
    /// index. The stored detail keeps the totals it was persisted with; the
    /// active entry is authoritative for progress.
    pub fn load_open_order(&self, order_id: &TxId) -> Option<(OrderDetail, ActiveOrder)> {
        let active = self.get_active_order(order_id)?;
        let mut detail = self.get_order_detail(order_id)?;
        detail.total_deal_coin_amount = active.total_deal_coin_amount;
        detail.total_deal_asset_amount = active.total_deal_asset_amount;
        Some((detail, active))
    }

    /// The static validation gauntlet every order passes before execution.
    /// Each failure maps to its own reason so relay policy can react per kind.
    pub fn validate_order(&self, order: &OrderDetail) -> Result<(), InvalidOrderReason> {
        // 1. symbol whitelist, per-side permission, distinct pair
        if order.coin_symbol == order.asset_symbol {
            return Err(InvalidOrderReason::SameSymbol);
        }
        let coin = self
            .asset_info(&order.coin_symbol)
            .filter(|info| info.coin_permitted)
            .ok_or(InvalidOrderReason::UnknownSymbol)?;
        let asset = self
            .asset_info(&order.asset_symbol)
            .filter(|info| info.asset_permitted)
            .ok_or(InvalidOrderReason::UnknownSymbol)?;

        // 2. amount ranges against the per-symbol maxima
        match (order.order_side, order.order_type) {
            (OrderSide::Buy, OrderType::MarketPrice) => {
                if order.coin_amount == 0 || order.coin_amount > coin.max_amount {
                    return Err(InvalidOrderReason::AmountOutOfRange);
                }
            }
            _ => {
                if order.asset_amount == 0 || order.asset_amount > asset.max_amount {
                    return Err(InvalidOrderReason::AmountOutOfRange);
                }
                if order.coin_amount > coin.max_amount {
                    return Err(InvalidOrderReason::AmountOutOfRange);
                }
            }
        }

        // 3. price window of the pair (limit orders only); the asset-side
        // registry record carries the window
        if order.order_type == OrderType::LimitPrice
            && (order.price < asset.min_price || order.price > asset.max_price)
        {
            return Err(InvalidOrderReason::PriceOutOfRange);
        }

        // 4. operator existence
        let operator = self
            .get_operator(order.dex_id)
            .ok_or(InvalidOrderReason::UnknownDexOperator)?;

        // 5. mode-dependent fee policy
        match order.mode {
            OperatorMode::Default => {
                if order.operator_fee_ratio != 0 {
                    return Err(InvalidOrderReason::ModeFeeMismatch);
                }
            }
            OperatorMode::RequireAuth => {
                let ceiling =
                    OPERATOR_FEE_RATIO_MAX.min(operator.maker_fee_ratio + operator.taker_fee_ratio);
                if order.operator_fee_ratio > ceiling {
                    return Err(InvalidOrderReason::FeeRatioOutOfRange);
                }
            }
        }

        Ok(())
    }
}
