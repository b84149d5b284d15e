use std::collections::HashMap;

use crate::handler::TxHandler;
use crate::state::DexState;
use dex_types::helpers::{coin_amount_of, fee_of};
use dex_types::operations::{DealExecution, SettleOp};
use dex_types::params::MIN_VIABLE_TRADE;
use dex_types::{
    Account, AccountUpdate, AccountUpdates, DealItem, DexError, OperatorMode, OrderDetail,
    OrderSide, OrderType, SettleError, TxError,
};
use dex_basic_types::{DexId, RegId, TxId};

/// A settle transaction reduced to its matching payload. The executor has
/// already verified the submitter signature; dispatcher authorization against
/// the dex matcher happens here.
#[derive(Debug, Clone)]
pub struct SettleOrders {
    pub dex_id: DexId,
    pub submitter: RegId,
    pub deal_items: Vec<DealItem>,
}

/// Orders as seen while planning: later deal items must observe the fills of
/// earlier ones, and a side retired mid-transaction is gone for the rest.
type Scratch = HashMap<TxId, Option<OrderDetail>>;

impl TxHandler<SettleOrders> for DexState {
    type Op = SettleOp;

    fn create_op(&self, tx: SettleOrders) -> Result<Self::Op, DexError> {
        let operator = self
            .get_operator(tx.dex_id)
            .ok_or(SettleError::UnauthorizedMatcher)?;
        if tx.submitter != operator.match_regid {
            return Err(SettleError::UnauthorizedMatcher.into());
        }

        let mut scratch: Scratch = HashMap::new();
        let mut executions = Vec::with_capacity(tx.deal_items.len());
        for (i, item) in tx.deal_items.iter().enumerate() {
            let execution = self.plan_deal(&tx, &operator, &mut scratch, i, item)?;
            executions.push(execution);
        }

        Ok(SettleOp {
            dex_id: tx.dex_id,
            submitter: tx.submitter,
            operator,
            executions,
        })
    }

    fn apply_op(&mut self, op: &mut Self::Op) -> Result<AccountUpdates, DexError> {
        let mut updates = vec![];
        for execution in &op.executions {
            self.apply_deal(&op.operator.owner_regid, execution, &mut updates)?;
        }
        tracing::debug!(
            dex_id = %op.dex_id,
            deals = op.executions.len(),
            "settled dex deals"
        );
        Ok(updates)
    }
}

impl DexState {
    fn plan_deal(
        &self,
        tx: &SettleOrders,
        operator: &dex_types::DexOperator,
        scratch: &mut Scratch,
        i: usize,
        item: &DealItem,
    ) -> Result<DealExecution, DexError> {
        // 1. both orders must be open, also with respect to earlier items
        let buy = self
            .fetch_planned(scratch, &item.buy_order_id)
            .ok_or(SettleError::OrderNotFound(i))?;
        let sell = self
            .fetch_planned(scratch, &item.sell_order_id)
            .ok_or(SettleError::OrderNotFound(i))?;

        // 2. every order of the deal belongs to the settling dex
        if buy.dex_id != tx.dex_id || sell.dex_id != tx.dex_id {
            return Err(SettleError::DexMismatch(i).into());
        }

        // 3. one buy against one sell
        if buy.order_side != OrderSide::Buy || sell.order_side != OrderSide::Sell {
            return Err(SettleError::BadSide(i).into());
        }

        // 4. identical trading pair
        if buy.coin_symbol != sell.coin_symbol || buy.asset_symbol != sell.asset_symbol {
            return Err(SettleError::SymbolMismatch(i).into());
        }

        // 5. deal price feasibility per order-type pairing
        let feasible = match (buy.order_type, sell.order_type) {
            (OrderType::LimitPrice, OrderType::LimitPrice) => {
                sell.price <= item.deal_price && item.deal_price <= buy.price
            }
            (OrderType::LimitPrice, OrderType::MarketPrice) => item.deal_price == buy.price,
            (OrderType::MarketPrice, OrderType::LimitPrice) => item.deal_price == sell.price,
            (OrderType::MarketPrice, OrderType::MarketPrice) => {
                return Err(SettleError::BothMarket(i).into())
            }
        };
        if !feasible {
            return Err(SettleError::PriceInfeasible(i).into());
        }

        // 6. the coin leg must be exactly the rounded-up value of the asset leg
        if item.deal_asset_amount == 0
            || coin_amount_of(item.deal_asset_amount, item.deal_price)
                != Some(item.deal_coin_amount)
        {
            return Err(SettleError::FillIncoherent(i).into());
        }

        // 7. remaining capacity of both sides
        let buy_deal_coin = buy
            .total_deal_coin_amount
            .checked_add(item.deal_coin_amount)
            .ok_or(SettleError::OverFill(i))?;
        let buy_deal_asset = buy
            .total_deal_asset_amount
            .checked_add(item.deal_asset_amount)
            .ok_or(SettleError::OverFill(i))?;
        let sell_deal_asset = sell
            .total_deal_asset_amount
            .checked_add(item.deal_asset_amount)
            .ok_or(SettleError::OverFill(i))?;
        let buy_within = match buy.order_type {
            OrderType::LimitPrice => {
                buy_deal_asset <= buy.asset_amount && buy_deal_coin <= buy.coin_amount
            }
            OrderType::MarketPrice => buy_deal_coin <= buy.coin_amount,
        };
        if !buy_within || sell_deal_asset > sell.asset_amount {
            return Err(SettleError::OverFill(i).into());
        }

        // 8. the later order takes liquidity; on a cord tie the buy side does
        let taker_side = if buy.tx_cord >= sell.tx_cord {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };

        // 9. fee ratios: authenticated orders carry their own, the rest use
        // the operator's maker/taker split
        let buyer_ratio = side_fee_ratio(&buy, taker_side == OrderSide::Buy, operator);
        let seller_ratio = side_fee_ratio(&sell, taker_side == OrderSide::Sell, operator);
        let buyer_fee = fee_of(item.deal_asset_amount, buyer_ratio);
        let seller_fee = fee_of(item.deal_coin_amount, seller_ratio);

        // project the fills and decide completion
        let mut buy_next = buy;
        buy_next.total_deal_coin_amount = buy_deal_coin;
        buy_next.total_deal_asset_amount = buy_deal_asset;
        let (buy_complete, buy_residual_refund) = match buy_next.order_type {
            OrderType::LimitPrice => {
                let residual_asset = buy_next.asset_amount - buy_deal_asset;
                let residual_coin = buy_next.coin_amount - buy_deal_coin;
                if residual_asset == 0 || residual_coin == 0 {
                    (true, residual_coin)
                } else {
                    (false, 0)
                }
            }
            OrderType::MarketPrice => {
                let residual_coin = buy_next.coin_amount - buy_deal_coin;
                // below the viable floor the rest is unfillable dust
                if residual_coin < MIN_VIABLE_TRADE {
                    (true, residual_coin)
                } else {
                    (false, 0)
                }
            }
        };

        let mut sell_next = sell;
        sell_next.total_deal_asset_amount = sell_deal_asset;
        sell_next.total_deal_coin_amount = sell_next
            .total_deal_coin_amount
            .checked_add(item.deal_coin_amount)
            .ok_or(SettleError::OverFill(i))?;
        let sell_complete = sell_deal_asset == sell_next.asset_amount;

        let execution = DealExecution {
            buy_order_id: item.buy_order_id,
            sell_order_id: item.sell_order_id,
            buyer: buy_next.user_regid,
            seller: sell_next.user_regid,
            coin_symbol: buy_next.coin_symbol.clone(),
            asset_symbol: buy_next.asset_symbol.clone(),
            deal_price: item.deal_price,
            deal_coin_amount: item.deal_coin_amount,
            deal_asset_amount: item.deal_asset_amount,
            taker_side,
            buyer_fee,
            seller_fee,
            buy_complete,
            sell_complete,
            buy_residual_refund,
        };

        scratch.insert(
            item.buy_order_id,
            if buy_complete { None } else { Some(buy_next) },
        );
        scratch.insert(
            item.sell_order_id,
            if sell_complete { None } else { Some(sell_next) },
        );
        Ok(execution)
    }

    fn fetch_planned(&self, scratch: &Scratch, order_id: &TxId) -> Option<OrderDetail> {
        match scratch.get(order_id) {
            Some(planned) => planned.clone(),
            None => self.load_open_order(order_id).map(|(detail, _)| detail),
        }
    }

    fn apply_deal(
        &mut self,
        fee_collector: &RegId,
        execution: &DealExecution,
        updates: &mut AccountUpdates,
    ) -> Result<(), DexError> {
        {
            // 1. buyer spends frozen coin (plus residual unfreeze on
            // completion) and receives the asset net of its fee
            let mut buyer = self
                .get_account(execution.buyer)
                .ok_or(TxError::StateConflict)?;
            let old_balance = buyer.get_balance(&execution.coin_symbol);
            buyer.sub_frozen(&execution.coin_symbol, execution.deal_coin_amount)?;
            if execution.buy_complete && execution.buy_residual_refund > 0 {
                buyer.unfreeze(&execution.coin_symbol, execution.buy_residual_refund)?;
            }
            let new_balance = buyer.get_balance(&execution.coin_symbol);
            updates.push((
                execution.buyer,
                AccountUpdate::UpdateBalance {
                    symbol: execution.coin_symbol.clone(),
                    old_balance,
                    new_balance,
                },
            ));

            let old_balance = buyer.get_balance(&execution.asset_symbol);
            buyer.add_available(
                &execution.asset_symbol,
                execution.deal_asset_amount - execution.buyer_fee,
            )?;
            let new_balance = buyer.get_balance(&execution.asset_symbol);
            updates.push((
                execution.buyer,
                AccountUpdate::UpdateBalance {
                    symbol: execution.asset_symbol.clone(),
                    old_balance,
                    new_balance,
                },
            ));
            self.insert_account(execution.buyer, buyer);
        }
        {
            // 2. seller spends frozen asset and receives the coin net of its fee
            let mut seller = self
                .get_account(execution.seller)
                .ok_or(TxError::StateConflict)?;
            let old_balance = seller.get_balance(&execution.asset_symbol);
            seller.sub_frozen(&execution.asset_symbol, execution.deal_asset_amount)?;
            let new_balance = seller.get_balance(&execution.asset_symbol);
            updates.push((
                execution.seller,
                AccountUpdate::UpdateBalance {
                    symbol: execution.asset_symbol.clone(),
                    old_balance,
                    new_balance,
                },
            ));

            let old_balance = seller.get_balance(&execution.coin_symbol);
            seller.add_available(
                &execution.coin_symbol,
                execution.deal_coin_amount - execution.seller_fee,
            )?;
            let new_balance = seller.get_balance(&execution.coin_symbol);
            updates.push((
                execution.seller,
                AccountUpdate::UpdateBalance {
                    symbol: execution.coin_symbol.clone(),
                    old_balance,
                    new_balance,
                },
            ));
            self.insert_account(execution.seller, seller);
        }
        {
            // 3. fees accrue to the operator owner (risk reserve on the
            // reserved dex)
            let mut collector = self
                .get_account(*fee_collector)
                .unwrap_or_else(|| Account::new(*fee_collector));
            if execution.buyer_fee > 0 {
                let old_balance = collector.get_balance(&execution.asset_symbol);
                collector.add_available(&execution.asset_symbol, execution.buyer_fee)?;
                let new_balance = collector.get_balance(&execution.asset_symbol);
                updates.push((
                    *fee_collector,
                    AccountUpdate::UpdateBalance {
                        symbol: execution.asset_symbol.clone(),
                        old_balance,
                        new_balance,
                    },
                ));
            }
            if execution.seller_fee > 0 {
                let old_balance = collector.get_balance(&execution.coin_symbol);
                collector.add_available(&execution.coin_symbol, execution.seller_fee)?;
                let new_balance = collector.get_balance(&execution.coin_symbol);
                updates.push((
                    *fee_collector,
                    AccountUpdate::UpdateBalance {
                        symbol: execution.coin_symbol.clone(),
                        old_balance,
                        new_balance,
                    },
                ));
            }
            self.insert_account(*fee_collector, collector);
        }

        // 4. deal progress on both active orders; a complete side is retired
        self.bump_order_progress(
            execution.buy_order_id,
            execution.buyer,
            execution,
            execution.buy_complete,
            updates,
        )?;
        self.bump_order_progress(
            execution.sell_order_id,
            execution.seller,
            execution,
            execution.sell_complete,
            updates,
        )?;
        Ok(())
    }

    fn bump_order_progress(
        &mut self,
        order_id: TxId,
        owner: RegId,
        execution: &DealExecution,
        complete: bool,
        updates: &mut AccountUpdates,
    ) -> Result<(), DexError> {
        let mut active = self
            .get_active_order(&order_id)
            .ok_or(TxError::StateConflict)?;
        let old_deal = (
            active.total_deal_coin_amount,
            active.total_deal_asset_amount,
        );
        active.total_deal_coin_amount += execution.deal_coin_amount;
        active.total_deal_asset_amount += execution.deal_asset_amount;
        let new_deal = (
            active.total_deal_coin_amount,
            active.total_deal_asset_amount,
        );
        updates.push((
            owner,
            AccountUpdate::UpdateOrderDeal {
                order_id,
                old_deal,
                new_deal,
            },
        ));
        if complete {
            self.remove_active_order(&order_id);
            self.remove_order_detail(&order_id);
        } else {
            self.insert_active_order(order_id, active);
        }
        Ok(())
    }
}

fn side_fee_ratio(order: &OrderDetail, is_taker: bool, operator: &dex_types::DexOperator) -> u64 {
    if order.mode == OperatorMode::RequireAuth {
        order.operator_fee_ratio
    } else if is_taker {
        operator.taker_fee_ratio
    } else {
        operator.maker_fee_ratio
    }
}
