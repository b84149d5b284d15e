use crate::handler::{OpSuccess, TxHandler};
use crate::state::DexState;
use dex_types::operations::PlaceOrderOp;
use dex_types::{
    AccountUpdate, AccountUpdates, ActiveOrder, DexError, OrderDetail, OrderGenerateType,
    OrderPair, TxError,
};
use dex_basic_types::{DexId, RegId, TxCord, TxId};

/// An order-placing transaction reduced to the record it creates. The
/// executor has already verified signatures and assigned the cord; the id is
/// the placing transaction's hash.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub order: OrderDetail,
    pub order_id: TxId,
}

impl TxHandler<PlaceOrder> for DexState {
    type Op = PlaceOrderOp;

    fn create_op(&self, tx: PlaceOrder) -> Result<Self::Op, DexError> {
        self.validate_order(&tx.order)?;

        // An id collision means the same transaction is being replayed.
        if self.get_active_order(&tx.order_id).is_some()
            || self.get_order_detail(&tx.order_id).is_some()
        {
            return Err(TxError::StateConflict.into());
        }

        let account = self
            .get_account(tx.order.user_regid)
            .ok_or(TxError::StateConflict)?;
        let balance = account.get_balance(tx.order.frozen_symbol());
        if balance.available < tx.order.frozen_amount() {
            return Err(TxError::InsufficientBalance.into());
        }

        Ok(PlaceOrderOp {
            order: tx.order,
            order_id: tx.order_id,
        })
    }

    fn apply_op(&mut self, op: &mut Self::Op) -> Result<AccountUpdates, DexError> {
        let order = &op.order;
        let symbol = order.frozen_symbol().clone();

        let mut account = self
            .get_account(order.user_regid)
            .ok_or(TxError::StateConflict)?;
        let old_balance = account.get_balance(&symbol);
        account.freeze(&symbol, order.frozen_amount())?;
        let new_balance = account.get_balance(&symbol);
        let updates = vec![(
            order.user_regid,
            AccountUpdate::UpdateBalance {
                symbol,
                old_balance,
                new_balance,
            },
        )];
        self.insert_account(order.user_regid, account);

        self.insert_order_detail(op.order_id, order.clone());
        self.insert_active_order(
            op.order_id,
            ActiveOrder::new(order.generate_type, order.tx_cord),
        );

        tracing::debug!(
            order_id = %op.order_id,
            user = %order.user_regid,
            "placed dex order"
        );
        Ok(updates)
    }
}

impl DexState {
    /// Placement path for protocol-generated market buys (e.g. collateral
    /// liquidation selling seized coins for the governance asset). Same
    /// gauntlet and freeze as a user order, but marked `SystemGen` and keyed
    /// by the generating transaction's hash.
    pub fn place_system_buy_market_order(
        &mut self,
        order_id: TxId,
        tx_cord: TxCord,
        dex_id: DexId,
        pair: OrderPair,
        coin_amount: u64,
        user_regid: RegId,
    ) -> Result<OpSuccess, DexError> {
        let mut order = OrderDetail::system_buy_market(dex_id, pair, coin_amount, user_regid)?;
        order.tx_cord = tx_cord;
        debug_assert_eq!(order.generate_type, OrderGenerateType::SystemGen);
        self.apply_tx(PlaceOrder { order, order_id })
    }
}
