use crate::handler::TxHandler;
use crate::state::DexState;
use dex_types::operations::CancelOrderOp;
use dex_types::{AccountUpdate, AccountUpdates, DexError, TxError};
use dex_basic_types::{RegId, TxId};

/// A cancel transaction reduced to its effect: the initiator withdraws one of
/// its open orders.
#[derive(Debug, Clone, Copy)]
pub struct CancelOrder {
    pub order_id: TxId,
    pub by: RegId,
}

impl TxHandler<CancelOrder> for DexState {
    type Op = CancelOrderOp;

    fn create_op(&self, tx: CancelOrder) -> Result<Self::Op, DexError> {
        let (order, active) = self
            .load_open_order(&tx.order_id)
            .ok_or(TxError::StateConflict)?;

        // Only the order owner may cancel it.
        if order.user_regid != tx.by {
            return Err(TxError::StateConflict.into());
        }

        // Original freeze minus the side settlement already consumed.
        let refund = order.residual_frozen();

        Ok(CancelOrderOp {
            order_id: tx.order_id,
            order,
            active,
            refund,
        })
    }

    fn apply_op(&mut self, op: &mut Self::Op) -> Result<AccountUpdates, DexError> {
        let symbol = op.order.frozen_symbol().clone();

        let mut account = self
            .get_account(op.order.user_regid)
            .ok_or(TxError::StateConflict)?;
        let old_balance = account.get_balance(&symbol);
        account.unfreeze(&symbol, op.refund)?;
        let new_balance = account.get_balance(&symbol);
        let updates = vec![(
            op.order.user_regid,
            AccountUpdate::UpdateBalance {
                symbol,
                old_balance,
                new_balance,
            },
        )];
        self.insert_account(op.order.user_regid, account);

        self.remove_active_order(&op.order_id);
        self.remove_order_detail(&op.order_id);

        tracing::debug!(
            order_id = %op.order_id,
            refund = op.refund,
            "cancelled dex order"
        );
        Ok(updates)
    }
}
