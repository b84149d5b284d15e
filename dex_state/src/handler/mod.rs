use dex_types::operations::DexOp;
use dex_types::{AccountUpdates, DexError};

mod cancel_order;
mod place_order;
mod settle;

pub use cancel_order::CancelOrder;
pub use place_order::PlaceOrder;
pub use settle::SettleOrders;

#[derive(Debug)]
pub struct OpSuccess {
    pub updates: AccountUpdates,
    pub executed_op: DexOp,
}

/// TxHandler encapsulates the state-transition logic of one transaction kind.
///
/// `create_op` re-runs every stateful check and produces the full execution
/// plan without touching state; `apply_op` performs the balance moves and
/// store writes the plan describes. The block pipeline only ever calls
/// `apply_tx`, so a transaction either yields a complete plan or leaves the
/// cache untouched.
pub trait TxHandler<Tx> {
    /// Operation wrapper for the transaction.
    type Op: Into<DexOp>;

    /// Creates an operation wrapper from the given transaction.
    fn create_op(&self, tx: Tx) -> Result<Self::Op, DexError>;

    fn apply_tx(&mut self, tx: Tx) -> Result<OpSuccess, DexError> {
        let mut op = self.create_op(tx)?;

        let updates = self.apply_op(&mut op)?;
        Ok(OpSuccess {
            updates,
            executed_op: op.into(),
        })
    }

    /// Applies the operation.
    fn apply_op(&mut self, op: &mut Self::Op) -> Result<AccountUpdates, DexError>;
}
