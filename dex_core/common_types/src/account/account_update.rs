use serde::{Deserialize, Serialize};

use super::TokenBalance;
use dex_basic_types::{TokenSymbol, TxId};

/// Atomic change applied to the external account store by one transaction.
///
/// Handlers return these alongside the mutated cache so the enclosing node
/// can journal the per-block write batch and revert it on block rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountUpdate {
    /// Change one token balance of the account.
    UpdateBalance {
        symbol: TokenSymbol,
        old_balance: TokenBalance,
        new_balance: TokenBalance,
    },
    /// Record deal progress on an active order of the account.
    UpdateOrderDeal {
        order_id: TxId,
        old_deal: (u64, u64),
        new_deal: (u64, u64),
    },
}

impl AccountUpdate {
    /// Update that reverts this one.
    pub fn reversed_update(&self) -> Self {
        match self {
            AccountUpdate::UpdateBalance {
                symbol,
                old_balance,
                new_balance,
            } => AccountUpdate::UpdateBalance {
                symbol: symbol.clone(),
                old_balance: *new_balance,
                new_balance: *old_balance,
            },
            AccountUpdate::UpdateOrderDeal {
                order_id,
                old_deal,
                new_deal,
            } => AccountUpdate::UpdateOrderDeal {
                order_id: *order_id,
                old_deal: *new_deal,
                new_deal: *old_deal,
            },
        }
    }
}
