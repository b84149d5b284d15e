//! Account value types as seen by the DEX subsystem.
//!
//! The real account store lives in the enclosing node; these are the pure
//! balance shapes the handlers read and write through the per-block cache.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::TxError;
use crate::tx::AccountPubKey;
use dex_basic_types::{RegId, TokenSymbol};

mod account_update;

pub use self::account_update::AccountUpdate;

pub type AccountUpdates = Vec<(RegId, AccountUpdate)>;

/// One token balance of an account, split into the spendable part and the
/// part locked under open DEX orders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub available: u64,
    pub frozen: u64,
}

impl TokenBalance {
    pub fn is_zero(&self) -> bool {
        self.available == 0 && self.frozen == 0
    }
}

/// A ledger account. The DEX subsystem only ever touches balances; nonce,
/// staking and voting state stay with the external account model.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub regid: RegId,
    /// Key all transaction signatures of this account verify against.
    /// Empty until the account is activated.
    pub pub_key: AccountPubKey,
    balances: HashMap<TokenSymbol, TokenBalance>,
}

impl Account {
    pub fn new(regid: RegId) -> Self {
        Self {
            regid,
            ..Default::default()
        }
    }

    pub fn with_key(regid: RegId, pub_key: AccountPubKey) -> Self {
        Self {
            regid,
            pub_key,
            balances: HashMap::new(),
        }
    }

    pub fn get_balance(&self, symbol: &TokenSymbol) -> TokenBalance {
        self.balances.get(symbol).copied().unwrap_or_default()
    }

    pub fn balances(&self) -> impl Iterator<Item = (&TokenSymbol, &TokenBalance)> {
        self.balances.iter()
    }

    pub fn add_available(&mut self, symbol: &TokenSymbol, amount: u64) -> Result<(), TxError> {
        let balance = self.balances.entry(symbol.clone()).or_default();
        balance.available = balance
            .available
            .checked_add(amount)
            .ok_or(TxError::StateConflict)?;
        Ok(())
    }

    pub fn sub_available(&mut self, symbol: &TokenSymbol, amount: u64) -> Result<(), TxError> {
        let balance = self.balances.entry(symbol.clone()).or_default();
        balance.available = balance
            .available
            .checked_sub(amount)
            .ok_or(TxError::InsufficientBalance)?;
        Ok(())
    }

    /// Moves `amount` from available to frozen, atomically.
    pub fn freeze(&mut self, symbol: &TokenSymbol, amount: u64) -> Result<(), TxError> {
        let balance = self.balances.entry(symbol.clone()).or_default();
        let available = balance
            .available
            .checked_sub(amount)
            .ok_or(TxError::InsufficientBalance)?;
        let frozen = balance
            .frozen
            .checked_add(amount)
            .ok_or(TxError::StateConflict)?;
        balance.available = available;
        balance.frozen = frozen;
        Ok(())
    }

    /// Moves `amount` from frozen back to available, atomically.
    pub fn unfreeze(&mut self, symbol: &TokenSymbol, amount: u64) -> Result<(), TxError> {
        let balance = self.balances.entry(symbol.clone()).or_default();
        let frozen = balance
            .frozen
            .checked_sub(amount)
            .ok_or(TxError::InsufficientBalance)?;
        let available = balance
            .available
            .checked_add(amount)
            .ok_or(TxError::StateConflict)?;
        balance.frozen = frozen;
        balance.available = available;
        Ok(())
    }

    /// Spends frozen balance outright (the settled side of a deal).
    pub fn sub_frozen(&mut self, symbol: &TokenSymbol, amount: u64) -> Result<(), TxError> {
        let balance = self.balances.entry(symbol.clone()).or_default();
        balance.frozen = balance
            .frozen
            .checked_sub(amount)
            .ok_or(TxError::InsufficientBalance)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wusd() -> TokenSymbol {
        TokenSymbol::from("WUSD")
    }

    #[test]
    fn freeze_and_unfreeze_move_between_parts() {
        let mut account = Account::new(RegId::new(10, 1));
        account.add_available(&wusd(), 100).unwrap();

        account.freeze(&wusd(), 60).unwrap();
        assert_eq!(
            account.get_balance(&wusd()),
            TokenBalance {
                available: 40,
                frozen: 60
            }
        );

        assert_eq!(
            account.freeze(&wusd(), 41),
            Err(TxError::InsufficientBalance)
        );

        account.unfreeze(&wusd(), 60).unwrap();
        assert_eq!(account.get_balance(&wusd()).available, 100);
        assert_eq!(account.get_balance(&wusd()).frozen, 0);
    }

    #[test]
    fn frozen_funds_are_not_spendable() {
        let mut account = Account::new(RegId::new(10, 1));
        account.add_available(&wusd(), 100).unwrap();
        account.freeze(&wusd(), 100).unwrap();

        assert_eq!(
            account.sub_available(&wusd(), 1),
            Err(TxError::InsufficientBalance)
        );
        account.sub_frozen(&wusd(), 100).unwrap();
        assert!(account.get_balance(&wusd()).is_zero());
    }
}
