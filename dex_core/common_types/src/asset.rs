//! The per-symbol view the asset registry exposes to order validation.

use serde::{Deserialize, Serialize};

use crate::params::{MAX_ORDER_PRICE, MAX_TOKEN_AMOUNT, MIN_ORDER_PRICE};
use dex_basic_types::TokenSymbol;

/// Whitelist record for one token symbol.
///
/// `coin_permitted` / `asset_permitted` decide which side of a trading pair
/// the symbol may take; the price window applies when the symbol is the
/// asset side of a limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub symbol: TokenSymbol,
    pub max_amount: u64,
    pub min_price: u64,
    pub max_price: u64,
    pub coin_permitted: bool,
    pub asset_permitted: bool,
}

impl AssetInfo {
    /// Registry record with the protocol-default bounds, permitted on both sides.
    pub fn new(symbol: impl Into<TokenSymbol>) -> Self {
        Self {
            symbol: symbol.into(),
            max_amount: MAX_TOKEN_AMOUNT,
            min_price: MIN_ORDER_PRICE,
            max_price: MAX_ORDER_PRICE,
            coin_permitted: true,
            asset_permitted: true,
        }
    }

    pub fn coin_only(symbol: impl Into<TokenSymbol>) -> Self {
        Self {
            asset_permitted: false,
            ..Self::new(symbol)
        }
    }

    pub fn asset_only(symbol: impl Into<TokenSymbol>) -> Self {
        Self {
            coin_permitted: false,
            ..Self::new(symbol)
        }
    }
}
