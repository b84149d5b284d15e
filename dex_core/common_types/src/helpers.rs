//! Fixed-point arithmetic shared by order placement and settlement.

use crate::params::{PRICE_BOOST, RATIO_BOOST};

/// Coin amount a given asset amount is worth at `price`, rounded up.
///
/// This is the freeze formula for buy-limit orders and the coherence formula
/// for deal items. `None` on 64-bit overflow of the result.
pub fn coin_amount_of(asset_amount: u64, price: u64) -> Option<u64> {
    let numerator = (asset_amount as u128).checked_mul(price as u128)?;
    let coin = (numerator + (PRICE_BOOST as u128 - 1)) / PRICE_BOOST as u128;
    if coin > u64::MAX as u128 {
        None
    } else {
        Some(coin as u64)
    }
}

/// Fee charged on `amount` at `ratio`, rounded down.
pub fn fee_of(amount: u64, ratio: u64) -> u64 {
    ((amount as u128 * ratio as u128) / RATIO_BOOST as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_amount_rounds_up() {
        // 3 sawi of asset at price 10^9 per unit: 3 * 10^9 / 10^8 = 30 exactly.
        assert_eq!(coin_amount_of(3, 1_000_000_000), Some(30));
        // 1 sawi at price 1: 1 / 10^8 rounds up to 1.
        assert_eq!(coin_amount_of(1, 1), Some(1));
        assert_eq!(coin_amount_of(0, 1_000_000_000), Some(0));
        assert_eq!(coin_amount_of(u64::MAX, u64::MAX), None);
    }

    #[test]
    fn fee_rounds_down() {
        // 100 sawi at 0.4%: 100 * 400_000 / 10^8 = 0.4, floors to zero.
        assert_eq!(fee_of(100, 400_000), 0);
        assert_eq!(fee_of(10_000_000_000, 400_000), 40_000_000);
    }
}
