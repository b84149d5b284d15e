//! Consensus parameters of the DEX subsystem.
//!
//! Everything in this module is part of the protocol: changing any value
//! changes transaction validity and therefore forks the chain.

use dex_basic_types::{DexId, RegId};

/// Scaling factor between nominal price and on-chain integer price:
/// a price of `10 * PRICE_BOOST` means 10 minor coin units per minor asset unit
/// times the asset precision.
pub const PRICE_BOOST: u64 = 100_000_000;

/// Scaling factor for fee ratios. A ratio of `1_000_000` is 1%.
pub const RATIO_BOOST: u64 = 100_000_000;

/// Hard ceiling for a per-order operator fee ratio (50%).
pub const OPERATOR_FEE_RATIO_MAX: u64 = 50_000_000;

/// Fee ratios of the implicit operator of the reserved DEX.
pub const DEFAULT_MAKER_FEE_RATIO: u64 = 40_000;
pub const DEFAULT_TAKER_FEE_RATIO: u64 = 80_000;

/// A market buy order whose unspent coin drops below this threshold is
/// considered unfillable dust and retired with the residue refunded.
pub const MIN_VIABLE_TRADE: u64 = 1_000_000_000;

/// Upper bound for any single order amount, in the token minor unit.
pub const MAX_TOKEN_AMOUNT: u64 = 900_000_000_000_000_000;

/// Default price window for limit orders; the asset registry may narrow it
/// per trading pair but never widen it.
pub const MIN_ORDER_PRICE: u64 = 1;
pub const MAX_ORDER_PRICE: u64 = 10_000_000_000_000_000;

/// Longest memo accepted on extended transactions, in bytes.
pub const MAX_MEMO_LEN: usize = 256;

/// Codec ceiling for any encoded vector length.
pub const MAX_VEC_LEN: u64 = 10_000;

/// Ceiling for the number of deal items in one settle transaction.
pub const MAX_DEAL_ITEMS: usize = 1_000;

/// Wire version of every DEX transaction.
pub const TX_VERSION: u32 = 1;

/// The system-owned DEX; its operator record is implicit.
pub const RESERVED_DEX_ID: DexId = DexId::RESERVED;

/// The only account allowed to submit settle transactions for the reserved DEX.
pub const SYS_MATCHER_REGID: RegId = RegId {
    height: 0,
    index: 8,
};

/// Fees collected on reserved-DEX deals accrue here instead of an operator owner.
pub const RISK_RESERVE_REGID: RegId = RegId {
    height: 0,
    index: 9,
};
