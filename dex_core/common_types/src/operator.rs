//! The persistent DEX-operator record.

use serde::{Deserialize, Serialize};

use crate::params::{
    DEFAULT_MAKER_FEE_RATIO, DEFAULT_TAKER_FEE_RATIO, RISK_RESERVE_REGID, SYS_MATCHER_REGID,
};
use dex_basic_types::RegId;

/// Operator of one DEX, keyed by `DexId` in the registry.
///
/// Only `match_regid` may submit settle transactions for the operator's dex;
/// maker/taker ratios apply to orders that do not override them in
/// authenticated mode.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexOperator {
    pub owner_regid: RegId,
    pub match_regid: RegId,
    pub name: String,
    pub portal_url: String,
    pub maker_fee_ratio: u64,
    pub taker_fee_ratio: u64,
    pub memo: String,
}

impl DexOperator {
    /// The implicit operator of the reserved system DEX. Never persisted;
    /// settlement synthesizes it when `dex_id = 0`.
    pub fn reserved() -> Self {
        Self {
            owner_regid: RISK_RESERVE_REGID,
            match_regid: SYS_MATCHER_REGID,
            name: "system".to_owned(),
            portal_url: String::new(),
            maker_fee_ratio: DEFAULT_MAKER_FEE_RATIO,
            taker_fee_ratio: DEFAULT_TAKER_FEE_RATIO,
            memo: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owner_regid.is_empty()
            && self.match_regid.is_empty()
            && self.name.is_empty()
            && self.portal_url.is_empty()
            && self.maker_fee_ratio == 0
            && self.taker_fee_ratio == 0
            && self.memo.is_empty()
    }

    pub fn set_empty(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        let mut operator = DexOperator::reserved();
        assert!(!operator.is_empty());
        operator.set_empty();
        assert!(operator.is_empty());
        operator.set_empty();
        assert!(operator.is_empty());
    }
}
