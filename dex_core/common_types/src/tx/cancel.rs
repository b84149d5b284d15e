use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::tx::validators::*;
use crate::tx::TxSignature;
use dex_basic_types::{RegId, TokenSymbol, TxId};

/// Cancels an open order of the initiator. The order id is the hash of the
/// transaction that placed it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderTx {
    #[validate(custom = "version_validator")]
    pub version: u32,
    pub valid_height: u32,
    #[validate(custom = "tx_uid_validator")]
    pub tx_uid: RegId,
    #[validate(custom = "symbol_validator")]
    pub fee_symbol: TokenSymbol,
    pub fees: u64,

    pub order_id: TxId,

    #[serde(default)]
    pub signature: TxSignature,
}

impl CancelOrderTx {
    pub fn new(
        valid_height: u32,
        tx_uid: RegId,
        fee_symbol: TokenSymbol,
        fees: u64,
        order_id: TxId,
    ) -> Self {
        Self {
            version: crate::params::TX_VERSION,
            valid_height,
            tx_uid,
            fee_symbol,
            fees,
            order_id,
            signature: Default::default(),
        }
    }
}
