use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::tx::validators::*;
use crate::tx::{SignaturePair, TxSignature};
use dex_basic_types::{DexId, RegId, TokenSymbol, TxId};

/// One matched pair inside a settle transaction. The matcher precomputes the
/// deal off-chain; on-chain processing re-validates every field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealItem {
    pub buy_order_id: TxId,
    pub sell_order_id: TxId,
    pub deal_price: u64,
    pub deal_coin_amount: u64,
    pub deal_asset_amount: u64,
}

/// Basic settle transaction: matches orders of the reserved system DEX.
/// Only the hard-coded system matcher account may submit it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SettleTx {
    #[validate(custom = "version_validator")]
    pub version: u32,
    pub valid_height: u32,
    #[validate(custom = "tx_uid_validator")]
    pub tx_uid: RegId,
    #[validate(custom = "symbol_validator")]
    pub fee_symbol: TokenSymbol,
    pub fees: u64,

    #[validate(custom = "deal_items_validator")]
    pub deal_items: Vec<DealItem>,

    #[serde(default)]
    pub signature: TxSignature,
}

/// Extended settle transaction: names the DEX being settled and carries an
/// operator memo. Authorized against `DexOperator(dex_id).match_regid`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SettleExTx {
    #[serde(flatten)]
    #[validate]
    pub settle: SettleTx,
    pub dex_id: DexId,
    #[validate(custom = "memo_validator")]
    pub memo: String,
    #[serde(default)]
    pub operator_signature: Option<SignaturePair>,
}

impl SettleTx {
    pub fn new(
        valid_height: u32,
        tx_uid: RegId,
        fee_symbol: TokenSymbol,
        fees: u64,
        deal_items: Vec<DealItem>,
    ) -> Self {
        Self {
            version: crate::params::TX_VERSION,
            valid_height,
            tx_uid,
            fee_symbol,
            fees,
            deal_items,
            signature: Default::default(),
        }
    }
}

impl SettleExTx {
    pub fn new(
        valid_height: u32,
        tx_uid: RegId,
        fee_symbol: TokenSymbol,
        fees: u64,
        dex_id: DexId,
        deal_items: Vec<DealItem>,
        memo: String,
    ) -> Self {
        Self {
            settle: SettleTx::new(valid_height, tx_uid, fee_symbol, fees, deal_items),
            dex_id,
            memo,
            operator_signature: None,
        }
    }
}
