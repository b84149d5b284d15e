//! Order-placing transaction bodies.
//!
//! The basic forms address the reserved system DEX with no operator
//! involvement; each has an extended sibling that adds the operator block
//! (mode, dex id, fee ratio, memo, operator regid and the optional
//! co-signature). Buy and sell share a body per pricing discipline; the side
//! comes from the enclosing [`DexTx`](super::DexTx) variant.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::order::OperatorMode;
use crate::tx::validators::*;
use crate::tx::{SignaturePair, TxSignature};
use dex_basic_types::{DexId, RegId, TokenSymbol};

/// Limit order: trade `asset_amount` of `asset_symbol` at `price` minor coin
/// units per whole asset unit.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrderTx {
    #[validate(custom = "version_validator")]
    pub version: u32,
    /// Height after which the transaction can no longer enter a block.
    pub valid_height: u32,
    /// Account placing the order; its key signs the transaction.
    #[validate(custom = "tx_uid_validator")]
    pub tx_uid: RegId,
    #[validate(custom = "symbol_validator")]
    pub fee_symbol: TokenSymbol,
    pub fees: u64,

    #[validate(custom = "symbol_validator")]
    pub coin_symbol: TokenSymbol,
    #[validate(custom = "symbol_validator")]
    pub asset_symbol: TokenSymbol,
    #[validate(custom = "amount_validator")]
    pub asset_amount: u64,
    #[validate(custom = "price_validator")]
    pub price: u64,

    #[serde(default)]
    pub signature: TxSignature,
}

/// Market buy order: spend a fixed `coin_amount` of `coin_symbol` at whatever
/// the book offers.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarketBuyOrderTx {
    #[validate(custom = "version_validator")]
    pub version: u32,
    pub valid_height: u32,
    #[validate(custom = "tx_uid_validator")]
    pub tx_uid: RegId,
    #[validate(custom = "symbol_validator")]
    pub fee_symbol: TokenSymbol,
    pub fees: u64,

    #[validate(custom = "symbol_validator")]
    pub coin_symbol: TokenSymbol,
    #[validate(custom = "symbol_validator")]
    pub asset_symbol: TokenSymbol,
    #[validate(custom = "amount_validator")]
    pub coin_amount: u64,

    #[serde(default)]
    pub signature: TxSignature,
}

/// Market sell order: sell a fixed `asset_amount` of `asset_symbol`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarketSellOrderTx {
    #[validate(custom = "version_validator")]
    pub version: u32,
    pub valid_height: u32,
    #[validate(custom = "tx_uid_validator")]
    pub tx_uid: RegId,
    #[validate(custom = "symbol_validator")]
    pub fee_symbol: TokenSymbol,
    pub fees: u64,

    #[validate(custom = "symbol_validator")]
    pub coin_symbol: TokenSymbol,
    #[validate(custom = "symbol_validator")]
    pub asset_symbol: TokenSymbol,
    #[validate(custom = "amount_validator")]
    pub asset_amount: u64,

    #[serde(default)]
    pub signature: TxSignature,
}

/// Operator block of the extended order forms.
///
/// `operator_regid` is part of the signature digest so user and operator
/// commit to the same fee policy; the co-signature itself is not.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OperatorParams {
    pub mode: OperatorMode,
    pub dex_id: DexId,
    #[validate(custom = "operator_fee_ratio_validator")]
    pub operator_fee_ratio: u64,
    #[validate(custom = "memo_validator")]
    pub memo: String,
    pub operator_regid: RegId,
    #[serde(default)]
    pub operator_signature: Option<SignaturePair>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrderExTx {
    #[serde(flatten)]
    #[validate]
    pub order: LimitOrderTx,
    #[serde(flatten)]
    #[validate]
    pub operator: OperatorParams,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarketBuyOrderExTx {
    #[serde(flatten)]
    #[validate]
    pub order: MarketBuyOrderTx,
    #[serde(flatten)]
    #[validate]
    pub operator: OperatorParams,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarketSellOrderExTx {
    #[serde(flatten)]
    #[validate]
    pub order: MarketSellOrderTx,
    #[serde(flatten)]
    #[validate]
    pub operator: OperatorParams,
}

impl LimitOrderTx {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        valid_height: u32,
        tx_uid: RegId,
        fee_symbol: TokenSymbol,
        fees: u64,
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
        price: u64,
    ) -> Self {
        Self {
            version: crate::params::TX_VERSION,
            valid_height,
            tx_uid,
            fee_symbol,
            fees,
            coin_symbol,
            asset_symbol,
            asset_amount,
            price,
            signature: Default::default(),
        }
    }
}

impl MarketBuyOrderTx {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        valid_height: u32,
        tx_uid: RegId,
        fee_symbol: TokenSymbol,
        fees: u64,
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        coin_amount: u64,
    ) -> Self {
        Self {
            version: crate::params::TX_VERSION,
            valid_height,
            tx_uid,
            fee_symbol,
            fees,
            coin_symbol,
            asset_symbol,
            coin_amount,
            signature: Default::default(),
        }
    }
}

impl MarketSellOrderTx {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        valid_height: u32,
        tx_uid: RegId,
        fee_symbol: TokenSymbol,
        fees: u64,
        coin_symbol: TokenSymbol,
        asset_symbol: TokenSymbol,
        asset_amount: u64,
    ) -> Self {
        Self {
            version: crate::params::TX_VERSION,
            valid_height,
            tx_uid,
            fee_symbol,
            fees,
            coin_symbol,
            asset_symbol,
            asset_amount,
            signature: Default::default(),
        }
    }
}

impl OperatorParams {
    /// Operator block in the simple model: no fee ratio, no co-signature.
    pub fn default_mode(dex_id: DexId, operator_regid: RegId) -> Self {
        Self {
            mode: OperatorMode::Default,
            dex_id,
            operator_regid,
            ..Default::default()
        }
    }

    /// Operator block in the authenticated model. The co-signature is
    /// attached separately once the digest is known.
    pub fn require_auth(
        dex_id: DexId,
        operator_regid: RegId,
        operator_fee_ratio: u64,
        memo: String,
    ) -> Self {
        Self {
            mode: OperatorMode::RequireAuth,
            dex_id,
            operator_fee_ratio,
            memo,
            operator_regid,
            operator_signature: None,
        }
    }
}
