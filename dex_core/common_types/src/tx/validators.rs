#![allow(unused_doc_comments)]
use validator::ValidationError;

use crate::params::{
    MAX_DEAL_ITEMS, MAX_MEMO_LEN, MAX_ORDER_PRICE, MAX_TOKEN_AMOUNT, OPERATOR_FEE_RATIO_MAX,
    TX_VERSION,
};
use crate::tx::DealItem;
use dex_basic_types::{RegId, TokenSymbol};

/// Check transaction version validation
///
/// - version must equal the current wire version
pub fn version_validator(version: u32) -> Result<(), ValidationError> {
    if version != TX_VERSION {
        return Err(ValidationError::new("unsupported tx version"));
    }
    Ok(())
}

/// Check transaction initiator validation
///
/// - tx_uid must not be the empty sentinel
pub fn tx_uid_validator(tx_uid: &RegId) -> Result<(), ValidationError> {
    if tx_uid.is_empty() {
        return Err(ValidationError::new("tx uid is empty"));
    }
    Ok(())
}

/// Check token symbol format validation
///
/// - 1 to 7 uppercase ASCII alphanumeric characters
pub fn symbol_validator(symbol: &TokenSymbol) -> Result<(), ValidationError> {
    if !symbol.is_well_formed() {
        return Err(ValidationError::new("malformed token symbol"));
    }
    Ok(())
}

/// Check order amount format validation
///
/// - amount should be non-zero and <= MAX_TOKEN_AMOUNT
pub fn amount_validator(amount: u64) -> Result<(), ValidationError> {
    if amount == 0 || amount > MAX_TOKEN_AMOUNT {
        return Err(ValidationError::new("amount out of range"));
    }
    Ok(())
}

/// Check limit price format validation
///
/// - price should be non-zero and <= MAX_ORDER_PRICE
pub fn price_validator(price: u64) -> Result<(), ValidationError> {
    if price == 0 || price > MAX_ORDER_PRICE {
        return Err(ValidationError::new("price out of range"));
    }
    Ok(())
}

/// Check per-order operator fee ratio validation
///
/// - ratio should be <= OPERATOR_FEE_RATIO_MAX (50%)
pub fn operator_fee_ratio_validator(ratio: u64) -> Result<(), ValidationError> {
    if ratio > OPERATOR_FEE_RATIO_MAX {
        return Err(ValidationError::new("operator fee ratio out of range"));
    }
    Ok(())
}

/// Check memo length validation
///
/// - memo should be <= MAX_MEMO_LEN bytes
pub fn memo_validator(memo: &str) -> Result<(), ValidationError> {
    if memo.len() > MAX_MEMO_LEN {
        return Err(ValidationError::new("memo too long"));
    }
    Ok(())
}

/// Check settle deal list validation
///
/// - at least one item, at most MAX_DEAL_ITEMS
pub fn deal_items_validator(items: &[DealItem]) -> Result<(), ValidationError> {
    if items.is_empty() || items.len() > MAX_DEAL_ITEMS {
        return Err(ValidationError::new("deal item count out of range"));
    }
    Ok(())
}

#[cfg(test)]
mod validators_tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_version_validate() {
        #[derive(Debug, Validate)]
        struct Mock {
            #[validate(custom = "version_validator")]
            pub version: u32,
        }

        /// should success
        let mock = Mock {
            version: TX_VERSION,
        };
        assert!(mock.validate().is_ok());
        /// out of range
        let mock = Mock {
            version: TX_VERSION + 1,
        };
        assert!(mock.validate().is_err());
    }

    #[test]
    fn test_symbol_validate() {
        #[derive(Debug, Validate)]
        struct Mock {
            #[validate(custom = "symbol_validator")]
            pub symbol: TokenSymbol,
        }

        /// should success
        let mock = Mock {
            symbol: "WICC".into(),
        };
        assert!(mock.validate().is_ok());
        /// malformed
        let mock = Mock {
            symbol: "wicc".into(),
        };
        assert!(mock.validate().is_err());
        let mock = Mock { symbol: "".into() };
        assert!(mock.validate().is_err());
    }

    #[test]
    fn test_amount_validate() {
        #[derive(Debug, Validate)]
        struct Mock {
            #[validate(custom = "amount_validator")]
            pub amount: u64,
        }

        /// should success
        let mock = Mock {
            amount: MAX_TOKEN_AMOUNT,
        };
        assert!(mock.validate().is_ok());
        /// out of range
        let mock = Mock { amount: 0 };
        assert!(mock.validate().is_err());
        let mock = Mock {
            amount: MAX_TOKEN_AMOUNT + 1,
        };
        assert!(mock.validate().is_err());
    }

    #[test]
    fn test_price_validate() {
        #[derive(Debug, Validate)]
        struct Mock {
            #[validate(custom = "price_validator")]
            pub price: u64,
        }

        /// should success
        let mock = Mock {
            price: MAX_ORDER_PRICE,
        };
        assert!(mock.validate().is_ok());
        /// out of range
        let mock = Mock { price: 0 };
        assert!(mock.validate().is_err());
        let mock = Mock {
            price: MAX_ORDER_PRICE + 1,
        };
        assert!(mock.validate().is_err());
    }

    #[test]
    fn test_operator_fee_ratio_validate() {
        #[derive(Debug, Validate)]
        struct Mock {
            #[validate(custom = "operator_fee_ratio_validator")]
            pub ratio: u64,
        }

        /// should success
        let mock = Mock {
            ratio: OPERATOR_FEE_RATIO_MAX,
        };
        assert!(mock.validate().is_ok());
        /// out of range
        let mock = Mock {
            ratio: OPERATOR_FEE_RATIO_MAX + 1,
        };
        assert!(mock.validate().is_err());
    }

    #[test]
    fn test_memo_validate() {
        #[derive(Debug, Validate)]
        struct Mock {
            #[validate(custom = "memo_validator")]
            pub memo: String,
        }

        /// should success
        let mock = Mock {
            memo: "x".repeat(MAX_MEMO_LEN),
        };
        assert!(mock.validate().is_ok());
        /// too long
        let mock = Mock {
            memo: "x".repeat(MAX_MEMO_LEN + 1),
        };
        assert!(mock.validate().is_err());
    }

    #[test]
    fn test_deal_items_validate() {
        #[derive(Debug, Validate)]
        struct Mock {
            #[validate(custom = "deal_items_validator")]
            pub items: Vec<DealItem>,
        }

        /// should success
        let mock = Mock {
            items: vec![DealItem::default()],
        };
        assert!(mock.validate().is_ok());
        /// empty list
        let mock = Mock { items: vec![] };
        assert!(mock.validate().is_err());
    }
}
