//! The most primitive identifier types used by the DEX transaction subsystem.
//! Everything here is a plain value; no chain state is reachable from this crate.

#[macro_use]
mod macros;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::ops::{Add, Deref, DerefMut, Sub};
use std::str::FromStr;

basic_type!(
    /// Identifier of a registered DEX operator. `0` is the reserved system DEX.
    DexId,
    u32
);

basic_type!(
    /// Sequential index of a confirmed block.
    BlockHeight,
    u32
);

impl DexId {
    /// The system-owned DEX used for protocol-internal orders.
    pub const RESERVED: DexId = DexId(0);

    pub fn is_reserved(self) -> bool {
        self == Self::RESERVED
    }
}

/// Account register id, assigned when the registering transaction is confirmed.
///
/// The canonical wire form is fixed-width: big-endian height followed by
/// big-endian index, 6 bytes total. `(0, 0)` is the empty sentinel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord, Default,
)]
pub struct RegId {
    pub height: u32,
    pub index: u16,
}

impl RegId {
    pub const EMPTY: RegId = RegId {
        height: 0,
        index: 0,
    };

    pub const BYTES: usize = 6;

    pub fn new(height: u32, index: u16) -> Self {
        Self { height, index }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn to_bytes(self) -> [u8; Self::BYTES] {
        let mut out = [0u8; Self::BYTES];
        out[..4].copy_from_slice(&self.height.to_be_bytes());
        out[4..].copy_from_slice(&self.index.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; Self::BYTES]) -> Self {
        let mut height = [0u8; 4];
        let mut index = [0u8; 2];
        height.copy_from_slice(&bytes[..4]);
        index.copy_from_slice(&bytes[4..]);
        Self {
            height: u32::from_be_bytes(height),
            index: u16::from_be_bytes(index),
        }
    }
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.height, self.index)
    }
}

impl FromStr for RegId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (height, index) = match s.split_once('-') {
            Some(pair) => pair,
            // Let the int parser report the malformed input.
            None => (s, "0"),
        };
        Ok(Self {
            height: height.parse()?,
            index: index.parse()?,
        })
    }
}

/// Position of a confirmed transaction: `(block height, index inside the block)`.
///
/// This is the total ordering key of the subsystem; the settlement engine uses
/// it to decide which of two matched orders is the taker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord, Default,
)]
pub struct TxCord {
    pub height: BlockHeight,
    pub index: u16,
}

impl TxCord {
    pub const EMPTY: TxCord = TxCord {
        height: BlockHeight(0),
        index: 0,
    };

    pub fn new(height: u32, index: u16) -> Self {
        Self {
            height: BlockHeight(height),
            index,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl fmt::Display for TxCord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.height, self.index)
    }
}

/// 256-bit transaction hash. Doubles as the order id of the order the
/// transaction placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub const BYTES: usize = 32;

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let mut data = [0u8; 32];
        hex::decode_to_slice(raw, &mut data)?;
        Ok(Self(data))
    }
}

impl Serialize for TxId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Short ASCII ticker of a token, e.g. `WICC` or `WUSD`.
///
/// A well-formed symbol is 1 to 7 uppercase alphanumeric characters; whether a
/// well-formed symbol is actually tradable is decided by the asset registry.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct TokenSymbol(pub String);

impl TokenSymbol {
    pub const MAX_LEN: usize = 7;

    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= Self::MAX_LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenSymbol {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regid_bytes_round_trip() {
        let id = RegId::new(912_345, 7);
        assert_eq!(RegId::from_bytes(id.to_bytes()), id);
        assert_eq!(id.to_bytes().len(), RegId::BYTES);
        assert!(RegId::EMPTY.is_empty());
        assert!(!id.is_empty());
    }

    #[test]
    fn tx_cord_orders_by_height_then_index() {
        assert!(TxCord::new(10, 5) < TxCord::new(11, 0));
        assert!(TxCord::new(10, 5) < TxCord::new(10, 6));
        assert_eq!(TxCord::new(10, 5), TxCord::new(10, 5));
    }

    #[test]
    fn token_symbol_well_formedness() {
        assert!(TokenSymbol::from("WICC").is_well_formed());
        assert!(TokenSymbol::from("X2").is_well_formed());
        assert!(!TokenSymbol::from("").is_well_formed());
        assert!(!TokenSymbol::from("TOOLONG8").is_well_formed());
        assert!(!TokenSymbol::from("wicc").is_well_formed());
        assert!(!TokenSymbol::from("W-CC").is_well_formed());
    }
}
