use std::fmt;

use parity_crypto::digest::sha256;
use parity_crypto::publickey::{recover, sign, KeyPair, Public, Secret, Signature};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use dex_basic_types::{RegId, TxId};

/// Account public key as held by the account store: the uncompressed
/// secp256k1 point without its prefix byte. All zeroes means the account has
/// no key on record and cannot authorize DEX transactions.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AccountPubKey(pub [u8; 64]);

impl AccountPubKey {
    pub fn from_public(public: &Public) -> Self {
        let mut out = [0u8; 64];
        out.copy_from_slice(public.as_bytes());
        Self(out)
    }

    pub fn to_public(&self) -> Public {
        Public::from_slice(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 64]
    }
}

impl Default for AccountPubKey {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Debug for AccountPubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountPubKey(0x{})", hex::encode(self.0))
    }
}

impl Serialize for AccountPubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for AccountPubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("0x").unwrap_or(&s);
        let mut out = [0u8; 64];
        hex::decode_to_slice(raw, &mut out).map_err(serde::de::Error::custom)?;
        Ok(Self(out))
    }
}

/// Packed 65-byte ECDSA signature (`r || s || v`) over a transaction's
/// signature digest. An empty vector is the unsigned placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxSignature(pub Vec<u8>);

impl TxSignature {
    pub fn sign(secret: &Secret, digest: &TxId) -> Result<Self, anyhow::Error> {
        let signature = sign(secret, &digest.0.into())?;
        Ok(Self(signature.to_vec()))
    }

    /// Recovers the signing public key; `None` when the signature is absent,
    /// malformed, or does not recover.
    pub fn recover_pubkey(&self, digest: &TxId) -> Option<AccountPubKey> {
        if self.0.len() != 65 {
            return None;
        }
        let mut raw = [0u8; 65];
        raw.copy_from_slice(&self.0);
        let signature = Signature::from(raw);
        recover(&signature, &digest.0.into())
            .ok()
            .map(|public| AccountPubKey::from_public(&public))
    }

    pub fn verify(&self, digest: &TxId, key: &AccountPubKey) -> bool {
        !key.is_empty() && self.recover_pubkey(digest).as_ref() == Some(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxSignature 0x{}", hex::encode(self.0.as_slice()))
    }
}

impl Serialize for TxSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for TxSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(raw)
            .map(TxSignature)
            .map_err(serde::de::Error::custom)
    }
}

/// Operator co-signature slot of the extended transaction forms: the operator
/// account it names plus its signature over the same digest the user signed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePair {
    pub regid: RegId,
    pub signature: TxSignature,
}

/// Deterministic keypair from an arbitrary seed. Used by tooling and tests;
/// consensus code only ever verifies.
pub fn keypair_from_seed(seed: &[u8]) -> Result<KeyPair, anyhow::Error> {
    let digest = sha256(seed);
    let mut raw = [0u8; 32];
    raw.copy_from_slice(&digest);
    let keypair = KeyPair::from_secret(Secret::from(raw))?;
    Ok(keypair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_recover_round_trip() {
        let keypair = keypair_from_seed(b"alice").unwrap();
        let digest = TxId([7u8; 32]);

        let signature = TxSignature::sign(keypair.secret(), &digest).unwrap();
        let key = AccountPubKey::from_public(keypair.public());
        assert!(signature.verify(&digest, &key));

        // A different digest or a different key must not verify.
        assert!(!signature.verify(&TxId([8u8; 32]), &key));
        let other = keypair_from_seed(b"bob").unwrap();
        assert!(!signature.verify(&digest, &AccountPubKey::from_public(other.public())));

        // The unsigned placeholder never verifies.
        assert!(!TxSignature::default().verify(&digest, &key));
        assert!(!signature.verify(&digest, &AccountPubKey::default()));
    }
}
