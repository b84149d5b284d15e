use dex_basic_types::TxId;
use parity_crypto::digest::sha256;

/// Double SHA-256 over `bytes`, the digest form used for both transaction ids
/// and signature hashes.
pub fn double_sha256(bytes: &[u8]) -> TxId {
    let first = sha256(bytes);
    let second = sha256(&first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    TxId(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_double_pass() {
        // sha256d of the empty string, a fixed point of the protocol.
        assert_eq!(
            double_sha256(b"").to_string(),
            "0x5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }
}
