pub mod signature;
pub mod tx_hash;

pub use parity_crypto::publickey::{KeyPair, Public, Secret};
