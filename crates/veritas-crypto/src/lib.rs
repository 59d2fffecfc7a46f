pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::{digest_from_hex, digest_to_hex, hash, Digest};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature};
