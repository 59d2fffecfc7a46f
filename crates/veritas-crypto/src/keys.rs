use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use veritas_core::Address;

use crate::error::CryptoError;

/// Ed25519 key pair an issuer or holder signs with.
/// The signing key wipes itself on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic key pair, used for fixtures and reproducible issuers.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Address controlled by this key pair.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Ed25519 verification key. Its address form is the lowercase hex of the
/// 32 key bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    pub fn address(&self) -> Address {
        Address::from_key_bytes(self.as_bytes())
    }

    /// Recover the public key an address stands for.
    ///
    /// Fails for addresses that are not 64 hex characters or do not encode a
    /// valid curve point.
    pub fn from_address(address: &Address) -> Result<Self, CryptoError> {
        let encoded = address.as_str();
        if encoded.len() != 64 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: encoded.len() / 2,
            });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(encoded, &mut bytes)
            .map_err(|e| CryptoError::InvalidInput(format!("address {} is not hex: {}", address, e)))?;
        let verifying_key = VerifyingKey::from_bytes(&bytes).map_err(|e| {
            CryptoError::InvalidInput(format!("address {} is not a public key: {}", address, e))
        })?;
        Ok(Self { verifying_key })
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}
