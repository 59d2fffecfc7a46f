use dashmap::DashMap;

use veritas_core::Address;
use veritas_crypto::PublicKey;
use veritas_identity::{credential_types, VerifiableCredential, VerifiablePresentation};

use crate::error::VerificationError;

/// Structural and cryptographic checks on credentials and presentations.
///
/// Time windows and issuer authority are not a verifier concern; the
/// credential graph applies those on top.
pub trait Verifier: Send + Sync {
    fn validate(&self, credential: &VerifiableCredential) -> Result<(), VerificationError>;

    fn validate_presentation(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<(), VerificationError>;
}

/// Ed25519 verifier.
///
/// An address is read as the hex-encoded public key of its owner unless a
/// key has been pinned for it with [`Ed25519Verifier::pin_key`].
#[derive(Default)]
pub struct Ed25519Verifier {
    pinned: DashMap<Address, PublicKey>,
}

impl Ed25519Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `public_key` for `address` instead of decoding the address.
    pub fn pin_key(&self, address: Address, public_key: PublicKey) {
        tracing::debug!(address = %address, "verification key pinned");
        self.pinned.insert(address, public_key);
    }

    pub fn unpin_key(&self, address: &Address) -> bool {
        self.pinned.remove(address).is_some()
    }

    pub fn pinned_count(&self) -> usize {
        self.pinned.len()
    }

    fn key_for(&self, address: &Address) -> Result<PublicKey, VerificationError> {
        if let Some(key) = self.pinned.get(address) {
            return Ok(key.clone());
        }
        PublicKey::from_address(address)
            .map_err(|_| VerificationError::MalformedIssuer(address.clone()))
    }
}

fn check_structure(credential: &VerifiableCredential) -> Result<(), VerificationError> {
    if credential.id.trim().is_empty() {
        return Err(VerificationError::Malformed("credential without id".into()));
    }
    if !credential.has_type(credential_types::VERIFIABLE_CREDENTIAL) {
        return Err(VerificationError::Malformed(format!(
            "{} lacks the {} type",
            credential.id,
            credential_types::VERIFIABLE_CREDENTIAL
        )));
    }
    if !credential.claims.is_object() {
        return Err(VerificationError::Malformed(format!(
            "{} claims are not an object",
            credential.id
        )));
    }
    if let Some(until) = credential.valid_until {
        if until <= credential.valid_from {
            return Err(VerificationError::Malformed(format!(
                "{} has an empty validity window",
                credential.id
            )));
        }
    }
    for evidence in &credential.evidence {
        evidence
            .digest()
            .map_err(|e| VerificationError::Malformed(format!("{}: {}", credential.id, e)))?;
    }
    Ok(())
}

impl Verifier for Ed25519Verifier {
    fn validate(&self, credential: &VerifiableCredential) -> Result<(), VerificationError> {
        check_structure(credential)?;
        if !credential.is_signed() {
            return Err(VerificationError::MissingProof(credential.id.clone()));
        }
        let key = self.key_for(&credential.issuer)?;
        credential
            .verify_proof(&key)
            .map_err(|_| VerificationError::InvalidSignature(credential.id.clone()))
    }

    fn validate_presentation(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<(), VerificationError> {
        if !presentation.is_signed() {
            return Err(VerificationError::MissingProof(presentation.id.clone()));
        }
        let key = self.key_for(&presentation.holder)?;
        presentation
            .verify_proof(&key)
            .map_err(|_| VerificationError::InvalidSignature(presentation.id.clone()))
    }
}
