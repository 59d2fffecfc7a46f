use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use veritas_core::{Address, Timestamp};
use veritas_crypto::{KeyPair, PublicKey};

use crate::credentials::{CredentialProof, VerifiableCredential};
use crate::error::IdentityError;

const VERIFIABLE_PRESENTATION: &str = "VerifiablePresentation";

/// A holder-signed bundle of verifiable credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    /// Unique presentation identifier.
    pub id: String,
    #[serde(rename = "type")]
    pub presentation_type: Vec<String>,
    /// Address of the presenting holder.
    pub holder: Address,
    /// When the presentation was assembled.
    pub created: Timestamp,
    /// Disclosed credentials, in disclosure order.
    pub credentials: Vec<VerifiableCredential>,
    /// Holder signature over the canonical presentation payload.
    #[serde(default)]
    pub proof: Option<CredentialProof>,
}

impl VerifiablePresentation {
    /// Create a new unsigned presentation.
    pub fn new(holder: Address, credentials: Vec<VerifiableCredential>) -> Self {
        Self {
            id: format!("urn:uuid:{}", Uuid::now_v7()),
            presentation_type: vec![VERIFIABLE_PRESENTATION.to_string()],
            holder,
            created: Utc::now(),
            credentials,
            proof: None,
        }
    }

    /// Canonical JSON signing payload, excluding the presentation proof.
    pub fn signing_payload(&self) -> Vec<u8> {
        let canonical = serde_json::json!({
            "id": self.id,
            "type": self.presentation_type,
            "holder": self.holder,
            "created": self.created.to_rfc3339(),
            "credentials": self.credentials,
        });
        serde_json::to_vec(&canonical).unwrap_or_default()
    }

    /// Sign the presentation with the holder's keypair.
    pub fn sign(mut self, keypair: &KeyPair) -> Result<Self, IdentityError> {
        if keypair.address() != self.holder {
            return Err(IdentityError::CredentialIssuance(format!(
                "keypair does not control holder address {}",
                self.holder
            )));
        }
        let payload = self.signing_payload();
        self.proof = Some(CredentialProof::create(&payload, &self.holder, keypair));
        Ok(self)
    }

    /// Verify the holder's proof against the given public key.
    pub fn verify_proof(&self, public_key: &PublicKey) -> Result<(), IdentityError> {
        let proof = self.proof.as_ref().ok_or_else(|| {
            IdentityError::CredentialVerification("presentation has no proof".to_string())
        })?;
        proof.check(&self.signing_payload(), public_key)
    }

    pub fn is_signed(&self) -> bool {
        self.proof.is_some()
    }
}
