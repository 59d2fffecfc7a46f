use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use veritas_core::{Address, Timestamp};
use veritas_crypto::{digest_from_hex, digest_to_hex, hash, sign, verify, Digest, KeyPair};
use veritas_crypto::{PublicKey, Signature};

use crate::error::IdentityError;

/// Well-known credential and evidence type names.
pub mod credential_types {
    /// Base type carried by every credential; never subject to issuer authority.
    pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";
    pub const PASSPORT: &str = "PassportCredential";
    pub const IDENTITY_CARD: &str = "IdentityCardCredential";
    pub const DRIVING_LICENSE: &str = "DrivingLicenseCredential";
    /// Liveness check bound to a single authentication challenge.
    pub const LIVENESS: &str = "LivenessCredential";
    /// Long-lived reference biometric for a subject.
    pub const BIOMETRIC_ANCHOR: &str = "BiometricAnchorCredential";

    pub const BIOMETRIC_EVIDENCE: &str = "BiometricEvidence";
    pub const BIOMETRIC_ANCHOR_EVIDENCE: &str = "BiometricAnchorEvidence";
}

use credential_types::VERIFIABLE_CREDENTIAL;

const PROOF_TYPE: &str = "Ed25519Signature2020";

/// A companion evidence object referenced by digest (e.g. a biometric capture).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Evidence kind (e.g. "BiometricEvidence").
    pub evidence_type: String,
    /// BLAKE3 digest of the evidence object (hex-encoded).
    pub digest_hex: String,
}

impl Evidence {
    /// Reference evidence by hashing its raw bytes.
    pub fn from_data(evidence_type: impl Into<String>, data: &[u8]) -> Self {
        Self::from_digest(evidence_type, &hash(data))
    }

    /// Reference evidence by a precomputed digest.
    pub fn from_digest(evidence_type: impl Into<String>, digest: &Digest) -> Self {
        Self {
            evidence_type: evidence_type.into(),
            digest_hex: digest_to_hex(digest),
        }
    }

    /// Decode the 32-byte digest.
    pub fn digest(&self) -> Result<Digest, IdentityError> {
        digest_from_hex(&self.digest_hex).map_err(|e| {
            IdentityError::InvalidEvidence(format!("{} digest: {}", self.evidence_type, e))
        })
    }
}

/// A W3C-inspired Verifiable Credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// Unique credential identifier.
    pub id: String,
    /// Type(s) of the credential (e.g., ["VerifiableCredential", "PassportCredential"]).
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    /// Address of the issuer.
    pub issuer: Address,
    /// Address of the subject.
    pub subject: Address,
    /// Start of the validity window; also the signing time checked against issuer authority.
    pub valid_from: Timestamp,
    /// Exclusive end of the validity window, if bounded.
    #[serde(default)]
    pub valid_until: Option<Timestamp>,
    /// Credential subject claims as arbitrary JSON.
    pub claims: serde_json::Value,
    /// Companion evidence objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
    /// Ed25519 signature over the canonical credential payload.
    #[serde(default)]
    pub proof: Option<CredentialProof>,
}

/// Proof attached to a verifiable credential or presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProof {
    /// Proof type.
    pub proof_type: String,
    /// When the proof was created.
    pub created: Timestamp,
    /// Verification method ID (e.g., "<address>#keys-1").
    pub verification_method: String,
    /// The signature value (hex-encoded).
    pub signature_hex: String,
}

impl CredentialProof {
    pub(crate) fn create(payload: &[u8], signer: &Address, keypair: &KeyPair) -> Self {
        Self {
            proof_type: PROOF_TYPE.to_string(),
            created: Utc::now(),
            verification_method: format!("{}#keys-1", signer),
            signature_hex: sign(payload, keypair).to_hex(),
        }
    }

    pub(crate) fn check(&self, payload: &[u8], public_key: &PublicKey) -> Result<(), IdentityError> {
        if self.proof_type != PROOF_TYPE {
            return Err(IdentityError::CredentialVerification(format!(
                "unsupported proof type: {}",
                self.proof_type
            )));
        }
        let signature = Signature::from_hex(&self.signature_hex).map_err(|e| {
            IdentityError::CredentialVerification(format!("invalid signature: {}", e))
        })?;
        verify(payload, &signature, public_key).map_err(|_| {
            IdentityError::CredentialVerification("signature verification failed".to_string())
        })
    }
}

impl VerifiableCredential {
    /// Create a new unsigned credential, valid from now.
    pub fn new(
        issuer: Address,
        subject: Address,
        credential_type: Vec<String>,
        claims: serde_json::Value,
    ) -> Self {
        let mut types = vec![VERIFIABLE_CREDENTIAL.to_string()];
        for t in credential_type {
            if t != VERIFIABLE_CREDENTIAL && !types.contains(&t) {
                types.push(t);
            }
        }

        Self {
            id: format!("urn:uuid:{}", Uuid::now_v7()),
            credential_type: types,
            issuer,
            subject,
            valid_from: Utc::now(),
            valid_until: None,
            claims,
            evidence: Vec::new(),
            proof: None,
        }
    }

    /// Set the start of the validity window.
    pub fn with_valid_from(mut self, valid_from: Timestamp) -> Self {
        self.valid_from = valid_from;
        self
    }

    /// Set the exclusive end of the validity window.
    pub fn with_valid_until(mut self, valid_until: Timestamp) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Attach a companion evidence object.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    /// Compute the canonical signing payload for this credential.
    ///
    /// This is a deterministic JSON representation of the credential
    /// without the proof field.
    pub fn signing_payload(&self) -> Vec<u8> {
        let canonical = serde_json::json!({
            "id": self.id,
            "type": self.credential_type,
            "issuer": self.issuer,
            "subject": self.subject,
            "validFrom": self.valid_from.to_rfc3339(),
            "validUntil": self.valid_until.map(|d| d.to_rfc3339()),
            "claims": self.claims,
            "evidence": self.evidence,
        });
        serde_json::to_vec(&canonical).unwrap_or_default()
    }

    /// Issue (sign) this credential with the issuer's keypair.
    pub fn issue(mut self, keypair: &KeyPair) -> Result<Self, IdentityError> {
        if keypair.address() != self.issuer {
            return Err(IdentityError::CredentialIssuance(format!(
                "keypair does not control issuer address {}",
                self.issuer
            )));
        }
        let payload = self.signing_payload();
        self.proof = Some(CredentialProof::create(&payload, &self.issuer, keypair));
        Ok(self)
    }

    /// Verify the credential's proof against the given public key.
    pub fn verify_proof(&self, public_key: &PublicKey) -> Result<(), IdentityError> {
        let proof = self.proof.as_ref().ok_or_else(|| {
            IdentityError::CredentialVerification("no proof attached".to_string())
        })?;
        proof.check(&self.signing_payload(), public_key)
    }

    /// Check if the credential has been signed.
    pub fn is_signed(&self) -> bool {
        self.proof.is_some()
    }

    /// Whether the credential declares `credential_type`.
    pub fn has_type(&self, credential_type: &str) -> bool {
        self.credential_type.iter().any(|t| t == credential_type)
    }

    /// Declared types that require issuer authority (everything but the base type).
    pub fn declared_types(&self) -> impl Iterator<Item = &str> {
        self.credential_type
            .iter()
            .map(String::as_str)
            .filter(|t| *t != VERIFIABLE_CREDENTIAL)
    }

    /// Whether `at` falls inside `[valid_from, valid_until)`.
    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        at >= self.valid_from && self.valid_until.map(|until| at < until).unwrap_or(true)
    }

    /// Whether the issuer is asserting claims about itself.
    pub fn is_self_issued(&self) -> bool {
        self.issuer == self.subject
    }

    /// First evidence object of the given kind.
    pub fn evidence_of_type(&self, evidence_type: &str) -> Option<&Evidence> {
        self.evidence
            .iter()
            .find(|e| e.evidence_type == evidence_type)
    }
}
