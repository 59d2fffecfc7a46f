//! Per-request view over presented credentials.
//!
//! A graph is built from a batch of presentations, answers a few questions
//! about the holders in it, and is dropped. It never outlives the registry,
//! verifier and clock it borrows.

use std::collections::HashMap;

use veritas_core::{Address, Clock};
use veritas_crypto::Digest;
use veritas_identity::credential_types::{
    BIOMETRIC_ANCHOR, BIOMETRIC_ANCHOR_EVIDENCE, BIOMETRIC_EVIDENCE, LIVENESS,
};
use veritas_identity::{TrustedIssuerRegistry, VerifiableCredential, VerifiablePresentation};
use veritas_predicate::Solver;

use crate::error::CredentialError;
use crate::policy::DocumentPolicy;
use crate::verifier::Verifier;

/// Expected challenge length for liveness authentication.
pub const CHALLENGE_LEN: usize = 32;

/// Evidence each structurally constrained credential type must carry.
const REQUIRED_EVIDENCE: &[(&str, &str)] = &[
    (LIVENESS, BIOMETRIC_EVIDENCE),
    (BIOMETRIC_ANCHOR, BIOMETRIC_ANCHOR_EVIDENCE),
];

pub struct CredentialGraph<'a> {
    registry: &'a TrustedIssuerRegistry,
    verifier: &'a dyn Verifier,
    clock: &'a dyn Clock,
    /// All presented credentials, in presentation order.
    credentials: Vec<&'a VerifiableCredential>,
    by_subject: HashMap<&'a Address, Vec<usize>>,
    by_type: HashMap<&'a str, Vec<usize>>,
}

impl<'a> CredentialGraph<'a> {
    /// Verify every presentation proof and index the credentials it carries.
    pub fn build(
        registry: &'a TrustedIssuerRegistry,
        presentations: &'a [VerifiablePresentation],
        verifier: &'a dyn Verifier,
        clock: &'a dyn Clock,
    ) -> Result<Self, CredentialError> {
        let mut credentials = Vec::new();
        let mut by_subject: HashMap<&'a Address, Vec<usize>> = HashMap::new();
        let mut by_type: HashMap<&'a str, Vec<usize>> = HashMap::new();

        for presentation in presentations {
            verifier.validate_presentation(presentation)?;
            for credential in &presentation.credentials {
                let index = credentials.len();
                credentials.push(credential);
                by_subject.entry(&credential.subject).or_default().push(index);
                for credential_type in &credential.credential_type {
                    by_type.entry(credential_type.as_str()).or_default().push(index);
                }
            }
        }

        tracing::debug!(
            presentations = presentations.len(),
            credentials = credentials.len(),
            subjects = by_subject.len(),
            "credential graph built"
        );

        Ok(Self {
            registry,
            verifier,
            clock,
            credentials,
            by_subject,
            by_type,
        })
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Presented credentials about `subject`, valid or not.
    pub fn credentials_about(&self, subject: &Address) -> Vec<&'a VerifiableCredential> {
        self.collect(self.by_subject.get(subject))
    }

    /// Presented credentials declaring `credential_type`, valid or not.
    pub fn credentials_of_type(&self, credential_type: &str) -> Vec<&'a VerifiableCredential> {
        self.collect(self.by_type.get(credential_type))
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<&'a VerifiableCredential> {
        indices
            .map(|ix| ix.iter().map(|&i| self.credentials[i]).collect())
            .unwrap_or_default()
    }

    /// Full validity check of one credential. Verifier errors pass through unchanged.
    pub fn validate(&self, credential: &VerifiableCredential) -> Result<(), CredentialError> {
        self.verifier.validate(credential)?;

        let now = self.clock.now();
        if !credential.is_valid_at(now) {
            return Err(match credential.valid_until {
                Some(valid_until) if now >= valid_until => CredentialError::Expired {
                    id: credential.id.clone(),
                    valid_until,
                },
                _ => CredentialError::NotYetValid {
                    id: credential.id.clone(),
                    valid_from: credential.valid_from,
                },
            });
        }

        for credential_type in credential.declared_types() {
            if !self.registry.may_issue(credential, credential_type) {
                return Err(CredentialError::UnauthorizedIssuer {
                    issuer: credential.issuer.clone(),
                    credential_type: credential_type.to_string(),
                    at: credential.valid_from,
                });
            }
        }

        for (credential_type, evidence_type) in REQUIRED_EVIDENCE {
            if credential.has_type(credential_type)
                && credential.evidence_of_type(evidence_type).is_none()
            {
                return Err(CredentialError::MissingEvidence {
                    id: credential.id.clone(),
                    evidence_type: evidence_type.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Credentials about `holder` that pass [`CredentialGraph::validate`], in presentation order.
    pub fn valid_credentials_for(&self, holder: &Address) -> Vec<&'a VerifiableCredential> {
        self.credentials_about(holder)
            .into_iter()
            .filter(|credential| match self.validate(credential) {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(
                        holder = %holder,
                        credential_id = %credential.id,
                        error = %e,
                        "credential rejected"
                    );
                    false
                }
            })
            .collect()
    }

    /// Whether the valid credentials of `holder` meet `policy`.
    pub fn valid_document_for(
        &self,
        holder: &Address,
        policy: &DocumentPolicy,
        solver: &Solver,
    ) -> Result<bool, CredentialError> {
        let valid = self.valid_credentials_for(holder);
        Ok(policy.is_met_by(&valid, solver)?)
    }

    /// Whether `identity` holds a valid liveness credential for `challenge`.
    ///
    /// With no challenge any valid liveness credential is accepted.
    pub fn valid_authentication_for(
        &self,
        identity: &Address,
        challenge: Option<&[u8]>,
    ) -> Result<bool, CredentialError> {
        let expected: Option<Digest> = match challenge {
            Some(bytes) => Some(bytes.try_into().map_err(|_| {
                CredentialError::InvalidChallenge {
                    length: bytes.len(),
                }
            })?),
            None => None,
        };

        for credential in self.valid_credentials_for(identity) {
            if !credential.has_type(LIVENESS) {
                continue;
            }
            let Some(expected) = expected else {
                return Ok(true);
            };
            if let Some(evidence) = credential.evidence_of_type(BIOMETRIC_EVIDENCE) {
                if evidence.digest()? == expected {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Digest of the current biometric anchor of `holder`.
    ///
    /// The valid anchor credential with the latest `validFrom` wins; on a tie
    /// the first presented one does.
    pub fn biometric_anchor_hash_for(
        &self,
        holder: &Address,
    ) -> Result<Option<Digest>, CredentialError> {
        let mut anchor: Option<&VerifiableCredential> = None;
        for credential in self.valid_credentials_for(holder) {
            if !credential.has_type(BIOMETRIC_ANCHOR) {
                continue;
            }
            if anchor.map_or(true, |a| credential.valid_from > a.valid_from) {
                anchor = Some(credential);
            }
        }

        let Some(anchor) = anchor else {
            return Ok(None);
        };
        match anchor.evidence_of_type(BIOMETRIC_ANCHOR_EVIDENCE) {
            Some(evidence) => Ok(Some(evidence.digest()?)),
            None => Ok(None),
        }
    }
}
