use veritas_core::{Address, Timestamp};
use veritas_identity::IdentityError;
use veritas_predicate::PredicateError;

/// Failures reported by a [`crate::Verifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("{0} carries no proof")]
    MissingProof(String),

    #[error("no verification key for {0}")]
    MalformedIssuer(Address),

    #[error("invalid signature on {0}")]
    InvalidSignature(String),

    #[error("malformed: {0}")]
    Malformed(String),
}

/// Credential graph and wallet errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("issuer {issuer} had no authority for {credential_type} at {at}")]
    UnauthorizedIssuer {
        issuer: Address,
        credential_type: String,
        at: Timestamp,
    },

    #[error("credential {id} is not valid before {valid_from}")]
    NotYetValid { id: String, valid_from: Timestamp },

    #[error("credential {id} expired at {valid_until}")]
    Expired { id: String, valid_until: Timestamp },

    #[error("credential {id} lacks {evidence_type}")]
    MissingEvidence { id: String, evidence_type: String },

    #[error("authentication challenge must be 32 bytes, got {length}")]
    InvalidChallenge { length: usize },

    #[error("credential subject {subject} does not match holder {holder}")]
    SubjectMismatch { subject: Address, holder: Address },

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("predicate error: {0}")]
    Predicate(#[from] PredicateError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}
