use veritas_core::Address;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("no open authority grant for issuer {issuer} and type {credential_type}")]
    RevokeWithoutGrant {
        issuer: Address,
        credential_type: String,
    },

    #[error("credential issuance failed: {0}")]
    CredentialIssuance(String),

    #[error("credential verification failed: {0}")]
    CredentialVerification(String),

    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] veritas_crypto::CryptoError),
}
