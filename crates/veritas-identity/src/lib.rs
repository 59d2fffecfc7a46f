//! Veritas Identity Layer
//!
//! Provides the identity primitives the trust engine reasons about:
//! - Verifiable Credentials with Ed25519 proofs and attached evidence
//! - Verifiable Presentations bundling a holder's credentials
//! - The Trusted Issuer Registry of time-bounded issuer authority

pub mod credentials;
pub mod error;
pub mod presentation;
pub mod registry;

pub use credentials::{credential_types, CredentialProof, Evidence, VerifiableCredential};
pub use error::IdentityError;
pub use presentation::VerifiablePresentation;
pub use registry::{AuthorityInterval, TrustedIssuerRegistry};
