//! Veritas Credentials — credential graph, verifier, document policy and holder wallet.

pub mod error;
pub mod graph;
pub mod holder;
pub mod policy;
pub mod verifier;

pub use error::{CredentialError, VerificationError};
pub use graph::{CredentialGraph, CHALLENGE_LEN};
pub use holder::{CredentialWallet, PresentationRequest, PresentationResponse, TrustContext};
pub use policy::DocumentPolicy;
pub use verifier::{Ed25519Verifier, Verifier};
