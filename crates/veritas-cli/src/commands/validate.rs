//! `veritas validate` — Validate presentations and query a holder's standing.

use clap::Args;
use std::path::PathBuf;

use veritas_core::{Address, FixedClock};
use veritas_credentials::{CredentialGraph, Ed25519Verifier};
use veritas_identity::VerifiablePresentation;

use crate::config::VeritasConfig;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON array of verifiable presentations.
    #[arg(short, long)]
    pub presentations: PathBuf,

    /// Holder address to report on.
    #[arg(long)]
    pub holder: String,

    /// Evaluate as of this time (RFC 3339); defaults to now.
    #[arg(long)]
    pub at: Option<String>,

    /// Hex-encoded 32-byte liveness challenge.
    #[arg(long)]
    pub challenge: Option<String>,
}

pub fn run(args: &ValidateArgs, config: &VeritasConfig) -> anyhow::Result<()> {
    let presentations: Vec<VerifiablePresentation> = super::read_json(&args.presentations)?;
    let holder = Address::new(args.holder.as_str())?;
    let clock = FixedClock::new(super::timestamp_or_now(args.at.as_deref())?);
    let challenge = args.challenge.as_deref().map(hex::decode).transpose()?;

    let registry = config.build_registry()?;
    let verifier = Ed25519Verifier::new();
    let graph = CredentialGraph::build(&registry, &presentations, &verifier, &clock)?;

    println!("{} credential(s) presented", graph.len());
    for credential in graph.credentials_about(&holder) {
        match graph.validate(credential) {
            Ok(()) => println!("  [VALID]   {}", credential.id),
            Err(e) => println!("  [INVALID] {}: {}", credential.id, e),
        }
    }

    let policy = config.document_policy()?;
    let documented = graph.valid_document_for(&holder, &policy, &config.solver())?;
    println!("Identity document: {}", if documented { "yes" } else { "no" });

    let authenticated = graph.valid_authentication_for(&holder, challenge.as_deref())?;
    println!("Authenticated: {}", if authenticated { "yes" } else { "no" });

    match graph.biometric_anchor_hash_for(&holder)? {
        Some(digest) => println!("Biometric anchor: {}", hex::encode(digest)),
        None => println!("Biometric anchor: none"),
    }
    Ok(())
}
