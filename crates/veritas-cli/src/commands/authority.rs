//! `veritas authority` — Query issuer authority in the configured registry.

use clap::Args;

use veritas_core::Address;

use crate::config::VeritasConfig;

#[derive(Args, Debug)]
pub struct AuthorityArgs {
    /// Issuer address.
    #[arg(short, long)]
    pub issuer: String,

    /// Check a single credential type instead of listing all.
    #[arg(short = 't', long = "type")]
    pub credential_type: Option<String>,

    /// Point in time (RFC 3339); defaults to now.
    #[arg(long)]
    pub at: Option<String>,

    /// List the raw authority intervals for --type.
    #[arg(long, requires = "credential_type")]
    pub intervals: bool,
}

pub fn run(args: &AuthorityArgs, config: &VeritasConfig) -> anyhow::Result<()> {
    let registry = config.build_registry()?;
    let issuer = Address::new(args.issuer.as_str())?;
    let at = super::timestamp_or_now(args.at.as_deref())?;

    if !registry.is_known_issuer(&issuer) {
        println!("{} is not a registered issuer", issuer);
    }

    match &args.credential_type {
        Some(credential_type) if args.intervals => {
            let intervals = registry.intervals(&issuer, credential_type);
            if intervals.is_empty() {
                println!("No grants of {} to {}", credential_type, issuer);
            }
            for interval in intervals {
                match interval.revoked_at {
                    Some(revoked) => println!("  [{}, {})", interval.granted_at, revoked),
                    None => println!("  [{}, open)", interval.granted_at),
                }
            }
        }
        Some(credential_type) => {
            let granted = registry.authority_at(&issuer, credential_type, at);
            println!(
                "{} {} authority for {} at {}",
                issuer,
                if granted { "has" } else { "does not have" },
                credential_type,
                at
            );
        }
        None => {
            let types = registry.authority_for(&issuer, at);
            println!("{} may issue {} type(s) at {}:", issuer, types.len(), at);
            for credential_type in types {
                println!("  {}", credential_type);
            }
        }
    }
    Ok(())
}
