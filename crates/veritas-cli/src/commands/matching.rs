//! `veritas match` — Select the minimal credential set for a request.

use clap::Args;
use std::path::PathBuf;

use crate::config::VeritasConfig;

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Predicate tree JSON file.
    #[arg(short, long)]
    pub tree: PathBuf,

    /// JSON array of candidate credentials.
    #[arg(short, long)]
    pub credentials: PathBuf,

    /// Print the selected credentials as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &MatchArgs, config: &VeritasConfig) -> anyhow::Result<()> {
    let tree = super::read_tree(&args.tree)?;
    let credentials = super::read_credentials(&args.credentials)?;

    let result = config.solver().find_optimal_match(&tree, &credentials)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.selected)?);
        return Ok(());
    }
    if !result.found {
        println!("No credential set satisfies the request.");
        return Ok(());
    }
    println!(
        "Request satisfied by {} of {} credential(s):",
        result.selected.len(),
        credentials.len()
    );
    for credential in &result.selected {
        println!(
            "  {} [{}] issued by {}",
            credential.id,
            credential.declared_types().collect::<Vec<_>>().join(", "),
            credential.issuer
        );
    }
    Ok(())
}
