//! `veritas missing` — Report the predicates a credential set cannot meet.

use clap::Args;
use std::path::PathBuf;

use crate::config::VeritasConfig;

#[derive(Args, Debug)]
pub struct MissingArgs {
    /// Predicate tree JSON file.
    #[arg(short, long)]
    pub tree: PathBuf,

    /// JSON array of held credentials.
    #[arg(short, long)]
    pub credentials: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &MissingArgs, config: &VeritasConfig) -> anyhow::Result<()> {
    let tree = super::read_tree(&args.tree)?;
    let credentials = super::read_credentials(&args.credentials)?;

    let report = config.solver().find_missing_predicates(&tree, &credentials)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}
