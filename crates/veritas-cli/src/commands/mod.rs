//! Subcommand implementations.

pub mod authority;
pub mod init;
pub mod matching;
pub mod missing;
pub mod validate;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

use veritas_core::{parse_timestamp, Timestamp};
use veritas_identity::VerifiableCredential;
use veritas_predicate::PredicateTree;

/// Read and decode a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

pub(crate) fn read_tree(path: &Path) -> anyhow::Result<PredicateTree> {
    read_json(path)
}

pub(crate) fn read_credentials(path: &Path) -> anyhow::Result<Vec<VerifiableCredential>> {
    read_json(path)
}

/// Parse an optional RFC 3339 override, defaulting to the wall clock.
pub(crate) fn timestamp_or_now(value: Option<&str>) -> anyhow::Result<Timestamp> {
    match value {
        Some(raw) => Ok(parse_timestamp(raw)?),
        None => Ok(chrono::Utc::now()),
    }
}
