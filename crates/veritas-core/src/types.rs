use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Point in time used for validity windows and issuer authority.
pub type Timestamp = DateTime<Utc>;

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, CoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Address of a principal (issuer, subject, or holder).
///
/// For Ed25519-backed principals this is the hex-encoded public key, but the
/// type itself only guarantees a non-empty identifier without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Create an address, rejecting empty or whitespace-containing identifiers.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CoreError::InvalidAddress("address must not be empty".into()));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidAddress(format!(
                "address must not contain whitespace, got: {:?}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Address of a 32-byte public key: its lowercase hex encoding.
    pub fn from_key_bytes(key: &[u8; 32]) -> Self {
        Self(hex::encode(key))
    }

    /// Get the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
