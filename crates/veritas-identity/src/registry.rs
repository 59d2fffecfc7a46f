use chrono::DateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use veritas_core::{Address, Timestamp};

use crate::credentials::VerifiableCredential;
use crate::error::IdentityError;

/// Credential types any principal may assert about itself in the seeded registries.
pub const SELF_ISSUED_CREDENTIAL_TYPES: &[&str] = &[
    "ProfileNameCredential",
    "ProfileImageCredential",
    "ApplicationPublicKeyCredential",
];

/// Additional self-issued types available only in the sandbox registry.
pub const SANDBOX_ONLY_CREDENTIAL_TYPES: &[&str] = &["TestCredential"];

/// 2023-06-01T00:00:00Z
const PRODUCTION_EPOCH_SECS: i64 = 1_685_577_600;
/// 2023-01-01T00:00:00Z
const SANDBOX_EPOCH_SECS: i64 = 1_672_531_200;

/// A period during which an issuer was authorized to assert a credential type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityInterval {
    pub issuer: Address,
    pub credential_type: String,
    /// Inclusive start.
    pub granted_at: Timestamp,
    /// Exclusive end; `None` while the grant is open.
    pub revoked_at: Option<Timestamp>,
}

impl AuthorityInterval {
    /// Whether `at` lies in `[granted_at, revoked_at)`.
    pub fn contains(&self, at: Timestamp) -> bool {
        at >= self.granted_at && self.revoked_at.map(|r| at < r).unwrap_or(true)
    }

    /// Whether the grant has not been revoked.
    pub fn is_open(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// Registry of which issuers may assert which credential types, and when.
///
/// Issuers must be registered with [`add_issuer`](Self::add_issuer) before
/// authority can be granted to them. Intervals for the same
/// `(issuer, credential_type)` pair may overlap; coverage is their union.
///
/// Backed by a `DashMap`, so each mutation holds the write lock of the
/// issuer's shard while queries share read locks.
pub struct TrustedIssuerRegistry {
    /// Issuer address → credential type → grant history.
    issuers: DashMap<Address, HashMap<String, Vec<AuthorityInterval>>>,
    /// Credential type → instant from which it may be self-issued.
    self_issued: DashMap<String, Timestamp>,
}

impl TrustedIssuerRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            issuers: DashMap::new(),
            self_issued: DashMap::new(),
        }
    }

    /// The production bootstrap registry.
    pub fn production() -> Self {
        let registry = Self::new();
        let epoch = epoch(PRODUCTION_EPOCH_SECS);
        for credential_type in SELF_ISSUED_CREDENTIAL_TYPES {
            registry.allow_self_issued(credential_type, epoch);
        }
        registry
    }

    /// The sandbox bootstrap registry.
    pub fn sandbox() -> Self {
        let registry = Self::new();
        let epoch = epoch(SANDBOX_EPOCH_SECS);
        for credential_type in SELF_ISSUED_CREDENTIAL_TYPES
            .iter()
            .chain(SANDBOX_ONLY_CREDENTIAL_TYPES)
        {
            registry.allow_self_issued(credential_type, epoch);
        }
        registry
    }

    /// Register an issuer. Returns `false` if it was already known.
    pub fn add_issuer(&self, issuer: Address) -> bool {
        match self.issuers.entry(issuer) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                tracing::info!(issuer = %slot.key(), "issuer registered");
                slot.insert(HashMap::new());
                true
            }
        }
    }

    /// Forget an issuer and its whole grant history.
    pub fn remove_issuer(&self, issuer: &Address) -> bool {
        let removed = self.issuers.remove(issuer).is_some();
        if removed {
            tracing::info!(issuer = %issuer, "issuer removed");
        }
        removed
    }

    pub fn is_known_issuer(&self, issuer: &Address) -> bool {
        self.issuers.contains_key(issuer)
    }

    /// All registered issuers, sorted.
    pub fn issuers(&self) -> Vec<Address> {
        let mut issuers: Vec<Address> = self.issuers.iter().map(|e| e.key().clone()).collect();
        issuers.sort();
        issuers
    }

    /// Append an authority interval for `(issuer, credential_type)`.
    ///
    /// Returns `false` only when the issuer has not been registered.
    pub fn grant_authority(
        &self,
        issuer: &Address,
        credential_type: &str,
        granted_at: Timestamp,
        revoked_at: Option<Timestamp>,
    ) -> bool {
        let Some(mut grants) = self.issuers.get_mut(issuer) else {
            tracing::warn!(
                issuer = %issuer,
                credential_type,
                "authority grant for unregistered issuer ignored"
            );
            return false;
        };

        if let Some(revoked_at) = revoked_at {
            if revoked_at <= granted_at {
                tracing::warn!(
                    issuer = %issuer,
                    credential_type,
                    %granted_at,
                    %revoked_at,
                    "authority grant covers an empty interval"
                );
            }
        }

        grants
            .entry(credential_type.to_string())
            .or_default()
            .push(AuthorityInterval {
                issuer: issuer.clone(),
                credential_type: credential_type.to_string(),
                granted_at,
                revoked_at,
            });

        tracing::info!(
            issuer = %issuer,
            credential_type,
            %granted_at,
            revoked_at = ?revoked_at,
            "authority granted"
        );
        true
    }

    /// Close the most recently granted open interval for the pair at `revoked_at`.
    pub fn revoke_authority(
        &self,
        issuer: &Address,
        credential_type: &str,
        revoked_at: Timestamp,
    ) -> Result<(), IdentityError> {
        let without_grant = || IdentityError::RevokeWithoutGrant {
            issuer: issuer.clone(),
            credential_type: credential_type.to_string(),
        };

        let mut grants = self.issuers.get_mut(issuer).ok_or_else(without_grant)?;
        let intervals = grants
            .get_mut(credential_type)
            .ok_or_else(without_grant)?;

        // max_by_key keeps the last of equal keys, i.e. the latest appended.
        let latest_open = intervals
            .iter_mut()
            .filter(|interval| interval.is_open())
            .max_by_key(|interval| interval.granted_at)
            .ok_or_else(without_grant)?;

        latest_open.revoked_at = Some(revoked_at);
        tracing::info!(
            issuer = %issuer,
            credential_type,
            granted_at = %latest_open.granted_at,
            %revoked_at,
            "authority revoked"
        );
        Ok(())
    }

    /// Whether `issuer` was authorized for `credential_type` at `at`.
    pub fn authority_at(&self, issuer: &Address, credential_type: &str, at: Timestamp) -> bool {
        self.issuers
            .get(issuer)
            .and_then(|grants| {
                grants
                    .get(credential_type)
                    .map(|intervals| intervals.iter().any(|i| i.contains(at)))
            })
            .unwrap_or(false)
    }

    /// Every credential type `issuer` is authorized for at `now`, sorted.
    pub fn authority_for(&self, issuer: &Address, now: Timestamp) -> Vec<String> {
        let Some(grants) = self.issuers.get(issuer) else {
            return Vec::new();
        };
        let mut types: Vec<String> = grants
            .iter()
            .filter(|(_, intervals)| intervals.iter().any(|i| i.contains(now)))
            .map(|(credential_type, _)| credential_type.clone())
            .collect();
        types.sort();
        types
    }

    /// Grant history for the pair, in grant order.
    pub fn intervals(&self, issuer: &Address, credential_type: &str) -> Vec<AuthorityInterval> {
        self.issuers
            .get(issuer)
            .and_then(|grants| grants.get(credential_type).cloned())
            .unwrap_or_default()
    }

    /// Allow any principal to assert `credential_type` about itself from `granted_at`.
    pub fn allow_self_issued(&self, credential_type: &str, granted_at: Timestamp) {
        tracing::debug!(credential_type, %granted_at, "self-issued type allowed");
        self.self_issued
            .insert(credential_type.to_string(), granted_at);
    }

    /// Whether `credential_type` could be self-issued at `at`.
    pub fn self_issuable_at(&self, credential_type: &str, at: Timestamp) -> bool {
        self.self_issued
            .get(credential_type)
            .map(|from| at >= *from)
            .unwrap_or(false)
    }

    /// Self-issuable credential types, sorted.
    pub fn self_issued_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.self_issued.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    /// Whether the credential's issuer could assert `credential_type` at the
    /// credential's `validFrom`, either through a registry grant or as a
    /// self-issued type.
    pub fn may_issue(&self, credential: &VerifiableCredential, credential_type: &str) -> bool {
        let at = credential.valid_from;
        self.authority_at(&credential.issuer, credential_type, at)
            || (credential.is_self_issued() && self.self_issuable_at(credential_type, at))
    }

    /// Number of registered issuers.
    pub fn issuer_count(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty() && self.self_issued.is_empty()
    }
}

impl Default for TrustedIssuerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch(secs: i64) -> Timestamp {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
