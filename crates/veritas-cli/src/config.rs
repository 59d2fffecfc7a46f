//! CLI configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use veritas_core::{Address, Timestamp};
use veritas_credentials::DocumentPolicy;
use veritas_identity::credential_types;
use veritas_identity::TrustedIssuerRegistry;
use veritas_predicate::{Solver, SolverLimits};

/// Full configuration for the Veritas CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VeritasConfig {
    /// Trusted issuer registry seed.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Structural caps and search budget.
    #[serde(default)]
    pub solver: SolverLimits,

    /// Identity document policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which seeded registry to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryProfile {
    #[default]
    Production,
    Sandbox,
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    #[serde(default)]
    pub profile: RegistryProfile,
    /// Issuers registered on top of the profile.
    #[serde(default)]
    pub issuers: Vec<IssuerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    pub address: Address,
    #[serde(default)]
    pub grants: Vec<GrantConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantConfig {
    pub credential_type: String,
    pub granted_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Credential types accepted as an identity document; any one suffices.
    #[serde(default = "default_required_types")]
    pub required_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_required_types() -> Vec<String> {
    vec![
        credential_types::PASSPORT.into(),
        credential_types::IDENTITY_CARD.into(),
        credential_types::DRIVING_LICENSE.into(),
    ]
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            required_types: default_required_types(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VeritasConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: VeritasConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Seed a registry from the profile and the configured issuers.
    pub fn build_registry(&self) -> anyhow::Result<TrustedIssuerRegistry> {
        let registry = match self.registry.profile {
            RegistryProfile::Production => TrustedIssuerRegistry::production(),
            RegistryProfile::Sandbox => TrustedIssuerRegistry::sandbox(),
            RegistryProfile::Empty => TrustedIssuerRegistry::new(),
        };
        for issuer in &self.registry.issuers {
            registry.add_issuer(issuer.address.clone());
            for grant in &issuer.grants {
                if !registry.grant_authority(
                    &issuer.address,
                    &grant.credential_type,
                    grant.granted_at,
                    grant.revoked_at,
                ) {
                    anyhow::bail!(
                        "could not grant {} to {}",
                        grant.credential_type,
                        issuer.address
                    );
                }
            }
        }
        Ok(registry)
    }

    pub fn solver(&self) -> Solver {
        Solver::new(self.solver)
    }

    pub fn document_policy(&self) -> anyhow::Result<DocumentPolicy> {
        Ok(DocumentPolicy::any_of_types(
            self.policy.required_types.iter().cloned(),
        )?)
    }
}
