//! ConfigRoot DTOs and migrations
//!
//! Versioned schema of `config.toml`.

use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

use hearth_core::config::{DirectoryAccount, HearthConfig, PreferenceDefaults, SessionSettings};
use hearth_core::error::Result;

/// Entity name registered with the migrator.
pub const CONFIG_ROOT_ENTITY: &str = "config_root";

/// Root configuration V1.0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ConfigRootV1_0_0 {
    /// Marker TTLs and boot restore policy.
    #[serde(default)]
    pub session: SessionSettings,

    /// Defaults injected for unset preferences.
    #[serde(default)]
    pub preferences: PreferenceDefaults,

    /// Accounts accepted by `hearth login`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directory: Vec<DirectoryAccount>,
}

/// Type alias for the latest ConfigRoot version.
pub type ConfigRoot = ConfigRootV1_0_0;

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<HearthConfig> for ConfigRootV1_0_0 {
    fn into_domain(self) -> HearthConfig {
        HearthConfig {
            session: self.session,
            preferences: self.preferences,
            directory: self.directory,
        }
    }
}

impl version_migrate::FromDomain<HearthConfig> for ConfigRootV1_0_0 {
    fn from_domain(config: HearthConfig) -> Self {
        ConfigRootV1_0_0 {
            session: config.session,
            preferences: config.preferences,
            directory: config.directory,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a Migrator for the root configuration.
///
/// # Migration Path
///
/// - V1.0.0 → HearthConfig: Converts DTO to domain model
pub fn create_config_root_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let config_path = version_migrate::Migrator::define(CONFIG_ROOT_ENTITY)
        .from::<ConfigRootV1_0_0>()
        .into_with_save::<HearthConfig>();

    migrator.register(config_path)?;

    Ok(migrator)
}
