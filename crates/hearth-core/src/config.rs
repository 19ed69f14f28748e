//! Runtime configuration for the persistence layer.

use serde::{Deserialize, Serialize};

use crate::preference::{DEFAULT_MODEL_ID, Language, Theme};
use crate::session::{Directory, DirectoryEntry, Role};

/// How boot-time restore treats disagreement between the durable record and
/// the cookie marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePolicy {
    /// Record and marker must both be present; a lone half is cleaned up.
    #[default]
    Reconcile,
    /// The durable record alone decides; a missing marker is re-issued.
    DurableAuthoritative,
}

/// Session lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Marker lifetime after a directory login.
    pub login_ttl_days: u32,
    /// Marker lifetime after signup ("remember me" flow).
    pub signup_ttl_days: u32,
    pub restore_policy: RestorePolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            login_ttl_days: 7,
            signup_ttl_days: 30,
            restore_policy: RestorePolicy::default(),
        }
    }
}

/// Defaults injected when a preference has never been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceDefaults {
    pub theme: Theme,
    pub language: Language,
    pub model_id: String,
    /// Lifetime of the theme/language cookies.
    pub cookie_ttl_days: u32,
}

impl Default for PreferenceDefaults {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: Language::default(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            cookie_ttl_days: 30,
        }
    }
}

/// One login directory account declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAccount {
    pub identifier: String,
    pub secret: String,
    #[serde(default)]
    pub role: Role,
    pub display_name: String,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HearthConfig {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub preferences: PreferenceDefaults,
    #[serde(default)]
    pub directory: Vec<DirectoryAccount>,
}

impl HearthConfig {
    /// Builds the login directory from the configured accounts.
    pub fn directory(&self) -> Directory {
        self.directory
            .iter()
            .map(|account| {
                (
                    account.identifier.clone(),
                    DirectoryEntry {
                        secret: account.secret.clone(),
                        role: account.role,
                        display_name: account.display_name.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = HearthConfig::default();
        assert_eq!(config.session.login_ttl_days, 7);
        assert_eq!(config.session.signup_ttl_days, 30);
        assert_eq!(config.session.restore_policy, RestorePolicy::Reconcile);
        assert_eq!(config.preferences.model_id, "gpt-3.5-turbo");
    }

    #[test]
    fn test_directory_from_accounts() {
        let config = HearthConfig {
            directory: vec![DirectoryAccount {
                identifier: "admin".to_string(),
                secret: "admin123".to_string(),
                role: Role::Admin,
                display_name: "Admin User".to_string(),
            }],
            ..HearthConfig::default()
        };
        let directory = config.directory();
        assert_eq!(directory.len(), 1);
        assert!(directory.authenticate("admin", "admin123").is_some());
    }
}
