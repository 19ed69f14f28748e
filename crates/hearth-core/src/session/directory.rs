//! Static login directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::model::Role;

/// Credentials and identity data for one directory account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub secret: String,
    #[serde(default)]
    pub role: Role,
    pub display_name: String,
}

/// In-memory identifier → account mapping supplied by the caller.
///
/// This is not a credential service: secrets are compared verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: HashMap<String, DirectoryEntry>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an account.
    pub fn insert(
        &mut self,
        identifier: impl Into<String>,
        secret: impl Into<String>,
        role: Role,
        display_name: impl Into<String>,
    ) {
        self.entries.insert(
            identifier.into(),
            DirectoryEntry {
                secret: secret.into(),
                role,
                display_name: display_name.into(),
            },
        );
    }

    /// Builder form of [`Directory::insert`].
    pub fn with_account(
        mut self,
        identifier: impl Into<String>,
        secret: impl Into<String>,
        role: Role,
        display_name: impl Into<String>,
    ) -> Self {
        self.insert(identifier, secret, role, display_name);
        self
    }

    /// Returns the account only when `secret` matches exactly.
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Option<&DirectoryEntry> {
        self.entries
            .get(identifier)
            .filter(|entry| entry.secret == secret)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, DirectoryEntry)> for Directory {
    fn from_iter<I: IntoIterator<Item = (String, DirectoryEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_requires_exact_secret() {
        let directory = Directory::new().with_account("admin", "admin123", Role::Admin, "Admin User");

        assert!(directory.authenticate("admin", "admin123").is_some());
        assert!(directory.authenticate("admin", "Admin123").is_none());
        assert!(directory.authenticate("admin", "admin123 ").is_none());
        assert!(directory.authenticate("nobody", "admin123").is_none());
    }
}
