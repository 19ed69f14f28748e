//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` through the versioned
//! `ConfigRoot` DTO, writing a default file on first use.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use hearth_core::config::{DirectoryAccount, HearthConfig};
use hearth_core::error::{HearthError, Result};
use hearth_core::session::Role;

use crate::dto::{CONFIG_ROOT_ENTITY, create_config_root_migrator};
use crate::paths::HearthPaths;
use crate::storage::AtomicFile;

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<HearthConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the given file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service for the resolver's `config.toml`.
    pub fn from_paths(paths: &HearthPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| HearthError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<HearthConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| HearthError::internal("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| HearthError::internal("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Persists `config` and replaces the cached copy.
    pub fn save_config(&self, config: &HearthConfig) -> Result<()> {
        let migrator = create_config_root_migrator()?;
        let json = migrator.save_domain_flat(CONFIG_ROOT_ENTITY, config.clone())?;
        let json_value: serde_json::Value = serde_json::from_str(&json)?;
        let toml_value: toml::Value = serde_json::from_value(json_value)?;

        AtomicFile::<toml::Value>::new(self.path.clone())
            .save(&toml_value)
            .map_err(|e| HearthError::config(format!("{:?}: {}", self.path, e)))?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| HearthError::internal("config cache lock poisoned"))?;
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(&self) -> Result<HearthConfig> {
        let file = AtomicFile::<toml::Value>::new(self.path.clone());
        let raw = file
            .load()
            .map_err(|e| HearthError::config(format!("{:?}: {}", self.path, e)))?;

        let Some(toml_value) = raw else {
            let config = default_config();
            tracing::info!("[Config] Writing default configuration to {:?}", self.path);
            self.save_config(&config)?;
            return Ok(config);
        };

        let migrator = create_config_root_migrator()?;
        let config = migrator.load_flat_from(CONFIG_ROOT_ENTITY, toml_value)?;
        tracing::debug!("[Config] Loaded configuration from {:?}", self.path);
        Ok(config)
    }
}

/// Configuration written on first run: stock settings plus two demo accounts.
pub fn default_config() -> HearthConfig {
    HearthConfig {
        directory: vec![
            DirectoryAccount {
                identifier: "admin".to_string(),
                secret: "admin123".to_string(),
                role: Role::Admin,
                display_name: "Admin User".to_string(),
            },
            DirectoryAccount {
                identifier: "user".to_string(),
                secret: "user123".to_string(),
                role: Role::User,
                display_name: "Regular User".to_string(),
            },
        ],
        ..HearthConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::config::RestorePolicy;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_writes_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());

        let config = service.get_config().unwrap();
        assert_eq!(config, default_config());

        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("version = \"1.0.0\""));
        assert!(raw.contains("admin123"));
    }

    #[test]
    fn test_reads_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "version = \"1.0.0\"\n\n[session]\nrestore_policy = \"durable_authoritative\"\n",
        )
        .unwrap();

        let config = ConfigService::new(path).get_config().unwrap();
        assert_eq!(config.session.restore_policy, RestorePolicy::DurableAuthoritative);
        assert_eq!(config.session.login_ttl_days, 7);
        assert!(config.directory.is_empty());
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());
        service.get_config().unwrap();

        fs::write(&path, "version = \"1.0.0\"\n\n[session]\nlogin_ttl_days = 2\n").unwrap();
        assert_eq!(service.get_config().unwrap().session.login_ttl_days, 7);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().session.login_ttl_days, 2);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[session\n").unwrap();

        let err = ConfigService::new(path).get_config().unwrap_err();
        assert!(matches!(err, HearthError::Config(_)));
    }
}
