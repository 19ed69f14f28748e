//! Unified path management for hearth files.
//!
//! Platform directories come from `AppPaths` (version-migrate). Every path
//! can be re-rooted under an explicit base directory, which is how the CLI's
//! `--data-dir` flag and the tests keep away from the real user profile.

use std::path::PathBuf;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolver for hearth.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/hearth/            # Config directory
/// └── config.toml              # HearthConfig
///
/// ~/.local/share/hearth/       # Data directory
/// ├── durable.json             # Durable key-value store
/// ├── cookies.json             # Expiring cookie jar
/// └── exports/                 # Snapshot exports written by the CLI
/// ```
///
/// With an override base, both trees collapse into that single directory.
#[derive(Debug, Clone, Default)]
pub struct HearthPaths {
    base_override: Option<PathBuf>,
}

impl HearthPaths {
    pub const APP_NAME: &'static str = "hearth";

    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base_override: Option<PathBuf>) -> Self {
        Self { base_override }
    }

    fn app_paths() -> AppPaths {
        AppPaths::new(Self::APP_NAME)
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_override {
            return Ok(base.clone());
        }
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_override {
            return Ok(base.clone());
        }
        Self::app_paths()
            .data_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn durable_store_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("durable.json"))
    }

    pub fn cookie_jar_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("cookies.json"))
    }

    pub fn exports_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_collapses_directories() {
        let paths = HearthPaths::new(Some(PathBuf::from("/tmp/hearth-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/hearth-test/config.toml")
        );
        assert_eq!(
            paths.durable_store_file().unwrap(),
            PathBuf::from("/tmp/hearth-test/durable.json")
        );
        assert_eq!(
            paths.cookie_jar_file().unwrap(),
            PathBuf::from("/tmp/hearth-test/cookies.json")
        );
        assert!(paths.exports_dir().unwrap().ends_with("exports"));
    }

    #[test]
    fn test_platform_config_dir() {
        let config_dir = HearthPaths::default().config_dir().unwrap();
        assert!(config_dir.ends_with("hearth"));
    }
}
