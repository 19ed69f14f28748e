pub mod model;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use hearth_application::PersistenceManager;
use hearth_core::clock::SystemClock;
use hearth_core::config::HearthConfig;
use hearth_infrastructure::{ConfigService, HearthPaths};

/// Everything a command needs: resolved paths, configuration and a booted
/// persistence manager over the file-backed stores.
pub struct Workspace {
    pub paths: HearthPaths,
    pub config_file: PathBuf,
    pub config: HearthConfig,
    pub manager: PersistenceManager,
}

impl Workspace {
    pub fn open(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let paths = HearthPaths::new(data_dir);
        let config_service = match config_path {
            Some(path) => ConfigService::new(path),
            None => ConfigService::from_paths(&paths)?,
        };
        let config = config_service
            .get_config()
            .with_context(|| format!("Failed to load config from {:?}", config_service.path()))?;

        let manager = PersistenceManager::open_files(&paths, &config, Arc::new(SystemClock))?;
        manager.boot();

        Ok(Self {
            paths,
            config_file: config_service.path().to_path_buf(),
            config,
            manager,
        })
    }

    /// Prints a warning when a store fell back to memory.
    pub fn warn_if_degraded(&self) {
        if self.manager.is_degraded() {
            eprintln!("warning: storage unavailable, changes were kept in memory only");
        }
    }
}
