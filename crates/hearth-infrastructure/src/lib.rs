pub mod config_service;
pub mod dto;
pub mod file_store;
pub mod paths;
pub mod snapshot_codec;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_store::{FileCookieJar, FileDurableStore};
pub use crate::paths::{HearthPaths, PathError};
