//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs carry an explicit schema `version` and are converted to and
//! from the domain models through `version-migrate`.
//!
//! ### ConfigRoot Version History
//! - **1.0.0**: session settings, preference defaults, login directory
//!
//! ### StateSnapshot Version History
//! - **1.0.0**: session record, theme, language, preference map, scroll offset
//! - **1.1.0**: added selected model, custom models, device settings

mod config_root;
mod lenient;
mod snapshot;

pub use config_root::{
    CONFIG_ROOT_ENTITY, ConfigRoot, ConfigRootV1_0_0, create_config_root_migrator,
};
pub use snapshot::{
    SNAPSHOT_ENTITY, StateSnapshotDTO, StateSnapshotV1_0_0, StateSnapshotV1_1_0,
    create_snapshot_migrator,
};
