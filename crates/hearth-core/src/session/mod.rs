//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: session record, role, lifecycle state
//! - `directory`: caller-supplied identifier → credential mapping used by login

mod directory;
mod model;

pub use directory::{Directory, DirectoryEntry};
pub use model::{LoadedSession, Role, SessionRecord, SessionState, SignupRequest};
