pub mod clock;
pub mod config;
pub mod error;
pub mod keys;
pub mod preference;
pub mod session;
pub mod snapshot;
pub mod store;

// Re-export common error type
pub use error::{HearthError, Result};
