//! Key-value storage contract shared by the durable and cookie backends.
//!
//! # Module Structure
//!
//! - `memory`: in-memory backends, used directly in tests and as the
//!   fallback when a persistent backend becomes unavailable

mod memory;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display};

use crate::error::Result;

pub use memory::{CookieEntry, MemoryCookieStore, MemoryDurableStore};

/// Default lifetime of a cookie entry when the caller gives none.
pub const DEFAULT_COOKIE_TTL_DAYS: u32 = 7;

/// Which physical substrate a backend represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreKind {
    /// Survives restarts; no expiry.
    Durable,
    /// Every entry expires; visible to the same-origin boundary.
    Cookie,
}

/// Uniform get/set/delete over one storage substrate.
///
/// Absence is never an error: `read` of a missing or expired key returns
/// `Ok(None)` and `remove` of a missing key returns `Ok(())`. Errors are
/// reserved for the backend itself being unusable.
pub trait StoreBackend: Send + Sync {
    /// The substrate this backend stands for.
    fn kind(&self) -> StoreKind;

    /// Reads a value.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value.
    ///
    /// Durable backends ignore `ttl_days`. Cookie backends expire the entry
    /// after `ttl_days` (or [`DEFAULT_COOKIE_TTL_DAYS`] when `None`).
    fn write(&self, key: &str, value: &str, ttl_days: Option<u32>) -> Result<()>;

    /// Deletes a value.
    fn remove(&self, key: &str) -> Result<()>;

    /// Returns every live entry, for diagnostics and export.
    fn entries(&self) -> Result<BTreeMap<String, String>>;

    /// Deletes every entry.
    fn clear(&self) -> Result<()>;
}
