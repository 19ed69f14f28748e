//! In-memory store backends.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{DEFAULT_COOKIE_TTL_DAYS, StoreBackend, StoreKind};
use crate::clock::{SharedClock, SystemClock};
use crate::error::{HearthError, Result};

fn read_guard<T>(lock: &RwLock<T>, kind: StoreKind) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| HearthError::storage_unavailable(kind, "store lock poisoned"))
}

fn write_guard<T>(lock: &RwLock<T>, kind: StoreKind) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| HearthError::storage_unavailable(kind, "store lock poisoned"))
}

/// Durable backend that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryDurableStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryDurableStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Durable
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(read_guard(&self.entries, StoreKind::Durable)?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str, _ttl_days: Option<u32>) -> Result<()> {
        write_guard(&self.entries, StoreKind::Durable)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        write_guard(&self.entries, StoreKind::Durable)?.remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<BTreeMap<String, String>> {
        let entries = read_guard(&self.entries, StoreKind::Durable)?;
        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn clear(&self) -> Result<()> {
        write_guard(&self.entries, StoreKind::Durable)?.clear();
        Ok(())
    }
}

/// A single cookie value with its expiry instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CookieEntry {
    /// Builds an entry expiring `ttl_days` after `now`.
    pub fn new(value: impl Into<String>, now: DateTime<Utc>, ttl_days: Option<u32>) -> Self {
        let days = ttl_days.unwrap_or(DEFAULT_COOKIE_TTL_DAYS);
        Self {
            value: value.into(),
            expires_at: now + Duration::days(i64::from(days)),
        }
    }

    /// An entry is live strictly before its expiry instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Cookie backend that enforces expiry itself.
///
/// Expired entries are dropped lazily the next time they are touched.
pub struct MemoryCookieStore {
    entries: RwLock<HashMap<String, CookieEntry>>,
    clock: SharedClock,
}

impl MemoryCookieStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the raw entry, including its expiry, if still live.
    pub fn entry(&self, key: &str) -> Result<Option<CookieEntry>> {
        let now = self.clock.now();
        let mut entries = write_guard(&self.entries, StoreKind::Cookie)?;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for MemoryCookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCookieStore").finish_non_exhaustive()
    }
}

impl StoreBackend for MemoryCookieStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Cookie
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entry(key)?.map(|entry| entry.value))
    }

    fn write(&self, key: &str, value: &str, ttl_days: Option<u32>) -> Result<()> {
        let entry = CookieEntry::new(value, self.clock.now(), ttl_days);
        write_guard(&self.entries, StoreKind::Cookie)?.insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        write_guard(&self.entries, StoreKind::Cookie)?.remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<BTreeMap<String, String>> {
        let now = self.clock.now();
        let mut entries = write_guard(&self.entries, StoreKind::Cookie)?;
        entries.retain(|_, entry| entry.is_live(now));
        Ok(entries
            .iter()
            .map(|(k, entry)| (k.clone(), entry.value.clone()))
            .collect())
    }

    fn clear(&self) -> Result<()> {
        write_guard(&self.entries, StoreKind::Cookie)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_durable_read_missing_is_none() {
        let store = MemoryDurableStore::new();
        assert_eq!(store.read("user").unwrap(), None);
        store.remove("user").unwrap();
    }

    #[test]
    fn test_durable_ignores_ttl() {
        let store = MemoryDurableStore::new();
        store.write("theme-mode", "light", Some(1)).unwrap();
        assert_eq!(store.read("theme-mode").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_cookie_expires_after_default_ttl() {
        let clock = ManualClock::default();
        let store = MemoryCookieStore::new(Arc::new(clock.clone()));
        store.write("logged-in", "true", None).unwrap();

        clock.advance_days(6);
        assert_eq!(store.read("logged-in").unwrap().as_deref(), Some("true"));

        clock.advance_days(1);
        assert_eq!(store.read("logged-in").unwrap(), None);
    }

    #[test]
    fn test_cookie_custom_ttl_and_entries() {
        let clock = ManualClock::default();
        let store = MemoryCookieStore::new(Arc::new(clock.clone()));
        store.write("logged-in", "true", Some(30)).unwrap();
        store.write("theme", "dark", Some(1)).unwrap();

        clock.advance_days(2);
        let live = store.entries().unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live.get("logged-in").map(String::as_str), Some("true"));
    }
}
