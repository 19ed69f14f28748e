//! File-backed store backends.
//!
//! - [`FileDurableStore`]: one JSON object of string → string
//! - [`FileCookieJar`]: one JSON object of key → `{ value, expires_at }`
//!
//! Any I/O failure surfaces as `StorageUnavailable` so the caller can fall
//! back to memory. A file that exists but cannot be decoded is moved aside
//! and the store starts empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use hearth_core::clock::SharedClock;
use hearth_core::error::{HearthError, Result};
use hearth_core::store::{CookieEntry, StoreBackend, StoreKind};
use serde::{Serialize, de::DeserializeOwned};

use crate::storage::{AtomicFile, AtomicFileError};

fn unavailable(kind: StoreKind, err: AtomicFileError) -> HearthError {
    HearthError::storage_unavailable(kind, err.to_string())
}

/// Moves an undecodable file out of the way so the next write starts fresh.
fn quarantine<T>(file: &AtomicFile<T>, kind: StoreKind) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let path = file.path();
    let aside = path.with_extension("corrupt");
    tracing::warn!(
        "[Store] {} store file {:?} is corrupt, moving it to {:?}",
        kind,
        path,
        aside
    );
    fs::rename(path, &aside)
        .map_err(|e| HearthError::storage_unavailable(kind, format!("quarantine failed: {}", e)))
}

/// Loads the map, treating a corrupt file as empty.
fn load_map<V>(file: &AtomicFile<BTreeMap<String, V>>, kind: StoreKind) -> Result<BTreeMap<String, V>>
where
    V: Serialize + DeserializeOwned,
{
    match file.load() {
        Ok(map) => Ok(map.unwrap_or_default()),
        Err(e) if e.is_corrupt() => {
            quarantine(file, kind)?;
            Ok(BTreeMap::new())
        }
        Err(e) => Err(unavailable(kind, e)),
    }
}

/// Locked read-modify-write that survives a corrupt file once.
fn update_map<V, F, R>(file: &AtomicFile<BTreeMap<String, V>>, kind: StoreKind, f: F) -> Result<R>
where
    V: Serialize + DeserializeOwned,
    F: Fn(&mut BTreeMap<String, V>) -> R,
{
    match file.update(BTreeMap::new(), |map| Ok(f(map))) {
        Ok(result) => Ok(result),
        Err(e) if e.is_corrupt() => {
            quarantine(file, kind)?;
            file.update(BTreeMap::new(), |map| Ok(f(map)))
                .map_err(|e| unavailable(kind, e))
        }
        Err(e) => Err(unavailable(kind, e)),
    }
}

/// Durable backend persisted to a single JSON file.
pub struct FileDurableStore {
    file: AtomicFile<BTreeMap<String, String>>,
}

impl FileDurableStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }
}

impl StoreBackend for FileDurableStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Durable
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(load_map(&self.file, StoreKind::Durable)?.remove(key))
    }

    fn write(&self, key: &str, value: &str, _ttl_days: Option<u32>) -> Result<()> {
        update_map(&self.file, StoreKind::Durable, |map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.file.path().exists() {
            return Ok(());
        }
        update_map(&self.file, StoreKind::Durable, |map| {
            map.remove(key);
        })
    }

    fn entries(&self) -> Result<BTreeMap<String, String>> {
        load_map(&self.file, StoreKind::Durable)
    }

    fn clear(&self) -> Result<()> {
        self.file
            .delete()
            .map_err(|e| unavailable(StoreKind::Durable, e))
    }
}

/// Cookie backend persisted to a single JSON file.
///
/// Expired entries are filtered on read and purged on the next write.
pub struct FileCookieJar {
    file: AtomicFile<BTreeMap<String, CookieEntry>>,
    clock: SharedClock,
}

impl FileCookieJar {
    pub fn new(path: PathBuf, clock: SharedClock) -> Self {
        Self {
            file: AtomicFile::new(path),
            clock,
        }
    }

    /// Returns the raw entry, including its expiry, if still live.
    pub fn entry(&self, key: &str) -> Result<Option<CookieEntry>> {
        let now = self.clock.now();
        Ok(load_map(&self.file, StoreKind::Cookie)?
            .remove(key)
            .filter(|entry| entry.is_live(now)))
    }
}

impl StoreBackend for FileCookieJar {
    fn kind(&self) -> StoreKind {
        StoreKind::Cookie
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entry(key)?.map(|entry| entry.value))
    }

    fn write(&self, key: &str, value: &str, ttl_days: Option<u32>) -> Result<()> {
        let now = self.clock.now();
        let entry = CookieEntry::new(value, now, ttl_days);
        update_map(&self.file, StoreKind::Cookie, |map| {
            map.retain(|_, existing| existing.is_live(now));
            map.insert(key.to_string(), entry.clone());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.file.path().exists() {
            return Ok(());
        }
        let now = self.clock.now();
        update_map(&self.file, StoreKind::Cookie, |map| {
            map.retain(|_, existing| existing.is_live(now));
            map.remove(key);
        })
    }

    fn entries(&self) -> Result<BTreeMap<String, String>> {
        let now = self.clock.now();
        Ok(load_map(&self.file, StoreKind::Cookie)?
            .into_iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, entry)| (key, entry.value))
            .collect())
    }

    fn clear(&self) -> Result<()> {
        self.file
            .delete()
            .map_err(|e| unavailable(StoreKind::Cookie, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::clock::ManualClock;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_durable_store_persists_across_handles() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("durable.json");

        FileDurableStore::new(path.clone())
            .write("theme-mode", "light", None)
            .unwrap();

        let reopened = FileDurableStore::new(path);
        assert_eq!(reopened.read("theme-mode").unwrap().as_deref(), Some("light"));
        assert_eq!(reopened.read("language").unwrap(), None);
    }

    #[test]
    fn test_durable_remove_missing_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDurableStore::new(temp_dir.path().join("durable.json"));
        store.remove("user").unwrap();
        assert!(!temp_dir.path().join("durable.json").exists());
    }

    #[test]
    fn test_corrupt_durable_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("durable.json");
        fs::write(&path, "[[[").unwrap();

        let store = FileDurableStore::new(path);
        assert_eq!(store.read("user").unwrap(), None);
        assert!(temp_dir.path().join("durable.corrupt").exists());

        store.write("user", "{}", None).unwrap();
        assert_eq!(store.read("user").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_cookie_jar_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::default();
        let jar = FileCookieJar::new(temp_dir.path().join("cookies.json"), Arc::new(clock.clone()));

        jar.write("logged-in", "true", Some(7)).unwrap();
        jar.write("theme", "dark", Some(30)).unwrap();

        clock.advance_days(8);
        assert_eq!(jar.read("logged-in").unwrap(), None);
        assert_eq!(jar.read("theme").unwrap().as_deref(), Some("dark"));

        let live = jar.entries().unwrap();
        assert_eq!(live.keys().collect::<Vec<_>>(), vec!["theme"]);
    }

    #[test]
    fn test_cookie_jar_write_purges_expired() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cookies.json");
        let clock = ManualClock::default();
        let jar = FileCookieJar::new(path.clone(), Arc::new(clock.clone()));

        jar.write("username", "admin", Some(1)).unwrap();
        clock.advance_days(2);
        jar.write("language", "fr", None).unwrap();

        let raw = fs::read_to_string(path).unwrap();
        assert!(!raw.contains("username"));
        assert!(raw.contains("language"));
    }
}
