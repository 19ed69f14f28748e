//! Dual store adapter.
//!
//! Pairs a durable backend with a cookie backend and gives every caller the
//! same read/write/remove surface over both. Each backend sits in a
//! [`BackendSlot`] that falls back to memory the first time the backend
//! reports itself unusable.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hearth_core::clock::SharedClock;
use hearth_core::error::Result;
use hearth_core::store::{MemoryCookieStore, MemoryDurableStore, StoreBackend, StoreKind};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// One backend plus the in-memory stand-in used once it fails.
///
/// Degradation is one-way: after the first `StorageUnavailable` error every
/// later call goes straight to the fallback for the rest of the process. The
/// fallback starts with whatever the primary still lists at that moment.
pub struct BackendSlot {
    primary: Arc<dyn StoreBackend>,
    fallback: Arc<dyn StoreBackend>,
    degraded: AtomicBool,
}

impl BackendSlot {
    pub fn new(primary: Arc<dyn StoreBackend>, fallback: Arc<dyn StoreBackend>) -> Self {
        Self {
            primary,
            fallback,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> StoreKind {
        self.primary.kind()
    }

    /// True once this slot has switched to its fallback.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    fn run<T, F>(&self, op: &str, f: F) -> Result<T>
    where
        F: Fn(&dyn StoreBackend) -> Result<T>,
    {
        if self.is_degraded() {
            return f(self.fallback.as_ref());
        }

        match f(self.primary.as_ref()) {
            Err(e) if e.is_storage_unavailable() => {
                tracing::warn!(
                    "[Store] {} backend failed during {}: {}. Falling back to memory",
                    self.kind(),
                    op,
                    e
                );
                if !self.degraded.swap(true, Ordering::SeqCst) {
                    self.seed_fallback();
                }
                f(self.fallback.as_ref())
            }
            other => other,
        }
    }

    /// Copies the primary's live entries into the fallback.
    ///
    /// Cookie entries get the backend's default TTL since the remaining
    /// lifetime is not listed.
    fn seed_fallback(&self) {
        let entries = match self.primary.entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "[Store] Could not copy {} entries into memory, starting empty: {}",
                    self.kind(),
                    e
                );
                return;
            }
        };

        let mut copied = 0usize;
        for (key, value) in &entries {
            match self.fallback.write(key, value, None) {
                Ok(()) => copied += 1,
                Err(e) => tracing::warn!("[Store] Could not copy '{}' into memory: {}", key, e),
            }
        }
        tracing::debug!("[Store] Copied {} {} entries into memory", copied, self.kind());
    }

    pub fn read(&self, key: &str) -> Result<Option<String>> {
        self.run("read", |backend| backend.read(key))
    }

    pub fn write(&self, key: &str, value: &str, ttl_days: Option<u32>) -> Result<()> {
        self.run("write", |backend| backend.write(key, value, ttl_days))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.run("remove", |backend| backend.remove(key))
    }

    pub fn entries(&self) -> Result<BTreeMap<String, String>> {
        self.run("entries", |backend| backend.entries())
    }

    pub fn clear(&self) -> Result<()> {
        self.run("clear", |backend| backend.clear())
    }

    /// Reads and decodes a JSON value.
    ///
    /// A value that is present but does not decode as `T` is logged and
    /// reported as absent, so callers inject their default.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.read(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(
                    "[Store] Ignoring malformed {} value under '{}': {}",
                    self.kind(),
                    key,
                    e
                );
                Ok(None)
            }
        }
    }

    pub fn write_json<T: Serialize>(&self, key: &str, value: &T, ttl_days: Option<u32>) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.write(key, &encoded, ttl_days)
    }
}

/// The durable and cookie substrates behind one handle.
pub struct DualStore {
    durable: BackendSlot,
    cookie: BackendSlot,
}

impl DualStore {
    /// Wraps the given backends. Fallbacks are fresh in-memory stores, the
    /// cookie one sharing `clock` so expiry still applies after degradation.
    pub fn new(
        durable: Arc<dyn StoreBackend>,
        cookie: Arc<dyn StoreBackend>,
        clock: SharedClock,
    ) -> Self {
        Self {
            durable: BackendSlot::new(durable, Arc::new(MemoryDurableStore::new())),
            cookie: BackendSlot::new(cookie, Arc::new(MemoryCookieStore::new(clock))),
        }
    }

    /// Both substrates in memory.
    pub fn in_memory(clock: SharedClock) -> Self {
        Self::new(
            Arc::new(MemoryDurableStore::new()),
            Arc::new(MemoryCookieStore::new(clock.clone())),
            clock,
        )
    }

    pub fn durable(&self) -> &BackendSlot {
        &self.durable
    }

    pub fn cookie(&self) -> &BackendSlot {
        &self.cookie
    }

    /// True when either backend has fallen back to memory.
    pub fn is_degraded(&self) -> bool {
        self.durable.is_degraded() || self.cookie.is_degraded()
    }

    /// Empties both substrates.
    pub fn clear_all(&self) -> Result<()> {
        self.durable.clear()?;
        self.cookie.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::clock::ManualClock;
    use hearth_core::error::HearthError;
    use std::sync::atomic::AtomicUsize;

    /// Backend that is always unavailable and counts how often it was tried.
    #[derive(Default)]
    struct BrokenBackend {
        calls: AtomicUsize,
    }

    impl BrokenBackend {
        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(HearthError::storage_unavailable(StoreKind::Durable, "disk gone"))
        }
    }

    impl StoreBackend for BrokenBackend {
        fn kind(&self) -> StoreKind {
            StoreKind::Durable
        }
        fn read(&self, _key: &str) -> Result<Option<String>> {
            self.fail()
        }
        fn write(&self, _key: &str, _value: &str, _ttl_days: Option<u32>) -> Result<()> {
            self.fail()
        }
        fn remove(&self, _key: &str) -> Result<()> {
            self.fail()
        }
        fn entries(&self) -> Result<BTreeMap<String, String>> {
            self.fail()
        }
        fn clear(&self) -> Result<()> {
            self.fail()
        }
    }

    #[test]
    fn test_degrades_once_and_keeps_working() {
        let broken = Arc::new(BrokenBackend::default());
        let slot = BackendSlot::new(broken.clone(), Arc::new(MemoryDurableStore::new()));

        slot.write("theme-mode", "light", None).unwrap();
        assert!(slot.is_degraded());
        assert_eq!(slot.read("theme-mode").unwrap().as_deref(), Some("light"));
        slot.remove("theme-mode").unwrap();

        // The failed write plus the listing attempted while seeding.
        assert_eq!(broken.calls.load(Ordering::SeqCst), 2);
    }

    /// Backend whose writes fail while reads keep working, like a full disk.
    #[derive(Default)]
    struct ReadOnlyBackend {
        inner: MemoryDurableStore,
    }

    impl StoreBackend for ReadOnlyBackend {
        fn kind(&self) -> StoreKind {
            StoreKind::Durable
        }
        fn read(&self, key: &str) -> Result<Option<String>> {
            self.inner.read(key)
        }
        fn write(&self, _key: &str, _value: &str, _ttl_days: Option<u32>) -> Result<()> {
            Err(HearthError::storage_unavailable(StoreKind::Durable, "disk full"))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(HearthError::storage_unavailable(StoreKind::Durable, "disk full"))
        }
        fn entries(&self) -> Result<BTreeMap<String, String>> {
            self.inner.entries()
        }
        fn clear(&self) -> Result<()> {
            Err(HearthError::storage_unavailable(StoreKind::Durable, "disk full"))
        }
    }

    #[test]
    fn test_degraded_slot_keeps_existing_entries() {
        let primary = ReadOnlyBackend::default();
        primary.inner.write("theme-mode", "light", None).unwrap();
        primary.inner.write("language", "fr", None).unwrap();
        let slot = BackendSlot::new(Arc::new(primary), Arc::new(MemoryDurableStore::new()));

        slot.write("device-settings", "{}", None).unwrap();
        assert!(slot.is_degraded());

        assert_eq!(slot.read("theme-mode").unwrap().as_deref(), Some("light"));
        assert_eq!(slot.read("language").unwrap().as_deref(), Some("fr"));
        assert_eq!(slot.read("device-settings").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_malformed_json_reads_as_absent() {
        let stores = DualStore::in_memory(Arc::new(ManualClock::default()));
        stores.durable().write("preferences", "{oops", None).unwrap();

        let value: Option<serde_json::Value> = stores.durable().read_json("preferences").unwrap();
        assert!(value.is_none());
        assert!(!stores.is_degraded());
    }

    #[test]
    fn test_json_helpers() {
        let stores = DualStore::in_memory(Arc::new(ManualClock::default()));
        stores
            .durable()
            .write_json("custom_models", &vec!["a", "b"], None)
            .unwrap();
        let models: Vec<String> = stores.durable().read_json("custom_models").unwrap().unwrap();
        assert_eq!(models, vec!["a", "b"]);
    }

    #[test]
    fn test_cookie_fallback_keeps_expiry() {
        let clock = ManualClock::default();
        let shared: SharedClock = Arc::new(clock.clone());
        let stores = DualStore::new(
            Arc::new(MemoryDurableStore::new()),
            Arc::new(BrokenCookie),
            shared,
        );

        stores.cookie().write("logged-in", "true", Some(1)).unwrap();
        assert!(stores.is_degraded());
        clock.advance_days(2);
        assert_eq!(stores.cookie().read("logged-in").unwrap(), None);
    }

    struct BrokenCookie;

    impl StoreBackend for BrokenCookie {
        fn kind(&self) -> StoreKind {
            StoreKind::Cookie
        }
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(HearthError::storage_unavailable(StoreKind::Cookie, "blocked"))
        }
        fn write(&self, _key: &str, _value: &str, _ttl_days: Option<u32>) -> Result<()> {
            Err(HearthError::storage_unavailable(StoreKind::Cookie, "blocked"))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(HearthError::storage_unavailable(StoreKind::Cookie, "blocked"))
        }
        fn entries(&self) -> Result<BTreeMap<String, String>> {
            Err(HearthError::storage_unavailable(StoreKind::Cookie, "blocked"))
        }
        fn clear(&self) -> Result<()> {
            Err(HearthError::storage_unavailable(StoreKind::Cookie, "blocked"))
        }
    }
}
