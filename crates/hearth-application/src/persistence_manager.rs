//! Persistence manager facade.
//!
//! Composes the dual store, session store, preference store and scroll
//! coordinator behind the operations the rest of an application calls:
//! boot, session save/load/clear, settings save/load, preference merge and
//! whole-state export/import.

use std::sync::Arc;

use hearth_core::clock::{Clock, SharedClock};
use hearth_core::config::HearthConfig;
use hearth_core::error::{HearthError, Result};
use hearth_core::preference::{AppSettings, Language, PreferenceMap, Theme};
use hearth_core::session::{Directory, LoadedSession, SessionRecord, SessionState, SignupRequest};
use hearth_core::snapshot::StateSnapshot;
use hearth_infrastructure::paths::HearthPaths;
use hearth_infrastructure::snapshot_codec;
use hearth_infrastructure::{FileCookieJar, FileDurableStore};

use crate::dual_store::DualStore;
use crate::preference_store::PreferenceStore;
use crate::route_guard::{Navigation, RouteGuard};
use crate::scroll_restore::ScrollRestore;
use crate::session_store::SessionStore;

/// What collaborators need to render the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootState {
    pub session: SessionState,
    pub settings: AppSettings,
}

pub struct PersistenceManager {
    stores: Arc<DualStore>,
    clock: SharedClock,
    directory: Directory,
    session: SessionStore,
    preferences: PreferenceStore,
    scroll: ScrollRestore,
    route_guard: RouteGuard,
}

impl PersistenceManager {
    pub fn new(stores: Arc<DualStore>, config: &HearthConfig, clock: SharedClock) -> Self {
        Self {
            session: SessionStore::new(stores.clone(), clock.clone(), config.session.clone()),
            preferences: PreferenceStore::new(stores.clone(), config.preferences.clone()),
            scroll: ScrollRestore::new(stores.clone()),
            directory: config.directory(),
            route_guard: RouteGuard::default(),
            stores,
            clock,
        }
    }

    /// Both substrates in memory; nothing survives the process.
    pub fn in_memory(config: &HearthConfig, clock: SharedClock) -> Self {
        let stores = Arc::new(DualStore::in_memory(clock.clone()));
        Self::new(stores, config, clock)
    }

    /// File-backed substrates under the resolver's data directory.
    pub fn open_files(paths: &HearthPaths, config: &HearthConfig, clock: SharedClock) -> Result<Self> {
        let durable_path = paths
            .durable_store_file()
            .map_err(|e| HearthError::config(e.to_string()))?;
        let cookie_path = paths
            .cookie_jar_file()
            .map_err(|e| HearthError::config(e.to_string()))?;

        tracing::debug!(
            "[Persistence] Opening stores at {:?} and {:?}",
            durable_path,
            cookie_path
        );

        let stores = Arc::new(DualStore::new(
            Arc::new(FileDurableStore::new(durable_path)),
            Arc::new(FileCookieJar::new(cookie_path, clock.clone())),
            clock.clone(),
        ));
        Ok(Self::new(stores, config, clock))
    }

    /// Replaces the route guard's public route list.
    pub fn with_route_guard(mut self, route_guard: RouteGuard) -> Self {
        self.route_guard = route_guard;
        self
    }

    pub fn stores(&self) -> &DualStore {
        &self.stores
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn scroll(&self) -> &ScrollRestore {
        &self.scroll
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// True when either substrate has fallen back to memory.
    pub fn is_degraded(&self) -> bool {
        self.stores.is_degraded()
    }

    /// Restores the session and settings at application start.
    pub fn boot(&self) -> BootState {
        let session = self.session.restore_on_boot();
        if session.is_authenticated() {
            self.scroll.on_authenticated();
        }
        let settings = self.preferences.app_settings();

        tracing::info!(
            "[Persistence] Boot complete: authenticated={}, theme={}, language={}",
            session.is_authenticated(),
            settings.theme,
            settings.language
        );
        BootState { session, settings }
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Logs in against the configured directory.
    pub fn login(&self, identifier: &str, secret: &str) -> Result<bool> {
        self.login_with(identifier, secret, &self.directory)
    }

    /// Logs in against a caller-supplied directory.
    pub fn login_with(&self, identifier: &str, secret: &str, directory: &Directory) -> Result<bool> {
        let ok = self.session.login(identifier, secret, directory)?;
        if ok {
            self.scroll.on_authenticated();
        }
        Ok(ok)
    }

    pub fn signup(&self, request: SignupRequest) -> Result<SessionRecord> {
        let record = self.session.signup(request)?;
        self.scroll.on_authenticated();
        Ok(record)
    }

    pub fn logout(&self) -> Result<()> {
        self.scroll.on_logout();
        self.session.logout()
    }

    /// Stores `record` as the current session with the login marker TTL.
    pub fn save_session(&self, record: SessionRecord) -> Result<()> {
        let ttl_days = self.session.settings().login_ttl_days;
        self.session.adopt(record, ttl_days)?;
        self.scroll.on_authenticated();
        Ok(())
    }

    pub fn load_session(&self) -> LoadedSession {
        self.session.state().into()
    }

    pub fn clear_session(&self) -> Result<()> {
        self.logout()
    }

    /// Route guard decision for the current session.
    pub fn guard(&self, route: &str) -> Navigation {
        self.route_guard.check(route, self.session.is_authenticated())
    }

    /// Persists a scroll event if a session is active.
    pub fn record_scroll(&self, offset: u32) {
        self.scroll
            .record_scroll(offset, self.session.is_authenticated());
    }

    // ------------------------------------------------------------------
    // Settings and preferences
    // ------------------------------------------------------------------

    pub fn save_app_settings(&self, theme: Theme, language: Language) -> Result<()> {
        self.preferences
            .set_app_settings(AppSettings { theme, language })
    }

    pub fn load_app_settings(&self) -> AppSettings {
        self.preferences.app_settings()
    }

    /// Shallow-merges `partial` into the stored preference map.
    pub fn save_user_preferences(&self, partial: PreferenceMap) -> Result<PreferenceMap> {
        self.preferences.merge_user_preferences(partial)
    }

    pub fn load_user_preferences(&self) -> PreferenceMap {
        self.preferences.user_preferences()
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Captures everything this layer persists.
    pub fn export_all(&self) -> StateSnapshot {
        let session = self.session.state().record().cloned();
        let scroll_position = if session.is_some() {
            self.scroll.saved_offset()
        } else {
            0
        };

        StateSnapshot {
            exported_at: self.clock.now(),
            session,
            theme: self.preferences.theme(),
            language: self.preferences.language(),
            selected_model: self.preferences.selected_model(),
            custom_models: self.preferences.custom_models(),
            preferences: self.preferences.user_preferences(),
            device_settings: self.preferences.device_settings(),
            scroll_position,
        }
    }

    /// Overwrites the persisted state with `snapshot`.
    ///
    /// Internal consistency is not checked: a selected model missing from
    /// both catalogs is stored as given and later resolves as unknown.
    pub fn import_all(&self, snapshot: StateSnapshot) -> Result<()> {
        let StateSnapshot {
            session,
            theme,
            language,
            selected_model,
            custom_models,
            preferences,
            device_settings,
            scroll_position,
            ..
        } = snapshot;

        self.preferences.set_theme(theme)?;
        self.preferences.set_language(language)?;
        self.preferences.set_custom_models(&custom_models)?;
        self.preferences.update_selected_model(&selected_model)?;
        self.preferences.set_user_preferences(&preferences)?;
        self.preferences.set_device_settings(&device_settings)?;

        match session {
            Some(record) => {
                let ttl_days = self.session.settings().login_ttl_days;
                self.session.adopt(record, ttl_days)?;
                self.scroll.record_scroll(scroll_position, true);
                self.scroll.on_authenticated();
            }
            None => self.logout()?,
        }

        tracing::info!("[Persistence] Imported snapshot");
        Ok(())
    }

    /// [`export_all`](Self::export_all) in the versioned wire form.
    pub fn export_json(&self) -> Result<String> {
        snapshot_codec::encode(&self.export_all())
    }

    /// Decodes any known snapshot version and imports it.
    pub fn import_json(&self, input: &str) -> Result<()> {
        let snapshot = snapshot_codec::decode(input)?;
        self.import_all(snapshot)
    }

    /// Wipes both substrates and returns to the anonymous state.
    pub fn reset(&self) -> Result<()> {
        self.scroll.on_logout();
        self.session.logout()?;
        self.stores.clear_all()?;
        tracing::info!("[Persistence] All persisted state cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::clock::ManualClock;

    fn manager() -> PersistenceManager {
        PersistenceManager::in_memory(&HearthConfig::default(), Arc::new(ManualClock::default()))
    }

    #[test]
    fn test_boot_on_empty_stores() {
        let boot = manager().boot();
        assert_eq!(boot.session, SessionState::Anonymous);
        assert_eq!(boot.settings, AppSettings::default());
    }

    #[test]
    fn test_save_and_load_session() {
        let manager = manager();
        let record = SessionRecord::minimal("u-7", "Seven", Default::default());
        manager.save_session(record.clone()).unwrap();

        let loaded = manager.load_session();
        assert!(loaded.authenticated);
        assert_eq!(loaded.record, Some(record));

        manager.clear_session().unwrap();
        assert!(!manager.load_session().authenticated);
    }

    #[test]
    fn test_guard_follows_session() {
        let manager = manager();
        assert!(!manager.guard("/settings").is_allowed());
        manager
            .save_session(SessionRecord::minimal("u-1", "One", Default::default()))
            .unwrap();
        assert!(manager.guard("/settings").is_allowed());
    }

    #[test]
    fn test_anonymous_export_has_no_scroll() {
        let manager = manager();
        manager.record_scroll(120);
        let snapshot = manager.export_all();
        assert!(snapshot.session.is_none());
        assert_eq!(snapshot.scroll_position, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let manager = manager();
        manager
            .save_app_settings(Theme::Light, Language::Fr)
            .unwrap();
        manager
            .save_session(SessionRecord::minimal("u-1", "One", Default::default()))
            .unwrap();

        manager.reset().unwrap();

        assert!(manager.stores().durable().entries().unwrap().is_empty());
        assert!(manager.stores().cookie().entries().unwrap().is_empty());
        assert_eq!(manager.load_app_settings(), AppSettings::default());
    }
}
