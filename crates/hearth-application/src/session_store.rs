//! Session store.
//!
//! Sole writer of the durable `user` record and the cookie session markers.
//! The durable record carries the identity; the `logged-in` marker is the
//! expiry signal. Login and signup write both, logout removes both, and
//! boot-time restore reconciles them according to [`RestorePolicy`].

use std::sync::{Arc, RwLock};

use hearth_core::clock::SharedClock;
use hearth_core::config::{RestorePolicy, SessionSettings};
use hearth_core::error::{HearthError, Result};
use hearth_core::keys::{cookie, durable};
use hearth_core::session::{Directory, Role, SessionRecord, SessionState, SignupRequest};
use hearth_core::store::StoreKind;
use uuid::Uuid;

use crate::dual_store::DualStore;

pub struct SessionStore {
    stores: Arc<DualStore>,
    clock: SharedClock,
    settings: SessionSettings,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(stores: Arc<DualStore>, clock: SharedClock, settings: SessionSettings) -> Self {
        Self {
            stores,
            clock,
            settings,
            state: RwLock::new(SessionState::Anonymous),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Current in-memory state.
    pub fn state(&self) -> SessionState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    fn set_state(&self, next: SessionState) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = next;
    }

    /// Checks `secret` against `directory` and starts a session on a match.
    ///
    /// Returns `Ok(false)` on a bad identifier or secret; nothing is written
    /// and the current state is kept.
    pub fn login(&self, identifier: &str, secret: &str, directory: &Directory) -> Result<bool> {
        let Some(entry) = directory.authenticate(identifier, secret) else {
            tracing::info!("[Session] Login rejected for '{}'", identifier);
            return Ok(false);
        };

        let mut record = SessionRecord::minimal(identifier, entry.display_name.clone(), entry.role);
        record.last_login = Some(self.clock.now());

        self.persist(
            &record,
            &[(cookie::USERNAME, identifier)],
            self.settings.login_ttl_days,
        )?;

        tracing::info!("[Session] Logged in as '{}' ({})", identifier, entry.role);
        self.set_state(SessionState::Authenticated(record));
        Ok(true)
    }

    /// Creates a fresh identity from a signup form and starts a session.
    ///
    /// Email and password are required. No uniqueness check is made, so
    /// repeated signups with the same email produce distinct records.
    pub fn signup(&self, request: SignupRequest) -> Result<SessionRecord> {
        let email = request.email.trim();
        if email.is_empty() {
            return Err(HearthError::validation("email is required"));
        }
        if request.password.trim().is_empty() {
            return Err(HearthError::validation("password is required"));
        }

        let now = self.clock.now();
        let display_name = request
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.to_string());

        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            display_name,
            role: request.role.unwrap_or(Role::User),
            email: Some(email.to_string()),
            company: request.company,
            date_of_birth: request.date_of_birth,
            address: request.address,
            created_at: Some(now),
            last_login: Some(now),
        };

        self.persist(
            &record,
            &[(cookie::USER_EMAIL, email), (cookie::USER_ID, record.id.as_str())],
            self.settings.signup_ttl_days,
        )?;

        tracing::info!("[Session] Signed up new identity {}", record.id);
        self.set_state(SessionState::Authenticated(record.clone()));
        Ok(record)
    }

    /// Makes an externally supplied record the current session.
    pub fn adopt(&self, record: SessionRecord, ttl_days: u32) -> Result<()> {
        let mut markers = vec![(cookie::USERNAME, record.id.as_str())];
        if let Some(email) = record.email.as_deref() {
            markers.push((cookie::USER_EMAIL, email));
        }
        self.persist(&record, &markers, ttl_days)?;

        tracing::debug!("[Session] Adopted session for '{}'", record.id);
        self.set_state(SessionState::Authenticated(record));
        Ok(())
    }

    /// Ends the session. Safe to call when already anonymous.
    ///
    /// Every removal is attempted even if an earlier one fails; the first
    /// error is returned.
    pub fn logout(&self) -> Result<()> {
        let was_authenticated = self.is_authenticated();
        self.set_state(SessionState::Anonymous);

        let result = self.clear_persisted();
        if was_authenticated {
            tracing::info!("[Session] Logged out");
        }
        result
    }

    /// Rebuilds the in-memory state from the stores at startup.
    pub fn restore_on_boot(&self) -> SessionState {
        let record = self.read_record();
        let has_marker = match self.stores.cookie().read(cookie::LOGGED_IN) {
            Ok(value) => value.as_deref() == Some(cookie::LOGGED_IN_VALUE),
            Err(e) => {
                tracing::warn!("[Session] Could not read session marker: {}", e);
                false
            }
        };

        // A jar that could not be read says nothing about expiry.
        let policy = if self.stores.cookie().is_degraded() {
            RestorePolicy::DurableAuthoritative
        } else {
            self.settings.restore_policy
        };

        let state = match (record, has_marker, policy) {
            (Some(record), true, _) => SessionState::Authenticated(record),
            (Some(record), false, RestorePolicy::DurableAuthoritative) => {
                tracing::info!("[Session] Re-issuing missing marker for '{}'", record.id);
                let markers = [(cookie::USERNAME, record.id.as_str())];
                if let Err(e) = self.write_markers(&markers, self.settings.login_ttl_days) {
                    tracing::warn!("[Session] Could not re-issue marker: {}", e);
                }
                SessionState::Authenticated(record)
            }
            (Some(record), false, RestorePolicy::Reconcile) => {
                tracing::info!("[Session] Session for '{}' expired, clearing it", record.id);
                self.discard_leftovers();
                SessionState::Anonymous
            }
            (None, true, _) if self.stores.durable().is_degraded() => {
                tracing::warn!("[Session] Session record unreadable, keeping markers");
                SessionState::Anonymous
            }
            (None, true, _) => {
                tracing::info!("[Session] Removing orphan session markers");
                self.discard_leftovers();
                SessionState::Anonymous
            }
            (None, false, _) => SessionState::Anonymous,
        };

        self.set_state(state.clone());
        state
    }

    /// Reads the durable record, removing it if it does not decode.
    fn read_record(&self) -> Option<SessionRecord> {
        let raw = match self.stores.durable().read(durable::USER) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("[Session] Could not read session record: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("[Session] Discarding malformed session record: {}", e);
                if let Err(e) = self.stores.durable().remove(durable::USER) {
                    tracing::warn!("[Session] Could not remove malformed record: {}", e);
                }
                None
            }
        }
    }

    /// Writes the record, then replaces the markers.
    ///
    /// If the markers cannot be written the record is removed again so the
    /// two substrates do not disagree.
    fn persist(&self, record: &SessionRecord, markers: &[(&str, &str)], ttl_days: u32) -> Result<()> {
        self.stores.durable().write_json(durable::USER, record, None)?;

        if let Err(e) = self.write_markers(markers, ttl_days) {
            if let Err(rollback) = self.stores.durable().remove(durable::USER) {
                tracing::warn!("[Session] Rollback of session record failed: {}", rollback);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Clears stale markers from an earlier session and writes the new set
    /// plus `logged-in`.
    fn write_markers(&self, markers: &[(&str, &str)], ttl_days: u32) -> Result<()> {
        let jar = self.stores.cookie();
        for key in cookie::SESSION_MARKERS {
            if !markers.iter().any(|(k, _)| *k == key) {
                jar.remove(key)?;
            }
        }
        jar.write(cookie::LOGGED_IN, cookie::LOGGED_IN_VALUE, Some(ttl_days))?;
        for (key, value) in markers {
            jar.write(key, value, Some(ttl_days))?;
        }
        Ok(())
    }

    fn clear_persisted(&self) -> Result<()> {
        let mut first_error: Option<HearthError> = None;
        let mut note = |result: Result<()>, kind: StoreKind, key: &str| {
            if let Err(e) = result {
                tracing::warn!("[Session] Could not remove {} key '{}': {}", kind, key, e);
                first_error.get_or_insert(e);
            }
        };

        for key in [durable::USER, durable::SCROLL_POSITION] {
            note(self.stores.durable().remove(key), StoreKind::Durable, key);
        }
        for key in cookie::SESSION_MARKERS {
            note(self.stores.cookie().remove(key), StoreKind::Cookie, key);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn discard_leftovers(&self) {
        if let Err(e) = self.clear_persisted() {
            tracing::warn!("[Session] Cleanup during restore incomplete: {}", e);
        }
    }
}
