//! Preference store.
//!
//! Every getter injects its configured default when nothing is stored or the
//! stored value does not decode. Every setter writes through immediately.
//! Theme and language are mirrored into the cookie store so a server could
//! read them, but reads always come from the durable store.

use std::sync::Arc;

use hearth_core::config::PreferenceDefaults;
use hearth_core::error::{HearthError, Result};
use hearth_core::keys::{cookie, durable};
use hearth_core::preference::{
    AppSettings, DeviceSettings, Language, ModelDescriptor, ModelLookup, NewModel, PreferenceMap,
    Theme, builtin_models, is_builtin_model,
};
use serde::de::DeserializeOwned;

use crate::dual_store::DualStore;

pub struct PreferenceStore {
    stores: Arc<DualStore>,
    defaults: PreferenceDefaults,
}

impl PreferenceStore {
    pub fn new(stores: Arc<DualStore>, defaults: PreferenceDefaults) -> Self {
        Self { stores, defaults }
    }

    pub fn defaults(&self) -> &PreferenceDefaults {
        &self.defaults
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.stores.durable().read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[Preferences] Could not read '{}': {}", key, e);
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.stores.durable().read_json(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[Preferences] Could not read '{}': {}", key, e);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Theme and language
    // ------------------------------------------------------------------

    pub fn theme(&self) -> Theme {
        let Some(raw) = self.read_raw(durable::THEME_MODE) else {
            return self.defaults.theme;
        };
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!("[Preferences] Unknown theme '{}', using default", raw);
            self.defaults.theme
        })
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.stores
            .durable()
            .write(durable::THEME_MODE, theme.as_ref(), None)?;
        self.stores
            .cookie()
            .write(cookie::THEME, theme.as_ref(), Some(self.defaults.cookie_ttl_days))?;
        tracing::debug!("[Preferences] Theme set to {}", theme);
        Ok(())
    }

    /// Flips between dark and light, returning the new theme.
    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn language(&self) -> Language {
        match self.read_raw(durable::LANGUAGE) {
            Some(code) => Language::from_code_or(&code, self.defaults.language),
            None => self.defaults.language,
        }
    }

    pub fn set_language(&self, language: Language) -> Result<()> {
        self.stores
            .durable()
            .write(durable::LANGUAGE, language.as_ref(), None)?;
        self.stores.cookie().write(
            cookie::LANGUAGE,
            language.as_ref(),
            Some(self.defaults.cookie_ttl_days),
        )?;
        tracing::debug!("[Preferences] Language set to {}", language);
        Ok(())
    }

    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            theme: self.theme(),
            language: self.language(),
        }
    }

    pub fn set_app_settings(&self, settings: AppSettings) -> Result<()> {
        self.set_theme(settings.theme)?;
        self.set_language(settings.language)
    }

    // ------------------------------------------------------------------
    // Device settings and the free-form map
    // ------------------------------------------------------------------

    pub fn device_settings(&self) -> DeviceSettings {
        self.read_json(durable::DEVICE_SETTINGS).unwrap_or_default()
    }

    pub fn set_device_settings(&self, settings: &DeviceSettings) -> Result<()> {
        self.stores
            .durable()
            .write_json(durable::DEVICE_SETTINGS, settings, None)
    }

    pub fn user_preferences(&self) -> PreferenceMap {
        self.read_json(durable::PREFERENCES).unwrap_or_default()
    }

    /// Replaces the whole preference map.
    pub fn set_user_preferences(&self, preferences: &PreferenceMap) -> Result<()> {
        self.stores
            .durable()
            .write_json(durable::PREFERENCES, preferences, None)
    }

    /// Shallow-merges `partial` into the stored map and returns the result.
    ///
    /// Top-level keys in `partial` overwrite; nested objects are replaced,
    /// not merged.
    pub fn merge_user_preferences(&self, partial: PreferenceMap) -> Result<PreferenceMap> {
        let mut merged = self.user_preferences();
        merged.extend(partial);
        self.set_user_preferences(&merged)?;
        Ok(merged)
    }

    // ------------------------------------------------------------------
    // Model selection and catalog
    // ------------------------------------------------------------------

    /// The selected model id. Not checked against either catalog.
    pub fn selected_model(&self) -> String {
        self.read_raw(durable::SELECTED_MODEL)
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.defaults.model_id.clone())
    }

    pub fn update_selected_model(&self, id: &str) -> Result<()> {
        self.stores.durable().write(durable::SELECTED_MODEL, id, None)?;
        tracing::debug!("[Preferences] Selected model '{}'", id);
        Ok(())
    }

    /// User-registered models in insertion order.
    pub fn custom_models(&self) -> Vec<ModelDescriptor> {
        self.read_json(durable::CUSTOM_MODELS).unwrap_or_default()
    }

    /// Replaces the custom sequence wholesale.
    pub fn set_custom_models(&self, models: &[ModelDescriptor]) -> Result<()> {
        self.stores
            .durable()
            .write_json(durable::CUSTOM_MODELS, &models, None)
    }

    /// Built-in catalog followed by the custom sequence.
    pub fn available_models(&self) -> Vec<ModelDescriptor> {
        let mut models = builtin_models().to_vec();
        models.extend(self.custom_models());
        models
    }

    /// Registers a custom model.
    ///
    /// Blank ids and ids taken by the built-in catalog are rejected. An id
    /// already in the custom sequence is replaced in place.
    pub fn add_custom_model(&self, model: NewModel) -> Result<ModelDescriptor> {
        let id = model.id.trim();
        if id.is_empty() {
            return Err(HearthError::validation("model id must not be blank"));
        }
        if is_builtin_model(id) {
            return Err(HearthError::validation(format!(
                "'{}' is a built-in model id",
                id
            )));
        }

        let descriptor = NewModel {
            id: id.to_string(),
            ..model
        }
        .normalize();

        let mut models = self.custom_models();
        match models.iter_mut().find(|m| m.id == descriptor.id) {
            Some(existing) => {
                tracing::debug!("[Preferences] Replacing custom model '{}'", descriptor.id);
                *existing = descriptor.clone();
            }
            None => models.push(descriptor.clone()),
        }
        self.set_custom_models(&models)?;

        tracing::info!("[Preferences] Registered custom model '{}'", descriptor.id);
        Ok(descriptor)
    }

    /// Removes every custom entry with `id`.
    ///
    /// If `id` was the selected model the selection falls back to the
    /// default model. Returns whether anything was removed.
    pub fn remove_custom_model(&self, id: &str) -> Result<bool> {
        let mut models = self.custom_models();
        let before = models.len();
        models.retain(|m| m.id != id);
        let removed = models.len() != before;

        if removed {
            self.set_custom_models(&models)?;
            tracing::info!("[Preferences] Removed custom model '{}'", id);
        }

        if self.selected_model() == id {
            tracing::info!(
                "[Preferences] Selected model '{}' removed, reverting to '{}'",
                id,
                self.defaults.model_id
            );
            self.update_selected_model(&self.defaults.model_id)?;
        }

        Ok(removed)
    }

    /// Looks `id` up in the built-in catalog, then the custom sequence.
    pub fn resolve_model(&self, id: &str) -> ModelLookup {
        if let Some(model) = builtin_models().iter().find(|m| m.id == id) {
            return ModelLookup::Builtin(model.clone());
        }
        match self.custom_models().into_iter().find(|m| m.id == id) {
            Some(model) => ModelLookup::Custom(model),
            None => ModelLookup::Unknown(id.to_string()),
        }
    }

    pub fn resolve_selected_model(&self) -> ModelLookup {
        self.resolve_model(&self.selected_model())
    }
}
