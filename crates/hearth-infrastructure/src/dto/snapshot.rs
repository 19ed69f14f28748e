//! StateSnapshot DTOs and migrations
//!
//! Wire form of `export_all` / `import_all`. Every field is decoded
//! leniently: imports only coerce types, they never validate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, MigratesTo, Versioned};

use hearth_core::error::Result;
use hearth_core::preference::{
    DEFAULT_MODEL_ID, DeviceSettings, Language, ModelDescriptor, PreferenceMap, Theme,
};
use hearth_core::session::SessionRecord;
use hearth_core::snapshot::StateSnapshot;

use super::lenient;

/// Entity name registered with the migrator.
pub const SNAPSHOT_ENTITY: &str = "state_snapshot";

/// Snapshot V1.0.0: session, app settings, preference map, scroll offset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshotV1_0_0 {
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub exported_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub user: Option<SessionRecord>,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub theme: String,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub language: String,

    #[serde(default, deserialize_with = "lenient::object_or_empty")]
    pub preferences: PreferenceMap,

    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub scroll_position: u32,
}

/// Snapshot V1.1.0: adds the model selection and device settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshotV1_1_0 {
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub exported_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub user: Option<SessionRecord>,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub theme: String,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub language: String,

    #[serde(default, deserialize_with = "lenient::object_or_empty")]
    pub preferences: PreferenceMap,

    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub scroll_position: u32,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub selected_model: String,

    #[serde(default, deserialize_with = "lenient::models")]
    pub custom_models: Vec<ModelDescriptor>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub device_settings: Option<DeviceSettings>,
}

/// Type alias for the latest StateSnapshot version.
pub type StateSnapshotDTO = StateSnapshotV1_1_0;

// ============================================================================
// Migration implementations
// ============================================================================

/// V1.0.0 → V1.1.0: no model selection or device settings yet.
impl MigratesTo<StateSnapshotV1_1_0> for StateSnapshotV1_0_0 {
    fn migrate(self) -> StateSnapshotV1_1_0 {
        StateSnapshotV1_1_0 {
            exported_at: self.exported_at,
            user: self.user,
            theme: self.theme,
            language: self.language,
            preferences: self.preferences,
            scroll_position: self.scroll_position,
            selected_model: String::new(),
            custom_models: Vec::new(),
            device_settings: None,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<StateSnapshot> for StateSnapshotV1_1_0 {
    fn into_domain(self) -> StateSnapshot {
        let selected_model = if self.selected_model.trim().is_empty() {
            DEFAULT_MODEL_ID.to_string()
        } else {
            self.selected_model
        };
        StateSnapshot {
            exported_at: self.exported_at.unwrap_or_else(Utc::now),
            session: self.user,
            theme: self.theme.parse::<Theme>().unwrap_or_default(),
            language: Language::from_code_or(&self.language, Language::default()),
            selected_model,
            custom_models: self.custom_models,
            preferences: self.preferences,
            device_settings: self.device_settings.unwrap_or_default(),
            scroll_position: self.scroll_position,
        }
    }
}

impl version_migrate::FromDomain<StateSnapshot> for StateSnapshotV1_1_0 {
    fn from_domain(snapshot: StateSnapshot) -> Self {
        StateSnapshotV1_1_0 {
            exported_at: Some(snapshot.exported_at),
            user: snapshot.session,
            theme: snapshot.theme.to_string(),
            language: snapshot.language.to_string(),
            preferences: snapshot.preferences,
            scroll_position: snapshot.scroll_position,
            selected_model: snapshot.selected_model,
            custom_models: snapshot.custom_models,
            device_settings: Some(snapshot.device_settings),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a Migrator for state snapshots.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Adds `selectedModel`, `customModels`, `deviceSettings`
/// - V1.1.0 → StateSnapshot: Converts DTO to domain model
pub fn create_snapshot_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let snapshot_path = version_migrate::Migrator::define(SNAPSHOT_ENTITY)
        .from::<StateSnapshotV1_0_0>()
        .step::<StateSnapshotV1_1_0>()
        .into_with_save::<StateSnapshot>();

    migrator.register(snapshot_path)?;

    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_v1_0_snapshot_migrates_with_defaults() {
        let migrator = create_snapshot_migrator().unwrap();
        let value = json!({
            "version": "1.0.0",
            "exportedAt": "2024-03-01T12:00:00Z",
            "user": {"id": "admin", "displayName": "Admin User", "role": "admin"},
            "theme": "light",
            "language": "fr",
            "preferences": {"notifications": true},
            "scrollPosition": "450"
        });

        let snapshot: StateSnapshot = migrator.load_flat_from(SNAPSHOT_ENTITY, value).unwrap();

        assert_eq!(snapshot.session.unwrap().id, "admin");
        assert_eq!(snapshot.theme, Theme::Light);
        assert_eq!(snapshot.language, Language::Fr);
        assert_eq!(snapshot.scroll_position, 450);
        assert_eq!(snapshot.selected_model, DEFAULT_MODEL_ID);
        assert!(snapshot.custom_models.is_empty());
        assert_eq!(snapshot.device_settings, DeviceSettings::default());
    }

    #[test]
    fn test_garbage_fields_coerce_to_defaults() {
        let migrator = create_snapshot_migrator().unwrap();
        let value = json!({
            "version": "1.1.0",
            "user": "not a record",
            "theme": 42,
            "language": "klingon",
            "preferences": [1, 2, 3],
            "scrollPosition": {"y": 3},
            "customModels": [{"id": "foo/bar", "name": "Foo"}, {"name": "no id"}, 7],
            "deviceSettings": "{\"fontScale\":1.5}"
        });

        let snapshot: StateSnapshot = migrator.load_flat_from(SNAPSHOT_ENTITY, value).unwrap();

        assert!(snapshot.session.is_none());
        assert_eq!(snapshot.theme, Theme::Dark);
        assert_eq!(snapshot.language, Language::En);
        assert!(snapshot.preferences.is_empty());
        assert_eq!(snapshot.scroll_position, 0);
        assert_eq!(snapshot.custom_models.len(), 1);
        assert_eq!(snapshot.custom_models[0].provider, "Custom");
        assert_eq!(snapshot.device_settings.font_scale, 1.5);
    }
}
