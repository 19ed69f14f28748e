//! Full persisted state snapshot used for export and import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::preference::{DeviceSettings, Language, ModelDescriptor, PreferenceMap, Theme};
use crate::session::SessionRecord;

/// Everything the layer persists, captured at one instant.
///
/// Import does not check internal consistency: a snapshot naming a selected
/// model that is absent from `custom_models` is restored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub exported_at: DateTime<Utc>,
    pub session: Option<SessionRecord>,
    pub theme: Theme,
    pub language: Language,
    pub selected_model: String,
    pub custom_models: Vec<ModelDescriptor>,
    pub preferences: PreferenceMap,
    pub device_settings: DeviceSettings,
    pub scroll_position: u32,
}
