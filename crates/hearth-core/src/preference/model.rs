//! Preference domain models.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Free-form preference map kept for extensibility.
pub type PreferenceMap = serde_json::Map<String, serde_json::Value>;

/// Colour scheme.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Supported interface languages, persisted by their ISO 639-1 code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    Pt,
    Zh,
    Ja,
    Hi,
}

impl Language {
    /// Parses a code, falling back to `fallback` for anything unsupported.
    ///
    /// Region subtags are ignored, so `pt-BR` resolves to [`Language::Pt`].
    pub fn from_code_or(code: &str, fallback: Language) -> Language {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default();
        primary.parse().unwrap_or(fallback)
    }

    /// Human-readable name in the language itself.
    pub fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Español",
            Self::Fr => "Français",
            Self::De => "Deutsch",
            Self::Pt => "Português",
            Self::Zh => "中文",
            Self::Ja => "日本語",
            Self::Hi => "हिन्दी",
        }
    }

    pub fn supported() -> Vec<Language> {
        Self::iter().collect()
    }
}

/// Settings tied to the current device rather than the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default)]
    pub compact_layout: bool,
    /// Unknown keys survive a load/save cycle.
    #[serde(flatten)]
    pub extra: PreferenceMap,
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            font_scale: default_font_scale(),
            reduced_motion: false,
            compact_layout: false,
            extra: PreferenceMap::new(),
        }
    }
}

/// The theme/language pair saved and loaded together by the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppSettings {
    pub theme: Theme,
    pub language: Language,
}
