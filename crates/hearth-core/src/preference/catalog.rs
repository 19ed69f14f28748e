//! Compute model catalog.
//!
//! The built-in catalog is fixed at compile time. User-registered models are
//! kept separately and concatenated after it at query time.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Selection used when nothing is stored or the selected custom model is removed.
pub const DEFAULT_MODEL_ID: &str = "gpt-3.5-turbo";

/// Provider label given to user-registered models that do not name one.
pub const CUSTOM_PROVIDER: &str = "Custom";

/// A selectable compute model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub free: bool,
    #[serde(default)]
    pub description: String,
}

/// Caller input for registering a custom model.
///
/// Unset optional fields are filled in by [`NewModel::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub free: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Provider defaults to "Custom", free defaults to true.
    pub fn normalize(self) -> ModelDescriptor {
        let provider = self
            .provider
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| CUSTOM_PROVIDER.to_string());
        let name = if self.name.trim().is_empty() {
            self.id.clone()
        } else {
            self.name
        };
        ModelDescriptor {
            id: self.id,
            name,
            provider,
            free: self.free.unwrap_or(true),
            description: self.description.unwrap_or_default(),
        }
    }
}

/// Outcome of resolving a model id against both catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLookup {
    Builtin(ModelDescriptor),
    Custom(ModelDescriptor),
    /// The id is not in either catalog; display code decides what to show.
    Unknown(String),
}

impl ModelLookup {
    pub fn descriptor(&self) -> Option<&ModelDescriptor> {
        match self {
            Self::Builtin(d) | Self::Custom(d) => Some(d),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

fn builtin(id: &str, name: &str, provider: &str, free: bool, description: &str) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        provider: provider.to_string(),
        free,
        description: description.to_string(),
    }
}

static BUILTIN_MODELS: Lazy<Vec<ModelDescriptor>> = Lazy::new(|| {
    vec![
        builtin(
            DEFAULT_MODEL_ID,
            "GPT-3.5 Turbo",
            "OpenAI",
            true,
            "Fast general-purpose chat model",
        ),
        builtin("gpt-4", "GPT-4", "OpenAI", false, "High-accuracy reasoning model"),
        builtin("gpt-4o", "GPT-4o", "OpenAI", false, "Multimodal flagship model"),
        builtin(
            "claude-3-haiku",
            "Claude 3 Haiku",
            "Anthropic",
            true,
            "Lightweight, low-latency model",
        ),
        builtin(
            "claude-3-opus",
            "Claude 3 Opus",
            "Anthropic",
            false,
            "Long-context analysis model",
        ),
        builtin(
            "gemini-pro",
            "Gemini Pro",
            "Google",
            true,
            "General-purpose multimodal model",
        ),
        builtin(
            "mistral-7b-instruct",
            "Mistral 7B Instruct",
            "Mistral",
            true,
            "Open-weight instruction model",
        ),
    ]
});

/// The built-in catalog, in display order.
pub fn builtin_models() -> &'static [ModelDescriptor] {
    &BUILTIN_MODELS
}

pub fn is_builtin_model(id: &str) -> bool {
    BUILTIN_MODELS.iter().any(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_builtin() {
        assert!(is_builtin_model(DEFAULT_MODEL_ID));
        assert_eq!(builtin_models()[0].id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let model = NewModel::new("foo/bar", "Foo").normalize();
        assert_eq!(model.provider, "Custom");
        assert!(model.free);
        assert_eq!(model.description, "");
    }

    #[test]
    fn test_normalize_keeps_explicit_values() {
        let model = NewModel {
            id: "acme/large".to_string(),
            name: String::new(),
            provider: Some("Acme".to_string()),
            free: Some(false),
            description: Some("paid".to_string()),
        }
        .normalize();
        assert_eq!(model.name, "acme/large");
        assert_eq!(model.provider, "Acme");
        assert!(!model.free);
    }
}
