//! Preference domain module.
//!
//! # Module Structure
//!
//! - `model`: theme, language, device settings, app settings pair
//! - `catalog`: built-in model catalog, custom model descriptors, lookup

mod catalog;
mod model;

pub use catalog::{
    DEFAULT_MODEL_ID, ModelDescriptor, ModelLookup, NewModel, builtin_models, is_builtin_model,
};
pub use model::{AppSettings, DeviceSettings, Language, PreferenceMap, Theme};
