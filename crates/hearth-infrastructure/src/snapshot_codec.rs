//! Versioned JSON wire form of [`StateSnapshot`].
//!
//! Encoding always writes the latest schema. Decoding accepts every known
//! version; a document without a `version` field is read as `1.0.0`.

use hearth_core::error::{HearthError, Result};
use hearth_core::snapshot::StateSnapshot;
use serde_json::Value;

use crate::dto::{SNAPSHOT_ENTITY, create_snapshot_migrator};

const VERSION_FIELD: &str = "version";
const UNVERSIONED: &str = "1.0.0";

/// Serializes a snapshot as pretty-printed, versioned JSON.
pub fn encode(snapshot: &StateSnapshot) -> Result<String> {
    let migrator = create_snapshot_migrator()?;
    let flat = migrator.save_domain_flat(SNAPSHOT_ENTITY, snapshot.clone())?;
    let value: Value = serde_json::from_str(&flat)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Parses a snapshot document, migrating older schemas forward.
pub fn decode(input: &str) -> Result<StateSnapshot> {
    let mut value: Value = serde_json::from_str(input)?;

    let Some(object) = value.as_object_mut() else {
        return Err(HearthError::Serialization {
            format: "JSON".to_string(),
            message: "snapshot must be a JSON object".to_string(),
        });
    };

    if !object.get(VERSION_FIELD).is_some_and(Value::is_string) {
        tracing::debug!("[Snapshot] No schema version, reading as {}", UNVERSIONED);
        object.insert(VERSION_FIELD.to_string(), Value::from(UNVERSIONED));
    }

    let migrator = create_snapshot_migrator()?;
    Ok(migrator.load_flat_from(SNAPSHOT_ENTITY, value)?)
}
