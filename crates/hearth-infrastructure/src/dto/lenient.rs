//! Permissive field decoders for imported snapshots.
//!
//! Snapshots are edited by hand during recovery, so each field accepts any
//! JSON shape and coerces it; anything unusable becomes the field's default
//! instead of failing the whole import.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use hearth_core::preference::{ModelDescriptor, NewModel, PreferenceMap};

/// Numbers, numeric strings and booleans become a `u32`; the rest become 0.
pub fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_u32(&value))
}

pub(crate) fn coerce_u32(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u.min(u64::from(u32::MAX)) as u32
            } else if let Some(f) = n.as_f64() {
                f.clamp(0.0, f64::from(u32::MAX)) as u32
            } else {
                0
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.clamp(0.0, f64::from(u32::MAX)) as u32)
            .unwrap_or(0),
        Value::Bool(b) => u32::from(*b),
        _ => 0,
    }
}

/// Strings pass through, scalars are stringified, everything else is empty.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// An object is kept; any other shape yields an empty map.
pub fn object_or_empty<'de, D>(deserializer: D) -> Result<PreferenceMap, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map,
        _ => PreferenceMap::new(),
    })
}

/// Decodes `T` when the shape fits, otherwise `None`.
///
/// A JSON string holding encoded JSON is unwrapped first, which is how
/// structured values look when copied straight out of a key-value store.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_embedded(value))
}

pub(crate) fn decode_embedded<T: DeserializeOwned>(value: Value) -> Option<T> {
    let value = match value {
        Value::Null => return None,
        Value::String(s) => serde_json::from_str(&s).ok()?,
        other => other,
    };
    serde_json::from_value(value).ok()
}

/// Accepts an array of loosely-shaped model entries, dropping unusable ones.
pub fn models<'de, D>(deserializer: D) -> Result<Vec<ModelDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match decode_embedded::<Vec<Value>>(value) {
        Some(items) => items,
        None => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<NewModel>(item).ok())
        .filter(|model| !model.id.trim().is_empty())
        .map(NewModel::normalize)
        .collect())
}

/// RFC 3339 strings or epoch milliseconds; anything else is `None`.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_u32() {
        assert_eq!(coerce_u32(&json!(450)), 450);
        assert_eq!(coerce_u32(&json!("450")), 450);
        assert_eq!(coerce_u32(&json!(" 12.7 ")), 12);
        assert_eq!(coerce_u32(&json!(-5)), 0);
        assert_eq!(coerce_u32(&json!("abc")), 0);
        assert_eq!(coerce_u32(&json!(null)), 0);
    }

    #[test]
    fn test_decode_embedded_json_string() {
        let value = json!("{\"a\":1}");
        let map: Option<PreferenceMap> = decode_embedded(value);
        assert_eq!(map.unwrap().get("a"), Some(&json!(1)));

        let bad: Option<PreferenceMap> = decode_embedded(json!("not json"));
        assert!(bad.is_none());
    }
}
