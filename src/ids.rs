//! Numeric id coercion.
//!
//! The backend sends ids as JSON numbers on some endpoints and as numeric
//! strings on others. Every comparison in this crate happens on the coerced
//! `i64`, never on the raw JSON.

use serde::de::{Deserialize, Deserializer, Error as _};
use serde_json::Value;

pub type Id = i64;

/// Coerce a JSON value into an id.
///
/// Accepts integers, floats with no fractional part and strings whose trimmed
/// content parses as a base-10 integer. Everything else is `None`.
pub fn coerce_id(value: &Value) -> Option<Id> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// First field among `keys` that holds a coercible id.
///
/// A present-but-null field falls through to the next key, matching `a ?? b`.
pub(crate) fn first_id(raw: &Value, keys: &[&str]) -> Option<Id> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
        .and_then(coerce_id)
}

/// `#[serde(deserialize_with = "...")]` adapter for required ids.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<Id, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_id(&value).ok_or_else(|| D::Error::custom(format!("invalid id: {}", value)))
}

/// `#[serde(deserialize_with = "...")]` adapter for optional ids.
pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<Id>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_id))
}
