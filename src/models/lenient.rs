//! Forgiving deserializers for caller-supplied request fields
//!
//! Browsers send `null` for cleared number inputs and some forms post
//! numbers as strings. Neither should turn into a rejected request.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number, numeric string, `null` or anything else; unusable values become 0
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value).unwrap_or_default())
}

/// `null` becomes the type's default
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
