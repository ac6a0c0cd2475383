//! Shape-based decoding helpers
//!
//! Profile documents overload several shapes per type (a bare string, an
//! array, or an object). Every model type decodes from a [`serde_json::Value`]
//! by looking at its shape first. YAML documents are converted into the same
//! value tree, so both formats share one decoder.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Human readable name of a value's shape, for error messages
pub(crate) fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a string value
pub(crate) fn string(value: &Value, what: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::parse(format!(
            "expected string for {what}, got {}",
            shape(other)
        ))),
    }
}

/// Reject any key of `object` that is not listed in `allowed`
pub(crate) fn deny_unknown_keys(object: &Map<String, Value>, allowed: &[&str], what: &str) -> Result<()> {
    let mut unknown: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    unknown.sort_unstable();
    Err(Error::parse(format!("unexpected fields in {what}: {unknown:?}")))
}

/// Implement [`serde::Deserialize`] for a type through its `from_value` decoder
macro_rules! deserialize_via_value {
    ($ty:ty) => {
        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = serde_json::Value::deserialize(deserializer)?;
                <$ty>::from_value(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use deserialize_via_value;
