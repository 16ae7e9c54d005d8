//! Pluggable conversion between typed values and wire strings.
//!
//! # Design
//! `Serialization` is object-safe: it works on `serde_json::Value` as the
//! "any value" so a strategy can be injected as `Arc<dyn Serialization>`.
//! The typed [`encode`] / [`decode`] helpers bridge to concrete serde types.
//!
//! `JsonSerialization` reproduces the wire policy exactly: a string value is
//! written as-is (no quoting), anything else as compact JSON. Decoding sniffs
//! delimiters and only parses input wrapped in `{}` or `[]`; everything else
//! is handed back as a bare string.
//!
//! # Known limitation
//! The sniffing cannot tell a JSON-encoded string literal (`"\"hi\""`) from
//! a bare string, so a quoted body decoded as a `String` keeps its quotes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// A stateless strategy converting values to and from their wire strings.
pub trait Serialization: Send + Sync {
    fn serialize(&self, value: &Value) -> String;

    /// Absent input must come back as `Value::Null` without failing.
    fn deserialize(&self, raw: Option<&str>) -> Result<Value, ApiError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerialization;

impl Serialization for JsonSerialization {
    fn serialize(&self, value: &Value) -> String {
        match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    fn deserialize(&self, raw: Option<&str>) -> Result<Value, ApiError> {
        let Some(raw) = raw else {
            return Ok(Value::Null);
        };
        if looks_structural(raw) {
            serde_json::from_str(raw).map_err(ApiError::Deserialization)
        } else {
            Ok(Value::String(raw.to_string()))
        }
    }
}

fn looks_structural(raw: &str) -> bool {
    (raw.starts_with('{') && raw.ends_with('}')) || (raw.starts_with('[') && raw.ends_with(']'))
}

/// Encode a typed value for the wire.
///
/// Values that encode to `null` (`()`, `None`) are absent and yield `None`,
/// so a missing body or optional query field is omitted rather than sent
/// as a `"null"` string.
pub fn encode<T>(serialization: &dyn Serialization, value: &T) -> Result<Option<String>, ApiError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(ApiError::Serialization)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serialization.serialize(&value)))
}

/// Decode a wire value into `T`, which acts as the expected shape.
///
/// Scalars travel as bare strings (`2`, `true`), so when the strategy's
/// value does not fit `T` the raw token is parsed once more as JSON.
pub fn decode<T>(serialization: &dyn Serialization, raw: Option<&str>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let value = serialization.deserialize(raw)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Ok(decoded),
        Err(err) => match raw {
            Some(raw) => serde_json::from_str(raw).map_err(|_| ApiError::Deserialization(err)),
            None => Err(ApiError::Deserialization(err)),
        },
    }
}
