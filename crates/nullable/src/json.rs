//! JSON helpers shared by the wrapper types

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::NullError;

/// Decode optional JSON bytes as `null` or a single value.
///
/// `None` means the input was absent and yields `Ok(None)`. Present but empty
/// input is a decode error like any other malformed input.
pub(crate) fn decode_optional<T>(data: Option<&[u8]>) -> Result<Option<T>, NullError>
where
    T: DeserializeOwned,
{
    match data {
        None => Ok(None),
        Some(bytes) => Ok(serde_json::from_slice::<Option<T>>(bytes)?),
    }
}

/// Encode an optional string as a JSON string token or `null`.
pub(crate) fn encode_optional_str(value: Option<&str>) -> String {
    match value {
        Some(s) => Value::String(s.to_string()).to_string(),
        None => Value::Null.to_string(),
    }
}
