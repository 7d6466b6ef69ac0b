//! Nullable text
//!
//! [`NullString`] pairs a string with an explicit validity flag. Producing
//! operations (construction, scans, JSON decoding) infer the flag from the
//! text: an empty string is treated as "no value". Consuming operations
//! (database binding, JSON encoding) honor the stored flag, so a present empty
//! string built with [`NullString::present`] survives as `""`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NullError;
use crate::json;
use crate::value::{DbValue, Scan, ToDbValue};

/// A string that may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NullString {
    value: String,
    valid: bool,
}

impl NullString {
    /// Wrap `value`; it is valid only when non-empty.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let valid = !value.is_empty();
        Self { value, valid }
    }

    /// The null value: empty text, not valid.
    pub fn null() -> Self {
        Self::default()
    }

    /// Wrap `value` as present even when it is empty.
    pub fn present(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            valid: true,
        }
    }

    /// Decode JSON bytes.
    ///
    /// `None` stands for absent input and yields the null value. Otherwise the
    /// bytes must hold a JSON string or `null`.
    ///
    /// # Errors
    ///
    /// Returns [`NullError::MalformedJson`] with the decoder's message when the
    /// bytes are not a JSON string or `null`, including zero-length input.
    pub fn from_json(data: Option<&[u8]>) -> Result<Self, NullError> {
        let value: Option<String> = json::decode_optional(data)?;
        Ok(Self::new(value.unwrap_or_default()))
    }

    /// Encode as a JSON string token, or `null` when not valid.
    pub fn to_json(&self) -> String {
        json::encode_optional_str(self.as_option())
    }

    /// Returns the wrapped text, which is empty for the null value.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the text if valid.
    pub fn as_option(&self) -> Option<&str> {
        self.valid.then_some(self.value.as_str())
    }

    pub fn into_option(self) -> Option<String> {
        self.valid.then_some(self.value)
    }

    /// Returns the wrapped text regardless of validity.
    pub fn into_inner(self) -> String {
        self.value
    }
}

impl Scan for NullString {
    fn scan(value: DbValue) -> Result<Self, NullError> {
        match value {
            DbValue::Null => Ok(Self::null()),
            DbValue::Text(text) => Ok(Self::new(text)),
            DbValue::Bytes(bytes) => String::from_utf8(bytes)
                .map(Self::new)
                .map_err(|_| NullError::type_mismatch("NullString", "non-UTF-8 bytes")),
            other => Err(NullError::type_mismatch("NullString", other.type_name())),
        }
    }
}

impl ToDbValue for NullString {
    fn to_db_value(&self) -> DbValue {
        self.as_option().map(DbValue::from).unwrap_or(DbValue::Null)
    }
}

impl fmt::Display for NullString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for NullString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NullString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Option<String>> for NullString {
    fn from(value: Option<String>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }
}

impl From<NullString> for Option<String> {
    fn from(value: NullString) -> Self {
        value.into_option()
    }
}

impl Serialize for NullString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_option() {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_none(),
        }
    }
}

/// Accepts `null` or a string. A missing struct field needs `#[serde(default)]`.
impl<'de> Deserialize<'de> for NullString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.into())
    }
}
