//! Database binding protocol
//!
//! [`DbValue`] is the untyped value a driver hands over when reading a result
//! column, and the native value it accepts when binding a parameter. The
//! wrapper types plug into it through [`Scan`] (inbound) and [`ToDbValue`]
//! (outbound).

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::NullError;

/// An untyped value at the driver boundary
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    /// The database null sentinel
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
}

impl DbValue {
    /// Returns true for the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Diagnostic name of the value's type, used in scan errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<bool> for DbValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for DbValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for DbValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for DbValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for DbValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for DbValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<DateTime<FixedOffset>> for DbValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for DbValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v.fixed_offset())
    }
}

impl<T> From<Option<T>> for DbValue
where
    T: Into<DbValue>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Build a wrapper from a value read out of the database.
pub trait Scan: Sized {
    /// Classify `value` and produce a fresh wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`NullError::TypeMismatch`] when the implementation rejects the
    /// value's type.
    fn scan(value: DbValue) -> Result<Self, NullError>;
}

/// Produce the value bound as a query parameter.
///
/// Implementations return either [`DbValue::Null`] or a native value, never
/// a wrapper.
pub trait ToDbValue {
    fn to_db_value(&self) -> DbValue;
}
