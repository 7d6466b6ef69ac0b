//! Error types for database scans and JSON decoding
//!
//! Both wrapper types report failures through [`NullError`]. Every failing
//! operation returns a fresh `Result`, so a failed conversion never leaves a
//! half-written wrapper behind.

use thiserror::Error;

/// Unified error type for nullable conversions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NullError {
    /// A database value of an unsupported type was scanned
    #[error("unable to scan into {target} from type {found}")]
    TypeMismatch {
        target: &'static str,
        found: &'static str,
    },

    /// JSON input could not be decoded; carries the decoder message as-is
    #[error("{0}")]
    MalformedJson(String),
}

impl NullError {
    /// Create a type mismatch error for a scan into `target`.
    pub fn type_mismatch(target: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { target, found }
    }

    /// Create a malformed JSON error from the decoder's message.
    pub fn malformed_json(msg: impl Into<String>) -> Self {
        Self::MalformedJson(msg.into())
    }
}

impl From<serde_json::Error> for NullError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedJson(err.to_string())
    }
}
