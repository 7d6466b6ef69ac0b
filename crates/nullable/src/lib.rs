//! Null-aware text and timestamp wrappers
//!
//! [`NullString`] and [`NullTime`] represent "value absent" the same way at two
//! boundaries: database parameter/result binding ([`Scan`], [`ToDbValue`] and,
//! with the `sqlite` feature, sqlx's SQLite traits) and JSON (serde).
//!
//! Both use an explicit validity flag. Construction, scans and JSON decoding
//! infer it (empty text and the zero timestamp mean null); binding and
//! encoding honor it.
//!
//! ```
//! use nullable::{NullString, NullTime};
//!
//! assert_eq!(NullString::new("asd").to_json(), r#""asd""#);
//! assert_eq!(NullString::new("").to_json(), "null");
//! assert!(!NullTime::null().is_valid());
//! ```

pub mod error;
mod json;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod string;
pub mod time;
pub mod value;

pub use error::NullError;
pub use string::NullString;
pub use time::{zero_time, NullTime};
pub use value::{DbValue, Scan, ToDbValue};
