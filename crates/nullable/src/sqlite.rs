//! SQLite binding via sqlx
//!
//! Both wrappers bind as SQL `NULL` when not valid and as the plain text or
//! timestamp otherwise. Decoding accepts any column type: SQLite is
//! dynamically typed, so the decision is made per cell from its storage class.

use chrono::{DateTime, FixedOffset};
use sqlx::decode::Decode;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Database, Type, TypeInfo, ValueRef};

use crate::string::NullString;
use crate::time::NullTime;
use crate::value::{DbValue, Scan};

/// Read a raw cell into a [`DbValue`] according to its storage class.
fn classify(value: SqliteValueRef<'_>) -> Result<DbValue, BoxDynError> {
    if value.is_null() {
        return Ok(DbValue::Null);
    }

    let storage = value.type_info().name().to_string();
    tracing::trace!(storage = %storage, "Classifying SQLite value");

    let classified = match storage.as_str() {
        "TEXT" => DbValue::Text(<String as Decode<'_, Sqlite>>::decode(value)?),
        "BLOB" => DbValue::Bytes(<Vec<u8> as Decode<'_, Sqlite>>::decode(value)?),
        "REAL" => DbValue::Float(<f64 as Decode<'_, Sqlite>>::decode(value)?),
        _ => DbValue::Integer(<i64 as Decode<'_, Sqlite>>::decode(value)?),
    };
    Ok(classified)
}

// ============================================================================
// NullString
// ============================================================================

impl Type<Sqlite> for NullString {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}

impl<'q> Encode<'q, Sqlite> for NullString {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self.as_option() {
            Some(text) => <String as Encode<'q, Sqlite>>::encode(text.to_owned(), buf),
            None => Ok(IsNull::Yes),
        }
    }
}

impl<'r> Decode<'r, Sqlite> for NullString {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        Ok(Self::scan(classify(value)?)?)
    }
}

// ============================================================================
// NullTime
// ============================================================================

impl Type<Sqlite> for NullTime {
    fn type_info() -> SqliteTypeInfo {
        <DateTime<FixedOffset> as Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}

impl<'q> Encode<'q, Sqlite> for NullTime {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self.as_option() {
            Some(time) => <DateTime<FixedOffset> as Encode<'q, Sqlite>>::encode(time, buf),
            None => Ok(IsNull::Yes),
        }
    }
}

/// Uses sqlx's chrono rules: datetime text, unix-epoch integers and julian-day
/// reals. Cells that cannot be read as a timestamp degrade to null.
impl<'r> Decode<'r, Sqlite> for NullTime {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.is_null() {
            return Ok(Self::null());
        }

        match <DateTime<FixedOffset> as Decode<'r, Sqlite>>::decode(value) {
            Ok(time) => Ok(Self::scan(DbValue::Timestamp(time))?),
            Err(err) => {
                tracing::debug!(error = %err, "SQLite value is not a timestamp, treating as null");
                Ok(Self::null())
            }
        }
    }
}
