//! Nullable timestamps
//!
//! [`NullTime`] pairs a timestamp with an explicit validity flag, keyed on the
//! zero sentinel `0001-01-01T00:00:00Z` the way [`NullString`] is keyed on the
//! empty string. The timestamp itself can only change through the arithmetic
//! passthroughs below, which re-wrap the result via [`NullTime::new`] so the
//! flag is recomputed on every change.
//!
//! Unlike [`NullString`], scanning a value of the wrong type is not an error:
//! it degrades to null.
//!
//! [`NullString`]: crate::NullString

use std::ops::{Add, Deref, Sub};

use chrono::{
    DateTime, Days, DurationRound, FixedOffset, Months, NaiveDate, RoundingError,
    SecondsFormat, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NullError;
use crate::json;
use crate::value::{DbValue, Scan, ToDbValue};

/// The zero sentinel, `0001-01-01T00:00:00Z`.
pub fn zero_time() -> DateTime<FixedOffset> {
    let naive = NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("0001-01-01T00:00:00 is a valid date-time");
    Utc.from_utc_datetime(&naive).fixed_offset()
}

/// A timestamp that may be null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NullTime {
    time: DateTime<FixedOffset>,
    valid: bool,
}

impl NullTime {
    /// Wrap `time`; it is valid unless it is the zero sentinel.
    ///
    /// The comparison is by instant, so the zero instant at any offset counts.
    pub fn new<Tz: TimeZone>(time: DateTime<Tz>) -> Self {
        let time = time.fixed_offset();
        let valid = time != zero_time();
        Self { time, valid }
    }

    /// The null value: the zero sentinel, not valid.
    pub fn null() -> Self {
        Self {
            time: zero_time(),
            valid: false,
        }
    }

    /// Wrap `time` as present even when it is the zero sentinel.
    pub fn present<Tz: TimeZone>(time: DateTime<Tz>) -> Self {
        Self {
            time: time.fixed_offset(),
            valid: true,
        }
    }

    /// Decode JSON bytes.
    ///
    /// `None` stands for absent input and yields the null value. Otherwise the
    /// bytes must hold `null` or an RFC 3339 timestamp string.
    ///
    /// # Errors
    ///
    /// Returns [`NullError::MalformedJson`] with the decoder's message for any
    /// other input, including zero-length input and the empty string `""`.
    pub fn from_json(data: Option<&[u8]>) -> Result<Self, NullError> {
        let time: Option<DateTime<FixedOffset>> = json::decode_optional(data)?;
        Ok(time.map(Self::new).unwrap_or_default())
    }

    /// Encode as an RFC 3339 string token, or `null` when not valid.
    pub fn to_json(&self) -> String {
        json::encode_optional_str(self.to_rfc3339_opt().as_deref())
    }

    /// Returns the wrapped timestamp, which is the zero sentinel for null.
    pub fn datetime(&self) -> DateTime<FixedOffset> {
        self.time
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn as_option(&self) -> Option<DateTime<FixedOffset>> {
        self.valid.then_some(self.time)
    }

    /// Returns the timestamp if valid, otherwise the zero sentinel.
    pub fn time_or_zero(&self) -> DateTime<FixedOffset> {
        self.as_option().unwrap_or_else(zero_time)
    }

    fn to_rfc3339_opt(self) -> Option<String> {
        self.as_option()
            .map(|time| time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    // Arithmetic passthroughs. Each re-wraps via `new`.

    pub fn checked_add_signed(self, rhs: TimeDelta) -> Option<Self> {
        self.time.checked_add_signed(rhs).map(Self::new)
    }

    pub fn checked_sub_signed(self, rhs: TimeDelta) -> Option<Self> {
        self.time.checked_sub_signed(rhs).map(Self::new)
    }

    pub fn checked_add_months(self, months: Months) -> Option<Self> {
        self.time.checked_add_months(months).map(Self::new)
    }

    pub fn checked_sub_months(self, months: Months) -> Option<Self> {
        self.time.checked_sub_months(months).map(Self::new)
    }

    pub fn checked_add_days(self, days: Days) -> Option<Self> {
        self.time.checked_add_days(days).map(Self::new)
    }

    pub fn checked_sub_days(self, days: Days) -> Option<Self> {
        self.time.checked_sub_days(days).map(Self::new)
    }

    /// Express the same instant at another offset.
    pub fn with_timezone<Tz: TimeZone>(&self, tz: &Tz) -> Self {
        Self::new(self.time.with_timezone(tz))
    }

    pub fn to_utc(&self) -> Self {
        self.with_timezone(&Utc)
    }

    /// Round to the nearest multiple of `granularity`.
    ///
    /// # Errors
    ///
    /// Propagates chrono's [`RoundingError`], which the zero sentinel always
    /// triggers since it lies outside the nanosecond timestamp range.
    pub fn duration_round(self, granularity: TimeDelta) -> Result<Self, RoundingError> {
        self.time.duration_round(granularity).map(Self::new)
    }

    /// Truncate to a multiple of `granularity`.
    ///
    /// # Errors
    ///
    /// Same as [`NullTime::duration_round`].
    pub fn duration_trunc(self, granularity: TimeDelta) -> Result<Self, RoundingError> {
        self.time.duration_trunc(granularity).map(Self::new)
    }
}

impl Default for NullTime {
    fn default() -> Self {
        Self::null()
    }
}

impl Deref for NullTime {
    type Target = DateTime<FixedOffset>;

    fn deref(&self) -> &Self::Target {
        &self.time
    }
}

/// Panics on overflow, like chrono's own operator.
impl Add<TimeDelta> for NullTime {
    type Output = NullTime;

    fn add(self, rhs: TimeDelta) -> Self::Output {
        Self::new(self.time + rhs)
    }
}

impl Sub<TimeDelta> for NullTime {
    type Output = NullTime;

    fn sub(self, rhs: TimeDelta) -> Self::Output {
        Self::new(self.time - rhs)
    }
}

impl Scan for NullTime {
    fn scan(value: DbValue) -> Result<Self, NullError> {
        match value {
            DbValue::Timestamp(time) => Ok(Self::new(time)),
            DbValue::Null => Ok(Self::null()),
            other => {
                tracing::debug!(
                    found = other.type_name(),
                    "Non-timestamp value scanned into NullTime, treating as null"
                );
                Ok(Self::null())
            }
        }
    }
}

impl ToDbValue for NullTime {
    fn to_db_value(&self) -> DbValue {
        self.as_option().map(DbValue::from).unwrap_or(DbValue::Null)
    }
}

impl From<DateTime<FixedOffset>> for NullTime {
    fn from(time: DateTime<FixedOffset>) -> Self {
        Self::new(time)
    }
}

impl From<DateTime<Utc>> for NullTime {
    fn from(time: DateTime<Utc>) -> Self {
        Self::new(time)
    }
}

impl From<Option<DateTime<FixedOffset>>> for NullTime {
    fn from(time: Option<DateTime<FixedOffset>>) -> Self {
        time.map(Self::new).unwrap_or_default()
    }
}

impl From<NullTime> for Option<DateTime<FixedOffset>> {
    fn from(time: NullTime) -> Self {
        time.as_option()
    }
}

impl Serialize for NullTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_rfc3339_opt() {
            Some(s) => serializer.serialize_str(&s),
            None => serializer.serialize_none(),
        }
    }
}

/// Accepts `null` or an RFC 3339 string. A missing struct field needs
/// `#[serde(default)]`.
impl<'de> Deserialize<'de> for NullTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let time = Option::<DateTime<FixedOffset>>::deserialize(deserializer)?;
        Ok(time.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).expect("valid RFC 3339 timestamp")
    }

    #[test]
    fn zero_sentinel_formats_like_year_one() {
        assert_eq!(
            zero_time().to_rfc3339_opts(SecondsFormat::Secs, true),
            "0001-01-01T00:00:00Z"
        );
    }

    #[test]
    fn new_infers_validity_from_zero() {
        assert!(!NullTime::new(zero_time()).is_valid());
        assert!(NullTime::new(at("2019-01-01T12:00:00Z")).is_valid());
        assert!(NullTime::new(Utc::now()).is_valid());
        // Same instant as the sentinel, different offset.
        assert!(!NullTime::new(at("0001-01-01T02:00:00+02:00")).is_valid());
        assert_eq!(NullTime::new(zero_time()), NullTime::null());
    }

    #[test]
    fn arithmetic_recomputes_validity() {
        let x = NullTime::new(zero_time()) + TimeDelta::seconds(1);
        assert!(x.is_valid());
        assert_eq!(x.datetime(), at("0001-01-01T00:00:01Z"));

        let y = x - TimeDelta::seconds(1);
        assert!(!y.is_valid());

        let z = NullTime::null()
            .checked_add_signed(TimeDelta::seconds(1))
            .and_then(|t| t.checked_sub_signed(TimeDelta::seconds(1)))
            .expect("in range");
        assert_eq!(z, NullTime::null());
    }

    #[test]
    fn calendar_arithmetic() {
        let t = NullTime::new(at("2019-01-31T12:00:00Z"));
        let next = t.checked_add_months(Months::new(1)).expect("in range");
        assert_eq!(next.datetime(), at("2019-02-28T12:00:00Z"));

        let back = t.checked_sub_days(Days::new(30)).expect("in range");
        assert_eq!(back.datetime(), at("2019-01-01T12:00:00Z"));

        let later = t.checked_add_days(Days::new(1)).expect("in range");
        assert_eq!(later.datetime(), at("2019-02-01T12:00:00Z"));

        let one_month = NullTime::new(at("0001-02-01T00:00:00Z"));
        let to_zero = one_month.checked_sub_months(Months::new(1)).expect("in range");
        assert!(!to_zero.is_valid());
    }

    #[test]
    fn timezone_conversion_keeps_instant() {
        let t = NullTime::new(at("2019-01-01T12:00:00Z"));
        let offset = FixedOffset::east_opt(2 * 3600).expect("valid offset");

        let shifted = t.with_timezone(&offset);
        assert_eq!(shifted, t);
        assert_eq!(shifted.offset(), &offset);
        assert_eq!(shifted.to_json(), r#""2019-01-01T14:00:00+02:00""#);
        assert_eq!(shifted.to_utc().to_json(), r#""2019-01-01T12:00:00Z""#);
    }

    #[test]
    fn rounding_and_truncation() {
        let t = NullTime::new(at("2019-01-01T12:00:40Z"));
        let rounded = t.duration_round(TimeDelta::minutes(1)).expect("rounds");
        assert_eq!(rounded.datetime(), at("2019-01-01T12:01:00Z"));

        let truncated = t.duration_trunc(TimeDelta::minutes(1)).expect("truncates");
        assert_eq!(truncated.datetime(), at("2019-01-01T12:00:00Z"));

        assert!(NullTime::null().duration_round(TimeDelta::minutes(1)).is_err());
    }

    #[test]
    fn scan_timestamps_and_degrade_everything_else() {
        let filled = at("2019-01-01T12:00:00Z");
        assert_eq!(
            NullTime::scan(DbValue::from(filled)).expect("scan never fails"),
            NullTime::new(filled)
        );

        for value in [
            DbValue::Null,
            DbValue::from(zero_time()),
            DbValue::from("2019-01-01T12:00:00Z"),
            DbValue::from(7_i64),
        ] {
            let scanned = NullTime::scan(value).expect("scan never fails");
            assert_eq!(scanned, NullTime::null());
            assert_eq!(scanned.datetime(), zero_time());
        }
    }

    #[test]
    fn db_value_follows_flag() {
        let cases = [
            (NullTime::new(zero_time()), DbValue::Null),
            (
                NullTime::new(zero_time() + TimeDelta::seconds(1)),
                DbValue::Timestamp(at("0001-01-01T00:00:01Z")),
            ),
            (
                NullTime::new(at("0001-01-01T00:00:01Z") - TimeDelta::seconds(1)),
                DbValue::Null,
            ),
            (
                NullTime::new(at("2019-01-01T12:00:00Z")),
                DbValue::Timestamp(at("2019-01-01T12:00:00Z")),
            ),
            (
                NullTime::present(zero_time()),
                DbValue::Timestamp(zero_time()),
            ),
        ];
        for (time, expected) in cases {
            assert_eq!(time.to_db_value(), expected);
            assert_eq!(time.to_db_value(), time.to_db_value());
        }
    }

    #[test]
    fn time_or_zero() {
        let t = at("2019-01-01T12:00:00Z");
        assert_eq!(NullTime::new(t).time_or_zero(), t);
        assert_eq!(NullTime::null().time_or_zero(), zero_time());
    }

    #[test]
    fn to_json() {
        assert_eq!(NullTime::null().to_json(), "null");
        assert_eq!(
            NullTime::new(at("2019-01-01T12:00:00Z")).to_json(),
            r#""2019-01-01T12:00:00Z""#
        );
        assert_eq!(
            NullTime::new(at("2019-01-01T12:00:00.5Z")).to_json(),
            r#""2019-01-01T12:00:00.500Z""#
        );

        let after_add = NullTime::null() + TimeDelta::seconds(1);
        assert_eq!(after_add.to_json(), r#""0001-01-01T00:00:01Z""#);
    }

    #[test]
    fn from_json_cases() {
        let cases = [
            (
                Some(r#""2019-01-01T12:00:00Z""#),
                NullTime::new(at("2019-01-01T12:00:00Z")),
            ),
            (Some("null"), NullTime::null()),
            (Some(r#""0001-01-01T00:00:00Z""#), NullTime::null()),
            (None, NullTime::null()),
        ];
        for (input, expected) in cases {
            let decoded = NullTime::from_json(input.map(str::as_bytes)).expect("decodes");
            assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        let expected = serde_json::from_slice::<String>(b"")
            .expect_err("empty input")
            .to_string();
        let err = NullTime::from_json(Some(b"")).expect_err("empty bytes must fail");
        assert_eq!(err, NullError::MalformedJson(expected));

        for input in [r#""""#, "42", r#""yesterday""#] {
            let err = NullTime::from_json(Some(input.as_bytes())).expect_err("must fail");
            assert!(matches!(err, NullError::MalformedJson(_)), "{err:?}");
        }
    }

    #[test]
    fn serde_matches_helpers() {
        let t = NullTime::new(at("2019-01-01T12:00:00Z"));
        assert_eq!(serde_json::to_string(&t).expect("serializes"), t.to_json());

        let decoded: NullTime =
            serde_json::from_str(r#""2019-01-01T12:00:00Z""#).expect("deserializes");
        assert_eq!(decoded, t);
    }
}
