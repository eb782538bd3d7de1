//! Timestamp codec for the three text layouts used by the API.
//!
//! Every layout maps onto the same [`TimeValue`]. The wall-clock components are
//! stored as-is in a UTC-pinned value; no offset conversion ever happens here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::DecodeError;

/// Text layouts for timestamps found in requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeLayout {
    /// `YYYY-MM-DD`, daily series index.
    Date,
    /// `YYYY-MM-DDTHH:MM`, hourly index, current weather and sun events.
    DateHourMinute,
    /// `YYYY-MM-DDTHH:MM`, request/response boundary values that must
    /// serialize back to the exact text they were parsed from.
    DateTime,
}

impl TimeLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeLayout::Date => "date",
            TimeLayout::DateHourMinute => "date-hour-minute",
            TimeLayout::DateTime => "datetime",
        }
    }

    /// Human-readable form of the expected text, e.g. `YYYY-MM-DD`.
    pub fn pattern(&self) -> &'static str {
        match self {
            TimeLayout::Date => "YYYY-MM-DD",
            TimeLayout::DateHourMinute | TimeLayout::DateTime => "YYYY-MM-DDTHH:MM",
        }
    }

    /// Exact length of the text form.
    pub fn width(&self) -> usize {
        self.pattern().len()
    }

    fn format_str(&self) -> &'static str {
        match self {
            TimeLayout::Date => "%Y-%m-%d",
            TimeLayout::DateHourMinute | TimeLayout::DateTime => "%Y-%m-%dT%H:%M",
        }
    }
}

impl std::fmt::Display for TimeLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.pattern())
    }
}

/// A point in time decoded from one of the [`TimeLayout`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeValue(DateTime<Utc>);

impl TimeValue {
    /// Parse `text` strictly against `layout`.
    ///
    /// The text must be exactly the canonical rendering of the parsed value, so
    /// trailing separators, single-digit fields or extra precision are all
    /// rejected instead of being truncated.
    pub fn parse(text: &str, layout: TimeLayout) -> Result<Self, DecodeError> {
        let malformed = || DecodeError::MalformedTimestamp {
            text: text.to_string(),
            layout,
        };

        // chrono's %Y also takes signed or five-digit years.
        if text.len() != layout.width() || !text.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(malformed());
        }

        let naive = match layout {
            TimeLayout::Date => NaiveDate::parse_from_str(text, layout.format_str())
                .map(|d| d.and_time(NaiveTime::MIN))
                .map_err(|_| malformed())?,
            TimeLayout::DateHourMinute | TimeLayout::DateTime => {
                NaiveDateTime::parse_from_str(text, layout.format_str())
                    .map_err(|_| malformed())?
            }
        };

        let value = Self::from_naive(naive);
        if value.format(layout) != text {
            return Err(malformed());
        }
        Ok(value)
    }

    /// Canonical text for this value in `layout`.
    pub fn format(&self, layout: TimeLayout) -> String {
        self.0.format(layout.format_str()).to_string()
    }

    /// Wrap wall-clock components without any offset conversion.
    pub fn from_naive(naive: NaiveDateTime) -> Self {
        TimeValue(naive.and_utc())
    }

    /// Convenience constructor; `None` for an impossible calendar value.
    pub fn from_ymd_hm(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .map(Self::from_naive)
    }

    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0.naive_utc()
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl std::fmt::Display for TimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format(TimeLayout::DateTime))
    }
}

impl From<NaiveDateTime> for TimeValue {
    fn from(naive: NaiveDateTime) -> Self {
        Self::from_naive(naive)
    }
}

impl From<NaiveDate> for TimeValue {
    fn from(date: NaiveDate) -> Self {
        Self::from_naive(date.and_time(NaiveTime::MIN))
    }
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format(TimeLayout::DateTime))
    }
}

impl<'de> Deserialize<'de> for TimeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        TimeValue::parse(&text, TimeLayout::DateTime).map_err(serde::de::Error::custom)
    }
}

/// A timestamp that may be unset.
///
/// Absent fields, JSON `null` and empty strings all decode to the unset state,
/// which is distinct from any real calendar value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NullableTime(Option<TimeValue>);

impl NullableTime {
    pub const UNSET: NullableTime = NullableTime(None);

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<TimeValue> {
        self.0
    }

    /// Decode an optional JSON field named `key`. `None` means the key was absent.
    pub fn from_json(
        key: &str,
        value: Option<&Value>,
        layout: TimeLayout,
    ) -> Result<Self, DecodeError> {
        match value {
            None | Some(Value::Null) => Ok(Self::UNSET),
            Some(Value::String(s)) if s.is_empty() => Ok(Self::UNSET),
            Some(Value::String(s)) => TimeValue::parse(s, layout).map(|t| NullableTime(Some(t))),
            Some(_) => Err(DecodeError::InvalidShape {
                key: key.to_string(),
                expected: "timestamp string or null",
            }),
        }
    }

    /// Encode for JSON: the canonical string when set, `null` otherwise.
    pub fn to_json(&self, layout: TimeLayout) -> Value {
        match self.0 {
            Some(t) => Value::String(t.format(layout)),
            None => Value::Null,
        }
    }
}

impl From<TimeValue> for NullableTime {
    fn from(value: TimeValue) -> Self {
        NullableTime(Some(value))
    }
}

impl From<Option<TimeValue>> for NullableTime {
    fn from(value: Option<TimeValue>) -> Self {
        NullableTime(value)
    }
}

impl Serialize for NullableTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(t) => t.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for NullableTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        match text.as_deref() {
            None | Some("") => Ok(Self::UNSET),
            Some(s) => TimeValue::parse(s, TimeLayout::DateTime)
                .map(|t| NullableTime(Some(t)))
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_date_hour_minute() {
        let t = TimeValue::parse("2021-08-28T09:00", TimeLayout::DateHourMinute).unwrap();
        assert_eq!(t, TimeValue::from_ymd_hm(2021, 8, 28, 9, 0).unwrap());
    }

    #[test]
    fn parses_date_as_midnight() {
        let t = TimeValue::parse("2021-09-20", TimeLayout::Date).unwrap();
        assert_eq!(t, TimeValue::from_ymd_hm(2021, 9, 20, 0, 0).unwrap());
        assert_eq!(t.format(TimeLayout::Date), "2021-09-20");
    }

    #[test]
    fn datetime_roundtrip_is_byte_identical() {
        for s in ["2024-08-30T04:14", "1999-12-31T23:59", "2000-02-29T00:00"] {
            let t = TimeValue::parse(s, TimeLayout::DateTime).unwrap();
            assert_eq!(t.format(TimeLayout::DateTime), s);
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{s}\""));
        }
    }

    #[test]
    fn rejects_inexact_text() {
        let cases = [
            ("2024-08-30T10:00,", TimeLayout::DateHourMinute),
            ("2024-08-30T10:00:00", TimeLayout::DateHourMinute),
            ("2024-8-30T10:00", TimeLayout::DateHourMinute),
            ("2024-08-30", TimeLayout::DateHourMinute),
            ("2024-08-30T10:00", TimeLayout::Date),
            ("2024-08-30-", TimeLayout::Date),
            ("2024-02-30", TimeLayout::Date),
            (" 2024-08-30", TimeLayout::Date),
            ("+10000-01-01", TimeLayout::Date),
            ("+2024-08-30", TimeLayout::Date),
            ("-0001-01-01T00:00", TimeLayout::DateTime),
        ];

        for (text, layout) in cases {
            let err = TimeValue::parse(text, layout).unwrap_err();
            match err {
                DecodeError::MalformedTimestamp { text: t, layout: l } => {
                    assert_eq!(t, text);
                    assert_eq!(l, layout);
                }
                other => panic!("unexpected error for {text:?}: {other}"),
            }
        }
    }

    #[test]
    fn error_names_text_and_layout() {
        let err = TimeValue::parse("nope", TimeLayout::Date).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn null_and_absent_are_unset() {
        let layout = TimeLayout::DateHourMinute;
        let absent = NullableTime::from_json("time", None, layout).unwrap();
        let null = NullableTime::from_json("time", Some(&Value::Null), layout).unwrap();
        let empty = NullableTime::from_json("time", Some(&json!("")), layout).unwrap();

        for t in [absent, null, empty] {
            assert!(!t.is_set());
            assert_eq!(t.to_json(TimeLayout::DateTime), Value::Null);
            assert_eq!(serde_json::to_string(&t).unwrap(), "null");
        }
    }

    #[test]
    fn unset_differs_from_zero_date() {
        let zero = TimeValue::parse("0000-01-01", TimeLayout::Date).unwrap();
        let set = NullableTime::from(zero);
        assert!(set.is_set());
        assert_ne!(set, NullableTime::UNSET);
    }

    #[test]
    fn nullable_deserializes_from_json() {
        let t: NullableTime = serde_json::from_str("\"2021-08-28T09:00\"").unwrap();
        assert_eq!(t.get(), TimeValue::from_ymd_hm(2021, 8, 28, 9, 0));

        let t: NullableTime = serde_json::from_str("null").unwrap();
        assert!(!t.is_set());

        assert!(serde_json::from_str::<NullableTime>("\"2021-08-28T09\"").is_err());
    }

    #[test]
    fn non_string_is_invalid_shape() {
        let err = NullableTime::from_json("current_weather.time", Some(&json!(12)), TimeLayout::Date)
            .unwrap_err();
        match err {
            DecodeError::InvalidShape { key, .. } => assert_eq!(key, "current_weather.time"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
