//! ISO-8601 time values as used by SensorThings payloads

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated point in time.
///
/// Text is parsed once on assignment; equality compares the instant, so
/// `2024-04-27T06:00:00+02:00` equals `2024-04-27T04:00:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Accepts RFC 3339 text and, as a fallback, offset-less ISO-8601 which is
    /// taken to be UTC.
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        let text = text.trim();
        match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => Ok(Self(dt)),
            Err(err) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Self(Utc.from_utc_datetime(&naive).fixed_offset()))
                .map_err(|_| err),
        }
    }

    pub fn now() -> Self {
        Utc::now().into()
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Normalized RFC 3339 text, keeping the original offset.
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(value: DateTime<Tz>) -> Self {
        let offset = value.offset().fix();
        Self(value.with_timezone(&offset))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

/// Either an instant or a `start/end` interval (phenomenonTime, validTime).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeValue {
    Instant(Timestamp),
    Interval(Timestamp, Timestamp),
}

impl TimeValue {
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        match text.split_once('/') {
            Some((start, end)) => Ok(TimeValue::Interval(
                Timestamp::parse(start)?,
                Timestamp::parse(end)?,
            )),
            None => Timestamp::parse(text).map(TimeValue::Instant),
        }
    }
}

impl From<Timestamp> for TimeValue {
    fn from(value: Timestamp) -> Self {
        TimeValue::Instant(value)
    }
}

impl FromStr for TimeValue {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeValue::Instant(t) => write!(f, "{}", t),
            TimeValue::Interval(start, end) => write!(f, "{}/{}", start, end),
        }
    }
}
