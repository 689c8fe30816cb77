// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Timestamp helpers for the wire format.
//!
//! Outgoing timestamps are always written as UTC RFC 3339 strings with
//! millisecond precision (`2025-01-15T13:30:00.000Z`). Incoming timestamps may
//! carry an offset or none at all: the backend stores naive UTC datetimes and
//! returns them without a suffix, so an offset-less value is read as UTC.
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Formats a timestamp the way it is sent to the backend.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a timestamp as returned by the backend.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `serde(with = ...)` adapter for optional timestamps.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) => super::parse(&value)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {value}"))),
        }
    }
}
