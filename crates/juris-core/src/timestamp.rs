//! Instant value type used by sessions and messages.
//!
//! Stored representations are RFC 3339 text. Conversion in both directions goes
//! through [`Timestamp::to_rfc3339`] and [`Timestamp::parse_rfc3339`]; serde
//! delegates to the same pair so a cache file can never hand back an instant
//! that was not explicitly parsed.

use crate::error::{JurisError, Result};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Builds a timestamp from Unix milliseconds.
    pub fn from_millis(millis: i64) -> Result<Self> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Self)
            .ok_or_else(|| JurisError::serialization("millis", format!("out of range: {millis}")))
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns a copy shifted forward by `millis` milliseconds.
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Serializes to RFC 3339 with a `Z` suffix and as many fractional digits
    /// as the instant needs, so parsing the text back yields the same instant.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Parses stored RFC 3339 text back into an instant.
    ///
    /// Offsets other than UTC are accepted and normalized.
    pub fn parse_rfc3339(text: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(text.trim())
            .map(|parsed| Self(parsed.with_timezone(&Utc)))
            .map_err(|e| JurisError::serialization("RFC3339", format!("'{text}': {e}")))
    }

    /// Coarse relative label used by session lists: `5m ago`, `3h ago`, `2d ago`.
    pub fn relative_to(&self, now: Timestamp) -> String {
        let elapsed = now.0.signed_duration_since(self.0);
        let hours = elapsed.num_hours();
        if hours < 1 {
            format!("{}m ago", elapsed.num_minutes().max(0))
        } else if hours < 24 {
            format!("{hours}h ago")
        } else {
            format!("{}d ago", hours / 24)
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse_rfc3339(&text).map_err(serde::de::Error::custom)
    }
}
