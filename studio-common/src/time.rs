//! Timestamp utilities
//!
//! Timestamps are stored as RFC 3339 UTC strings with millisecond precision
//! so that SQLite's `DATE()` and lexical ordering both work on them.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};

/// Current UTC timestamp, truncated to storage precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Render a timestamp in storage format (`2025-11-22T07:00:00.000Z`)
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp read back from storage
pub fn from_storage(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Corrupt timestamp '{}' in database: {}", value, e)))
}

/// Parse a caller-supplied calendar day
///
/// Accepts either a bare date (`2025-11-22`) or a full RFC 3339 timestamp,
/// in which case only the UTC calendar day is kept.
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| Error::InvalidInput(format!("Invalid date: {}", value)))
}

/// Format a calendar day as stored in the `day` columns
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Parse a caller-supplied timestamp
///
/// A bare date (`2025-11-22`) is taken as midnight UTC of that day.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid timestamp: {}", value)))
}

/// Serde helpers for request fields accepting either a date or a timestamp
pub mod flexible {
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(D::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de::Error as _, Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::super::parse_timestamp(&raw)
                    .map(Some)
                    .map_err(D::Error::custom),
                None => Ok(None),
            }
        }
    }
}
