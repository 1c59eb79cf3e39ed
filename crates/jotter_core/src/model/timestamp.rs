//! ISO-8601 timestamp wire format.
//!
//! Writes RFC 3339 in UTC with a `Z` suffix. Reads RFC 3339 with any offset,
//! and also offset-less timestamps (`2024-01-01T10:00:00.000`) which are
//! taken as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Timestamp type used across the note model.
pub type Timestamp = DateTime<Utc>;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Formats a timestamp the way it is persisted.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses a persisted timestamp.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub mod iso8601 {
    use super::{format_timestamp, parse_timestamp, Timestamp};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 timestamp `{raw}`")))
    }
}

pub mod iso8601_option {
    use super::{format_timestamp, parse_timestamp, Timestamp};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format_timestamp(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 timestamp `{raw}`"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{TimeZone, Utc};

    #[test]
    fn formats_whole_seconds_with_z_suffix() {
        let value = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid fixed timestamp");
        assert_eq!(format_timestamp(&value), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn parses_offset_and_offsetless_forms() {
        let expected = Utc
            .with_ymd_and_hms(2024, 3, 5, 10, 0, 0)
            .single()
            .expect("valid fixed timestamp");
        assert_eq!(parse_timestamp("2024-03-05T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T10:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
