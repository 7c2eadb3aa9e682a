//! Fixed-width RFC 3339 timestamps.
//!
//! Every persisted instant is written as `YYYY-MM-DDTHH:MM:SS.mmmZ`, so the lexical order of
//! the stored strings is the chronological order and range filters can compare strings.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

/// First instant of a calendar day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last representable millisecond of a calendar day.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(end).and_utc()
}

/// serde adapter: `#[serde(with = "rfc3339_millis")]`
pub mod rfc3339_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_width_format() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(format_timestamp(&dt), "2025-01-05T14:30:00.000Z");
    }

    #[test]
    fn test_string_order_matches_time_order() {
        let earlier = Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1500);
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn test_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(format_timestamp(&start_of_day(day)), "2025-03-01T00:00:00.000Z");
        assert_eq!(format_timestamp(&end_of_day(day)), "2025-03-01T23:59:59.999Z");
    }

    #[test]
    fn test_parse_accepts_offsets() {
        let parsed = parse_timestamp("2025-01-05T16:30:00+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2025-01-05T14:30:00.000Z");
    }
}
