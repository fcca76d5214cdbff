//! Unix time helpers for config `Version` stamps.

use chrono::{DateTime, Utc};

/// Seconds since the Unix epoch
pub fn to_unix_time(date: DateTime<Utc>) -> i64 {
    date.timestamp()
}

/// Inverse of [`to_unix_time`]; `None` when out of chrono's range
pub fn from_unix_time(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch() {
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_unix_time(epoch), 0);
    }

    #[test]
    fn test_roundtrip_second_precision() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 15).unwrap();
        let seconds = to_unix_time(date);
        assert_eq!(seconds, 1_709_987_415);
        assert_eq!(from_unix_time(seconds), Some(date));
    }
}
