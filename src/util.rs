use crate::model::Timestamp;
use chrono::DateTime;

/// `YYYY-MM-DD` of a timestamp in UTC, or the raw seconds when out of range.
pub fn format_day(timestamp: Timestamp) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
