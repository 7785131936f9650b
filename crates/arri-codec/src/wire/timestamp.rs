//! RFC 3339 timestamps in UTC with millisecond precision

use chrono::{DateTime, SecondsFormat, Utc};

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Append a quoted timestamp
pub fn append_timestamp(buf: &mut Vec<u8>, value: &DateTime<Utc>) {
    buf.push(b'"');
    buf.extend_from_slice(format_timestamp(value).as_bytes());
    buf.push(b'"');
}

/// Parse any RFC 3339 timestamp (fractional seconds optional, any offset)
/// and normalize it to UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
