pub mod admin;
pub mod code;
pub mod session;

pub use admin::SqliteAdminStore;
pub use code::SqliteCodeStore;
pub use session::SqliteSessionStore;

use chrono::{NaiveDateTime, TimeZone, Utc};
use keyward_core::KeywardError;

/// Format used for every datetime this crate binds into SQL. Fixed width
/// with zero-padded milliseconds, so stored values compare correctly as
/// strings; the DEFAULT clauses in the schema produce the same shape.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub(crate) fn format_datetime(dt: chrono::DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a SQLite datetime text string into a chrono DateTime<Utc>.
///
/// SQLite stores datetimes as TEXT in the format produced by
/// `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`, which yields strings like
/// `2025-01-01T00:00:00.000Z`.
pub(crate) fn parse_datetime(s: &str) -> Result<chrono::DateTime<Utc>, KeywardError> {
    // Try RFC 3339 first (handles the trailing Z)
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Fallback: parse as NaiveDateTime with milliseconds
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    // Fallback: parse without fractional seconds
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(KeywardError::Storage(format!("failed to parse datetime: {s}")))
}

/// Parse an optional SQLite datetime text string.
pub(crate) fn parse_datetime_opt(
    s: Option<&str>,
) -> Result<Option<chrono::DateTime<Utc>>, KeywardError> {
    match s {
        Some(s) => Ok(Some(parse_datetime(s)?)),
        None => Ok(None),
    }
}
