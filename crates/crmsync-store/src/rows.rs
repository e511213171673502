//! Shared column conversions

use chrono::{DateTime, SecondsFormat, Utc};

use crate::StoreError;

/// Format a timestamp for storage
///
/// Fixed-width (microseconds, `Z` suffix) so that string order equals
/// chronological order in `ORDER BY`.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a DateTime<Utc> from an ISO 8601 string
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's own datetime() format
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

/// Parse an optional DateTime<Utc> from an optional string
pub(crate) fn parse_optional_datetime(
    s: Option<String>,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    match s {
        Some(ref val) if !val.is_empty() => parse_datetime(val).map(Some),
        _ => Ok(None),
    }
}

/// Escape `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
