//! Token expiry parsing.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Compact expiry format issued by the backend (`20240131235959`), local time.
pub const COMPACT_EXPIRE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse a stored or backend-issued expiry.
///
/// Accepts RFC 3339 or [`COMPACT_EXPIRE_FORMAT`] interpreted in the local
/// time zone. Returns `None` for anything else, including local times that
/// do not exist (DST gaps).
pub fn parse_expire_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, COMPACT_EXPIRE_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
