use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;

/// Timestamp layout shared by both sides of a key.
pub const KEY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lowercase a filename after NFC composition so both sources agree on it.
pub fn normalize_name(name: &str) -> String {
    let composed: String = name.nfc().collect();
    composed.to_lowercase()
}

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC. Empty or malformed input yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Second-precision date string, empty when the date is unknown.
pub fn key_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format(KEY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// `name|size|date`
pub fn strict_key(name: &str, size: u64, date: &str) -> String {
    format!("{}|{}|{}", name, size, date)
}

/// `name|date`
pub fn fallback_key(name: &str, date: &str) -> String {
    format!("{}|{}", name, date)
}
