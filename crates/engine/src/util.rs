//! Internal helpers for timestamps.
//!
//! These utilities are **not** part of the public API. Timestamps travel as
//! ISO-8601 strings and are compared lexicographically, so everything the
//! engine generates uses one fixed shape: UTC, millisecond precision, `Z`.

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};

/// Current wall-clock time in the engine's timestamp shape.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Pull cursor. Finer than the write stamps, so a write stamped in the same
/// millisecond sorts after the cursor and is picked up by the next pull.
pub(crate) fn cursor_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Order two stamps by the instant they denote, so `…00Z` and `…00.000Z`
/// compare equal. Unparseable stamps fall back to string order.
pub(crate) fn compare_stamps(a: &str, b: &str) -> Ordering {
    match (
        DateTime::parse_from_rfc3339(a),
        DateTime::parse_from_rfc3339(b),
    ) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Stamp for a local write: never earlier than the row's previous stamp.
pub(crate) fn next_stamp(previous: Option<&str>) -> String {
    let now = now_timestamp();
    match previous {
        Some(previous) if compare_stamps(previous, &now) == Ordering::Greater => {
            previous.to_string()
        }
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_fixed_shape() {
        let now = now_timestamp();
        assert_eq!(now.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(now.ends_with('Z'));
    }

    #[test]
    fn write_in_same_millisecond_sorts_after_cursor() {
        let cursor = "2024-01-01T00:00:00.123456Z";
        assert!("2024-01-01T00:00:00.123Z" > cursor);
        assert!("2024-01-01T00:00:00.122Z" < cursor);
    }

    #[test]
    fn next_stamp_never_goes_backwards() {
        let future = "9999-01-01T00:00:00.000Z";
        assert_eq!(next_stamp(Some(future)), future);

        let past = "2000-01-01T00:00:00.000Z";
        assert!(next_stamp(Some(past)).as_str() > past);
        assert!(next_stamp(None).as_str() > past);
    }

    #[test]
    fn next_stamp_moves_past_whole_second_stamp() {
        // Same second as now, written without a fraction: sorts after now as a
        // string but is earlier in time.
        let now = now_timestamp();
        let whole_second = format!("{}Z", &now[..19]);
        let stamp = next_stamp(Some(&whole_second));
        assert_ne!(stamp, whole_second);
        assert_ne!(compare_stamps(&stamp, &whole_second), Ordering::Less);
    }

    #[test]
    fn stamps_compare_by_instant() {
        assert_eq!(
            compare_stamps("2024-01-01T10:00:00Z", "2024-01-01T10:00:00.000Z"),
            Ordering::Equal
        );
        assert_eq!(
            compare_stamps("2024-01-01T10:00:00.500Z", "2024-01-01T10:00:00Z"),
            Ordering::Greater
        );
    }
}
