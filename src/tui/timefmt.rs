//! Relative timestamp formatting for message metadata.
//!
//! Ages are recomputed from the creation timestamp on every render; nothing
//! is cached, so a message ticks over from "just now" to "2m ago" without
//! any invalidation machinery.

use chrono::{DateTime, Local, Utc};

/// Format a unix-seconds timestamp as a relative age ("just now", "5m ago",
/// "2h ago", "Yesterday", "4d ago", then a date for anything older).
pub fn relative_age(created_at: i64) -> String {
    relative_age_at(created_at, Utc::now().timestamp())
}

/// Testable core: age of `created_at` as seen from `now` (both unix seconds).
fn relative_age_at(created_at: i64, now: i64) -> String {
    let secs = now.saturating_sub(created_at);
    let mins = secs / 60;
    let hours = secs / 3600;
    let days = secs / 86_400;

    if secs < 60 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        DateTime::<Utc>::from_timestamp(created_at, 0)
            .map(|dt| dt.with_timezone(&Local).format("%b %d, %Y").to_string())
            .unwrap_or_else(|| "long ago".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn fresh_messages_are_just_now() {
        assert_eq!(relative_age_at(NOW, NOW), "just now");
        assert_eq!(relative_age_at(NOW - 59, NOW), "just now");
    }

    #[test]
    fn minutes_and_hours() {
        assert_eq!(relative_age_at(NOW - 60, NOW), "1m ago");
        assert_eq!(relative_age_at(NOW - 59 * 60, NOW), "59m ago");
        assert_eq!(relative_age_at(NOW - 3600, NOW), "1h ago");
        assert_eq!(relative_age_at(NOW - 23 * 3600, NOW), "23h ago");
    }

    #[test]
    fn days_and_yesterday() {
        assert_eq!(relative_age_at(NOW - 86_400, NOW), "Yesterday");
        assert_eq!(relative_age_at(NOW - 3 * 86_400, NOW), "3d ago");
    }

    #[test]
    fn older_than_a_week_shows_a_date() {
        let age = relative_age_at(NOW - 30 * 86_400, NOW);
        // Exact string depends on the local timezone; the year anchors it
        assert!(age.contains("2023"), "unexpected format: {age}");
    }

    #[test]
    fn future_timestamps_clamp_to_just_now() {
        assert_eq!(relative_age_at(NOW + 500, NOW), "just now");
    }
}
