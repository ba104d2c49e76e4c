use chrono::{DateTime, Utc};

/// Formats a timestamp relative to `now`: "just now", "5 minutes ago", "2 days ago", ...
/// Timestamps in the future or older than four weeks are shown as a date.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(timestamp).num_seconds();

    let plural = |n: i64, unit: &str| format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" });

    match seconds {
        s if s < 0 => timestamp.format("%Y-%m-%d").to_string(),
        s if s < 60 => "just now".to_string(),
        s if s < 3600 => plural(s / 60, "minute"),
        s if s < 86400 => plural(s / 3600, "hour"),
        s if s < 604800 => plural(s / 86400, "day"),
        s if s < 4 * 604800 => plural(s / 604800, "week"),
        _ => timestamp.format("%Y-%m-%d").to_string(),
    }
}

/// Like [`format_relative_time`], rendering a missing timestamp as "-".
pub fn format_optional(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    timestamp
        .map(|t| format_relative_time(t, now))
        .unwrap_or_else(|| "-".to_string())
}
