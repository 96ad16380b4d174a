use chrono::{DateTime, Local, Utc};

/// Short human form of a timestamp relative to `now`: "just now", "5m ago",
/// "3h ago", "2d ago", then a calendar date after a week.
pub fn relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        ts.with_timezone(&Local).format("%b %-d, %Y").to_string()
    }
}

/// First block of a UUID, enough to tell rows apart on screen.
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
