use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::EngineId;

/// One submitted search. `(engine_id, query)` is unique; `time` is Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub engine_id: EngineId,
    pub query: String,
    pub time: i64,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(engine_id: EngineId, query: impl Into<String>, time: i64) -> Self {
        Self {
            engine_id,
            query: query.into(),
            time,
        }
    }

    /// Entry stamped with the current wall-clock time.
    #[must_use]
    pub fn now(engine_id: EngineId, query: impl Into<String>) -> Self {
        Self::new(engine_id, query, Utc::now().timestamp_millis())
    }

    #[must_use]
    pub fn searched_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.time).single()
    }
}

/// Human-friendly age of a search, as shown in the history list.
#[must_use]
pub fn format_age(now_millis: i64, entry: &HistoryEntry) -> String {
    let elapsed = chrono::Duration::milliseconds(now_millis.saturating_sub(entry.time));

    if elapsed < chrono::Duration::minutes(1) {
        return "just now".to_string();
    }
    if elapsed < chrono::Duration::hours(1) {
        return plural(elapsed.num_minutes(), "minute");
    }
    if elapsed < chrono::Duration::days(1) {
        return plural(elapsed.num_hours(), "hour");
    }
    if elapsed < chrono::Duration::days(8) {
        return plural(elapsed.num_days(), "day");
    }

    format_timestamp(entry)
}

#[must_use]
pub fn format_timestamp(entry: &HistoryEntry) -> String {
    entry.searched_at().map_or_else(
        || entry.time.to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60 * 1000;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    fn entry_at(time: i64) -> HistoryEntry {
        HistoryEntry::new(EngineId::from_index(0), "rust", time)
    }

    #[test]
    fn recent_searches_are_just_now() {
        let now = 1_700_000_000_000;
        assert_eq!(format_age(now, &entry_at(now)), "just now");
        assert_eq!(format_age(now, &entry_at(now - 59_000)), "just now");
    }

    #[test]
    fn age_uses_largest_whole_unit() {
        let now = 1_700_000_000_000;
        assert_eq!(format_age(now, &entry_at(now - MINUTE)), "1 minute ago");
        assert_eq!(format_age(now, &entry_at(now - 42 * MINUTE)), "42 minutes ago");
        assert_eq!(format_age(now, &entry_at(now - 3 * HOUR)), "3 hours ago");
        assert_eq!(format_age(now, &entry_at(now - DAY)), "1 day ago");
        assert_eq!(format_age(now, &entry_at(now - 7 * DAY)), "7 days ago");
    }

    #[test]
    fn old_searches_show_a_date() {
        let now = 1_700_000_000_000;
        let old = entry_at(now - 30 * DAY);
        assert_eq!(format_age(now, &old), format_timestamp(&old));
        assert!(format_timestamp(&old).contains('-'));
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = 1_700_000_000_000;
        assert_eq!(format_age(now, &entry_at(now + HOUR)), "just now");
    }
}
