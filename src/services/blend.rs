//! Selection policy for the history section of the suggestion list.

use crate::constants::history::RECENT_LIMIT;
use crate::matching::fuzzy_match;
use crate::models::HistoryEntry;

/// Picks the history rows to show for `query`.
///
/// A blank query shows the most recent searches; otherwise entries that start
/// with the query (case-sensitive) or are within fuzzy distance of it, newest
/// first and uncapped.
#[must_use]
pub fn history_suggestions(
    entries: &[HistoryEntry],
    query: &str,
    suggest_history: bool,
) -> Vec<HistoryEntry> {
    if !suggest_history {
        return Vec::new();
    }

    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.time.cmp(&a.time));

    if query.trim().is_empty() {
        sorted.truncate(RECENT_LIMIT);
        return sorted;
    }

    sorted.retain(|e| e.query.starts_with(query) || fuzzy_match(query, &e.query));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EngineId;

    fn entry(query: &str, time: i64) -> HistoryEntry {
        HistoryEntry::new(EngineId::from_index(0), query, time)
    }

    fn queries(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.query.as_str()).collect()
    }

    #[test]
    fn disabled_history_is_always_empty() {
        let entries = vec![entry("rust", 1), entry("rustup", 2)];
        assert!(history_suggestions(&entries, "", false).is_empty());
        assert!(history_suggestions(&entries, "rust", false).is_empty());
    }

    #[test]
    fn blank_query_returns_most_recent_five() {
        let entries: Vec<_> = (1..=7).map(|t| entry(&format!("q{t}"), t)).collect();
        let shown = history_suggestions(&entries, "   ", true);
        assert_eq!(queries(&shown), ["q7", "q6", "q5", "q4", "q3"]);
    }

    #[test]
    fn blank_query_orders_newest_first() {
        let entries = vec![entry("t1", 10), entry("t3", 30), entry("t2", 20)];
        let shown = history_suggestions(&entries, "", true);
        assert_eq!(queries(&shown), ["t3", "t2", "t1"]);
    }

    #[test]
    fn prefix_matches_are_kept_and_far_entries_dropped() {
        let entries = vec![entry("abcdef", 1), entry("xyzabc", 2)];
        let shown = history_suggestions(&entries, "abc", true);
        assert_eq!(queries(&shown), ["abcdef"]);
    }

    #[test]
    fn prefix_match_is_case_sensitive_but_fuzzy_is_not() {
        let entries = vec![entry("Rust programming language", 1), entry("RUST", 2)];
        let shown = history_suggestions(&entries, "rust", true);
        assert_eq!(queries(&shown), ["RUST"]);
    }

    #[test]
    fn typos_within_two_edits_match() {
        let entries = vec![entry("weather", 5), entry("whether", 3), entry("leather jacket", 9)];
        let shown = history_suggestions(&entries, "wether", true);
        assert_eq!(queries(&shown), ["weather", "whether"]);
    }

    #[test]
    fn filtered_results_are_not_capped() {
        let entries: Vec<_> = (0..12).map(|t| entry(&format!("rust {t}"), t)).collect();
        let shown = history_suggestions(&entries, "rust", true);
        assert_eq!(shown.len(), 12);
        assert_eq!(shown[0].time, 11);
    }
}
