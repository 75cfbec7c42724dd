//! Feed entry data model.
//!
//! An `Entry` is one bookmark as seen by the sync engine: a stable id used
//! for deduplication, a publication timestamp used only to order side
//! effects within a run, and payload fields the engine passes through
//! untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feed item. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque identifier, unique within the feed and stable across
    /// re-fetches of the same logical bookmark.
    pub id: String,
    /// Publication time. Absent timestamps sort as the epoch.
    pub published: Option<DateTime<Utc>>,
    pub title: String,
    pub link: String,
    /// The user's bookmark comment (feed `description`).
    pub comment: String,
}

impl Entry {
    /// Sort key: milliseconds since the epoch, 0 when the feed omitted the
    /// publication time.
    pub fn published_millis(&self) -> i64 {
        self.published.map(|d| d.timestamp_millis()).unwrap_or(0)
    }
}

/// Sort ascending by publication time, keeping original feed order for
/// equal timestamps. Posting order must mirror feed chronology, so a
/// stable sort is required here.
pub fn sort_chronologically(entries: &mut [Entry]) {
    entries.sort_by_key(Entry::published_millis);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64, id: &str) -> Entry {
        Entry {
            id: id.to_string(),
            published: Some(Utc.timestamp_millis_opt(ms).unwrap()),
            title: format!("title-{id}"),
            link: format!("https://example.com/{id}"),
            comment: String::new(),
        }
    }

    #[test]
    fn sorts_ascending_by_published() {
        let mut entries = vec![at(3, "a"), at(1, "b"), at(2, "c")];
        sort_chronologically(&mut entries);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn missing_timestamp_sorts_first_and_keeps_feed_order() {
        let mut entries = vec![at(5, "late"), at(0, "x"), at(0, "y")];
        entries[1].published = None;
        entries[2].published = None;
        sort_chronologically(&mut entries);
        // Both unset timestamps collapse to the epoch; sort_by_key is
        // stable, so x stays ahead of y.
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["x", "y", "late"]);
    }
}
