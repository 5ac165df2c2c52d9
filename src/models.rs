//! Data models for announcement candidates and persisted news records.
//!
//! - [`Candidate`]: an item parsed from the announcement list, not yet known to be new
//! - [`NewsRecord`]: a candidate accepted as new, eligible for fetching and persistence
//!
//! The publication timestamp (minute precision) is the identity of a news item:
//! two records sharing it are the same item.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the timestamp prefix on the announcement list and in day-index entries.
pub const LIST_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Format of a day directory name.
pub const DAY_DIR_FORMAT: &str = "%d-%m-%Y";

/// An announcement parsed from the list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Publication time, truncated to the minute.
    pub published_at: NaiveDateTime,
    /// Non-empty, trimmed title.
    pub title: String,
    /// Absolute link to the detail page.
    pub url: String,
}

/// A news item as held by the structured store.
///
/// `content` stays `None` until the article page has been captured. A record
/// whose fetch failed is still persisted without content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Store-assigned identifier; `None` until the first save.
    pub id: Option<i64>,
    pub url: String,
    pub title: String,
    /// Raw outer markup of the detail page's content container.
    pub content: Option<String>,
    pub publication_date: NaiveDateTime,
}

impl From<Candidate> for NewsRecord {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: None,
            url: candidate.url,
            title: candidate.title,
            content: None,
            publication_date: candidate.published_at,
        }
    }
}

impl NewsRecord {
    /// Whether a non-empty content snapshot has been captured.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Name of the day directory this record belongs to, e.g. `01-03-2024`.
    pub fn day_dir_name(&self) -> String {
        self.publication_date.format(DAY_DIR_FORMAT).to_string()
    }

    /// Timestamp as rendered in day-index entries, e.g. `01.03.2024 10:00`.
    pub fn list_timestamp(&self) -> String {
        self.publication_date.format(LIST_TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_record_from_candidate() {
        let record = NewsRecord::from(Candidate {
            published_at: ts(1, 10, 0),
            title: "Title A".to_string(),
            url: "https://x/a".to_string(),
        });

        assert_eq!(record.id, None);
        assert_eq!(record.content, None);
        assert_eq!(record.title, "Title A");
        assert_eq!(record.url, "https://x/a");
        assert!(!record.has_content());
    }

    #[test]
    fn test_day_dir_and_list_timestamp() {
        let record = NewsRecord {
            id: Some(1),
            url: "https://x/a".to_string(),
            title: "Title A".to_string(),
            content: Some("<div></div>".to_string()),
            publication_date: ts(1, 9, 5),
        };

        assert_eq!(record.day_dir_name(), "01-03-2024");
        assert_eq!(record.list_timestamp(), "01.03.2024 09:05");
        assert!(record.has_content());
    }

    #[test]
    fn test_empty_content_is_not_content() {
        let record = NewsRecord {
            id: None,
            url: "https://x/a".to_string(),
            title: "Title A".to_string(),
            content: Some(String::new()),
            publication_date: ts(1, 9, 5),
        };
        assert!(!record.has_content());
    }

    #[test]
    fn test_record_serialization() {
        let record = NewsRecord {
            id: Some(7),
            url: "https://x/a".to_string(),
            title: "Title A".to_string(),
            content: None,
            publication_date: ts(2, 18, 30),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("2024-03-02T18:30:00"));
        let back: NewsRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
