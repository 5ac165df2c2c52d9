use super::NewsStore;
use crate::error::StoreError;
use crate::models::NewsRecord;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// In-process store. Counts writes so tests can assert on idempotent re-runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<i64, NewsRecord>,
    next_id: i64,
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<&NewsRecord> {
        self.rows.values().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl NewsStore for MemoryStore {
    fn find_by_timestamp(&self, ts: NaiveDateTime) -> Result<Vec<NewsRecord>, StoreError> {
        Ok(self
            .rows
            .values()
            .filter(|r| r.publication_date == ts)
            .cloned()
            .collect())
    }

    fn save_all(&mut self, records: &mut [NewsRecord]) -> Result<(), StoreError> {
        for record in records.iter_mut() {
            let id = match record.id {
                Some(id) => id,
                None => {
                    self.next_id += 1;
                    record.id = Some(self.next_id);
                    self.next_id
                }
            };
            self.rows.insert(id, record.clone());
            self.writes += 1;
        }
        Ok(())
    }

    fn find_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NewsRecord>, StoreError> {
        let mut found: Vec<NewsRecord> = self
            .rows
            .values()
            .filter(|r| r.publication_date >= start && r.publication_date <= end)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.publication_date);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, title: &str) -> NewsRecord {
        NewsRecord {
            id: None,
            url: format!("https://x/{title}"),
            title: title.to_string(),
            content: None,
            publication_date: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_save_assigns_ids_and_overwrites() {
        let mut store = MemoryStore::new();
        let mut records = vec![record(1, "a"), record(2, "b")];
        store.save_all(&mut records).unwrap();
        assert_eq!(records[0].id, Some(1));
        assert_eq!(records[1].id, Some(2));

        records[0].content = Some("<div/>".to_string());
        store.save_all(&mut records[..1]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.writes, 3);

        let found = store.find_by_timestamp(records[0].publication_date).unwrap();
        assert_eq!(found[0].content.as_deref(), Some("<div/>"));
    }

    #[test]
    fn test_find_between_inclusive() {
        let mut store = MemoryStore::new();
        let mut records = vec![record(3, "c"), record(1, "a"), record(2, "b")];
        store.save_all(&mut records).unwrap();

        let found = store
            .find_between(records[1].publication_date, records[2].publication_date)
            .unwrap();
        let titles: Vec<_> = found.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }
}
