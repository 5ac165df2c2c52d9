//! SQLite-backed [`NewsStore`].

use super::NewsStore;
use crate::error::StoreError;
use crate::models::NewsRecord;
use chrono::NaiveDateTime;
use rusqlite::{Connection, Params, Row, params};
use std::path::Path;
use tracing::{debug, info, instrument};

const STORED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.init_schema()?;
        info!("Opened news store");
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS news (
                id               INTEGER PRIMARY KEY,
                url              TEXT NOT NULL,
                title            TEXT NOT NULL,
                content          TEXT,
                publication_date TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_news_publication_date ON news(publication_date);
            ",
        )?;
        Ok(())
    }

    fn query<P: Params>(&self, sql: &str, args: P) -> Result<Vec<NewsRecord>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, raw_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }
}

fn encode(ts: NaiveDateTime) -> String {
    ts.format(STORED_TIMESTAMP_FORMAT).to_string()
}

struct RawRow {
    id: i64,
    url: String,
    title: String,
    content: Option<String>,
    publication_date: String,
}

impl RawRow {
    fn into_record(self) -> Result<NewsRecord, StoreError> {
        let publication_date =
            NaiveDateTime::parse_from_str(&self.publication_date, STORED_TIMESTAMP_FORMAT)
                .map_err(|source| StoreError::BadTimestamp {
                    raw: self.publication_date.clone(),
                    source,
                })?;
        Ok(NewsRecord {
            id: Some(self.id),
            url: self.url,
            title: self.title,
            content: self.content,
            publication_date,
        })
    }
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        publication_date: row.get(4)?,
    })
}

impl NewsStore for SqliteStore {
    fn find_by_timestamp(&self, ts: NaiveDateTime) -> Result<Vec<NewsRecord>, StoreError> {
        self.query(
            "SELECT id, url, title, content, publication_date FROM news WHERE publication_date = ?1",
            params![encode(ts)],
        )
    }

    #[instrument(level = "info", skip_all, fields(count = records.len()))]
    fn save_all(&mut self, records: &mut [NewsRecord]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        for record in records.iter_mut() {
            match record.id {
                Some(id) => {
                    tx.execute(
                        "INSERT INTO news (id, url, title, content, publication_date)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT(id) DO UPDATE SET
                            url = excluded.url,
                            title = excluded.title,
                            content = excluded.content,
                            publication_date = excluded.publication_date",
                        params![
                            id,
                            record.url,
                            record.title,
                            record.content,
                            encode(record.publication_date)
                        ],
                    )?;
                }
                None => {
                    tx.execute(
                        "INSERT INTO news (url, title, content, publication_date) VALUES (?1, ?2, ?3, ?4)",
                        params![
                            record.url,
                            record.title,
                            record.content,
                            encode(record.publication_date)
                        ],
                    )?;
                    record.id = Some(tx.last_insert_rowid());
                }
            }
            debug!(id = ?record.id, published = %record.publication_date, "Saved record");
        }
        tx.commit()?;
        Ok(())
    }

    fn find_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NewsRecord>, StoreError> {
        self.query(
            "SELECT id, url, title, content, publication_date FROM news
             WHERE publication_date BETWEEN ?1 AND ?2
             ORDER BY publication_date, id",
            params![encode(start), encode(end)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn ts(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn record(when: NaiveDateTime, title: &str) -> NewsRecord {
        NewsRecord {
            id: None,
            url: format!("https://mid.ru/{title}"),
            title: title.to_string(),
            content: None,
            publication_date: when,
        }
    }

    #[test]
    fn test_exact_timestamp_lookup() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut records = vec![record(ts(1, 10, 0), "a"), record(ts(1, 10, 1), "b")];
        store.save_all(&mut records).unwrap();

        let hit = store.find_by_timestamp(ts(1, 10, 0)).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].title, "a");
        assert!(store.find_by_timestamp(ts(1, 10, 2)).unwrap().is_empty());
    }

    #[test]
    fn test_resave_updates_in_place() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut records = vec![record(ts(1, 10, 0), "a")];
        store.save_all(&mut records).unwrap();
        let id = records[0].id.unwrap();

        records[0].content = Some("<div class=\"page-content\">body</div>".to_string());
        store.save_all(&mut records).unwrap();

        let hit = store.find_by_timestamp(ts(1, 10, 0)).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].id, Some(id));
        assert!(hit[0].content.as_deref().unwrap().contains("body"));
    }

    #[test]
    fn test_find_between_orders_by_date() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut records = vec![
            record(ts(3, 8, 0), "c"),
            record(ts(1, 8, 0), "a"),
            record(ts(2, 8, 0), "b"),
        ];
        store.save_all(&mut records).unwrap();

        let found = store.find_between(ts(1, 0, 0), ts(2, 23, 59)).unwrap();
        let titles: Vec<_> = found.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.sqlite");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.save_all(&mut [record(ts(1, 10, 0), "a")]).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.find_by_timestamp(ts(1, 10, 0)).unwrap().len(), 1);
    }
}
