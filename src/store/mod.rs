//! Structured store for news records.
//!
//! The store enforces no uniqueness of its own: the pipeline checks
//! [`NewsStore::find_by_timestamp`] before accepting a candidate, and
//! [`NewsStore::save_all`] is last-write-wins keyed by record id.

#[cfg(test)]
pub mod memory;
pub mod sqlite;

use crate::error::StoreError;
use crate::models::NewsRecord;
use chrono::NaiveDateTime;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub trait NewsStore {
    /// Records whose publication timestamp equals `ts` exactly.
    fn find_by_timestamp(&self, ts: NaiveDateTime) -> Result<Vec<NewsRecord>, StoreError>;

    /// Insert records without an id (assigning one) and overwrite records that have one.
    fn save_all(&mut self, records: &mut [NewsRecord]) -> Result<(), StoreError>;

    /// Records published within `[start, end]`, oldest first.
    fn find_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NewsRecord>, StoreError>;
}
