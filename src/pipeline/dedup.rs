//! Selecting the candidates that are not stored yet.

use crate::error::StoreError;
use crate::models::{Candidate, NewsRecord};
use crate::store::NewsStore;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{info, instrument};

/// Keep candidates whose exact timestamp is neither stored nor already
/// accepted in this batch. The result is in ascending timestamp order
/// whatever the page order was.
#[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
pub fn select_new<S: NewsStore>(
    store: &S,
    candidates: Vec<Candidate>,
) -> Result<Vec<NewsRecord>, StoreError> {
    let mut pending: BTreeMap<NaiveDateTime, NewsRecord> = BTreeMap::new();

    for candidate in candidates {
        let published_at = candidate.published_at;
        if !store.find_by_timestamp(published_at)?.is_empty() {
            info!(%published_at, "Already stored; skipping");
            continue;
        }
        match pending.entry(published_at) {
            Entry::Vacant(slot) => {
                info!(%published_at, title = %candidate.title, "Accepted new announcement");
                slot.insert(NewsRecord::from(candidate));
            }
            Entry::Occupied(_) => {
                info!(%published_at, title = %candidate.title, "Duplicate timestamp on page; skipping");
            }
        }
    }

    Ok(pending.into_values().collect())
}
