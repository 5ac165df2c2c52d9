//! One scraping run, end to end.
//!
//! 1. **Extract**: open the announcement list and parse its items ([`extract`])
//! 2. **Dedup**: drop items whose timestamp is already stored, order the rest ([`dedup`])
//! 3. **Save**: persist the new records right away, content or not
//! 4. **Fetch + snapshot**: per record, oldest first, capture the article page
//!    ([`fetch`]) and write it into its day directory ([`crate::outputs::day_index`])
//! 5. **Re-save** the records whose content was captured
//! 6. **Global index**: link any day directory not linked yet ([`crate::outputs::global_index`])
//!
//! Extraction and store errors end the run. A failed article fetch or a
//! failed file write only costs that one record its snapshot.

pub mod dedup;
pub mod extract;
pub mod fetch;

use crate::config::Settings;
use crate::error::PipelineError;
use crate::lock::RunLock;
use crate::models::NewsRecord;
use crate::outputs::{day_index, global_index};
use crate::renderer::PageRenderer;
use crate::store::NewsStore;
use fetch::FetchPolicy;
use std::time::Instant;
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub candidates: usize,
    pub accepted: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
    pub snapshots: usize,
    pub days_linked: usize,
}

/// Run the pipeline once. The renderer session is closed before returning,
/// whether the run succeeded or not.
pub async fn run<R, S>(
    settings: &Settings,
    renderer: &mut R,
    store: &mut S,
) -> Result<RunSummary, PipelineError>
where
    R: PageRenderer,
    S: NewsStore,
{
    let result = run_locked(settings, renderer, store).await;
    renderer.close().await;
    result
}

#[instrument(level = "info", skip_all, fields(page = %settings.main_page))]
async fn run_locked<R, S>(
    settings: &Settings,
    renderer: &mut R,
    store: &mut S,
) -> Result<RunSummary, PipelineError>
where
    R: PageRenderer,
    S: NewsStore,
{
    let t0 = Instant::now();
    fs::create_dir_all(&settings.base_dir).await?;
    let _lock = RunLock::acquire(&settings.base_dir)?;
    let mut summary = RunSummary::default();

    // ---- Extract ----
    renderer.navigate(&settings.main_page).await?;
    let content = renderer
        .wait_for_visible(&settings.page_content_class, settings.wait_timeout())
        .await?;
    let items = content.find_all(&settings.announce_item_class);
    info!(items = items.len(), "Found announcement elements");
    let candidates = extract::extract_candidates(&items)?;
    summary.candidates = candidates.len();

    // ---- Dedup + save ----
    let mut records = dedup::select_new(&*store, candidates)?;
    summary.accepted = records.len();
    if !records.is_empty() {
        store.save_all(&mut records)?;
        info!(count = records.len(), "Saved new records");
    }

    // ---- Fetch + snapshot ----
    let policy = FetchPolicy {
        delay: settings.random_delay,
        content_class: settings.page_content_class.clone(),
        timeout: settings.wait_timeout(),
    };
    for record in records.iter_mut() {
        capture(settings, renderer, record, &policy, &mut summary).await;
    }

    let mut with_content: Vec<NewsRecord> =
        records.into_iter().filter(NewsRecord::has_content).collect();
    let resaved = if with_content.is_empty() {
        Ok(())
    } else {
        store.save_all(&mut with_content)
    };

    // ---- Global index ----
    match global_index::update_global_index(&settings.base_dir, &settings.global_index_name).await
    {
        Ok(added) => summary.days_linked = added.len(),
        Err(e) => error!(error = %e, "Failed to update global index"),
    }

    resaved?;
    info!(
        elapsed_ms = t0.elapsed().as_millis() as u64,
        candidates = summary.candidates,
        accepted = summary.accepted,
        fetched = summary.fetched,
        failed = summary.fetch_failures,
        snapshots = summary.snapshots,
        days_linked = summary.days_linked,
        "Run complete"
    );
    Ok(summary)
}

async fn capture<R: PageRenderer>(
    settings: &Settings,
    renderer: &mut R,
    record: &mut NewsRecord,
    policy: &FetchPolicy,
    summary: &mut RunSummary,
) {
    let content = match fetch::fetch_content(renderer, record, policy).await {
        Ok(content) => content,
        Err(e) => {
            warn!(url = %record.url, error = %e, "Could not fetch article; keeping record without content");
            summary.fetch_failures += 1;
            return;
        }
    };
    summary.fetched += 1;

    match day_index::persist_snapshot(&settings.base_dir, record, &content).await {
        Ok(snapshot) => {
            summary.snapshots += 1;
            info!(
                dir = %snapshot.dir.display(),
                file = %snapshot.file_name,
                "Stored article snapshot"
            );
        }
        Err(e) => warn!(url = %record.url, error = %e, "Could not write article snapshot"),
    }
    record.content = Some(content);
}
