//! The top-level index of day directories (`mid_news_index.html`).
//!
//! Every day directory gets exactly one `<p><a href="{day}/index.html">{day}</a></p>`
//! line. Days found on this pass that the index does not link yet are
//! inserted as a block right below the header, in the order they were
//! enumerated; lines already present keep their relative order.
//!
//! Day directories are enumerated by name, descending. The names are
//! `dd-MM-yyyy`, so this is not chronological across months or years
//! (`01-04-2024` sorts below `02-03-2024`).

use super::markup::{IndexLine, classify, is_header, read_lines, write_lines};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

pub const GLOBAL_INDEX_HEADER: &str = "<h1>НОВОСТИ МИД</h1>";

static DAY_DIR_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap());

fn day_link(day: &str) -> String {
    format!("{day}/index.html")
}

/// Links already present in the index.
async fn existing_links(index_path: &Path) -> io::Result<HashSet<String>> {
    Ok(read_lines(index_path)
        .await?
        .iter()
        .filter_map(|line| match classify(line) {
            IndexLine::Entry { href } => Some(href),
            _ => None,
        })
        .collect())
}

/// Day directory names under `base_dir`, descending.
pub async fn day_directories(base_dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = fs::read_dir(base_dir).await?;
    let mut days = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if DAY_DIR_NAME.is_match(&name) {
            days.push(name);
        } else {
            debug!(%name, "Skipping non-day directory");
        }
    }
    Ok(days.into_iter().sorted_by(|a, b| b.cmp(a)).collect())
}

/// Link every day directory not yet in the index. Returns the days added.
///
/// The days added in one pass go in as a block right below the header, in
/// descending order, rather than each one at the top in turn. Entries from
/// earlier passes stay below that block.
///
/// Each added day is a separate read-modify-write of the whole file, so an
/// interrupted pass leaves a valid index holding the days written so far.
#[instrument(level = "info", skip_all, fields(base_dir = %base_dir.display()))]
pub async fn update_global_index(base_dir: &Path, index_name: &str) -> io::Result<Vec<String>> {
    let index_path = base_dir.join(index_name);
    let mut known = existing_links(&index_path).await?;
    let mut added = Vec::new();

    for day in day_directories(base_dir).await? {
        let link = day_link(&day);
        if known.contains(&link) {
            continue;
        }

        let mut lines = read_lines(&index_path).await?;
        let header_at = match lines.iter().position(|l| is_header(l)) {
            Some(pos) => pos,
            None => {
                lines.insert(0, GLOBAL_INDEX_HEADER.to_string());
                0
            }
        };
        let entry = format!(r#"<p><a href="{link}">{day}</a></p>"#);
        let at = (header_at + 1 + added.len()).min(lines.len());
        lines.insert(at, entry);
        write_lines(&index_path, &lines).await?;

        debug!(%day, "Linked day in global index");
        known.insert(link);
        added.push(day);
    }

    info!(added = added.len(), "Updated global news index");
    Ok(added)
}
