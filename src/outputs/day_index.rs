//! Per-day snapshot directories.
//!
//! Each record with content becomes `{base}/{dd-MM-yyyy}/{n}.html`, and a line
//! `<p>dd.MM.yyyy HH:MM - <a href="{n}.html">title</a></p>` is inserted right
//! below the header of that directory's `index.html`.
//!
//! # Numbering
//!
//! `n` is one more than the number of snapshot files already present, so it is
//! re-derived on every write and survives restarts. Two runs writing the same
//! day at once can race here; the run lock in [`crate::lock`] prevents that.

use super::markup::{escape_text, is_header, read_lines, write_lines};
use crate::models::NewsRecord;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

pub const DAY_INDEX_FILE: &str = "index.html";
pub const DAY_INDEX_HEADER: &str =
    r#"<h1 style="font-weight: bold; text-align: left;">Новости</h1>"#;

/// Where a snapshot landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub dir: PathBuf,
    pub file_name: String,
}

/// Write `content` as the next numbered snapshot of the record's day and add
/// the record to that day's index.
#[instrument(level = "info", skip_all, fields(day = %record.day_dir_name(), title = %record.title))]
pub async fn persist_snapshot(
    base_dir: &Path,
    record: &NewsRecord,
    content: &str,
) -> io::Result<Snapshot> {
    let dir = base_dir.join(record.day_dir_name());
    fs::create_dir_all(&dir).await?;

    let (number, mut file) = create_next_snapshot(&dir).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    let file_name = format!("{number}.html");
    info!(path = %dir.join(&file_name).display(), bytes = content.len(), "Saved article snapshot");

    let entry = entry_line(record, &file_name);
    prepend_entry(&dir.join(DAY_INDEX_FILE), entry).await?;
    info!(title = %record.title, "Added entry to day index");

    Ok(Snapshot { dir, file_name })
}

fn entry_line(record: &NewsRecord, file_name: &str) -> String {
    format!(
        r#"<p>{} - <a href="{}">{}</a></p>"#,
        record.list_timestamp(),
        file_name,
        escape_text(&record.title)
    )
}

/// Number of snapshot files in `dir`: regular `*.html` files other than the index.
pub async fn count_snapshots(dir: &Path) -> io::Result<usize> {
    let mut entries = fs::read_dir(dir).await?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(".html") && name != DAY_INDEX_FILE && entry.file_type().await?.is_file()
        {
            count += 1;
        }
    }
    Ok(count)
}

/// Create `{n}.html` with `n = count + 1`. An existing file is never
/// overwritten: if the slot is taken the number moves up until a free one.
async fn create_next_snapshot(dir: &Path) -> io::Result<(usize, fs::File)> {
    let mut number = count_snapshots(dir).await? + 1;
    loop {
        let path = dir.join(format!("{number}.html"));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((number, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Snapshot slot taken");
                number += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Insert `entry` directly below the first header line, keeping every other
/// line as is. A missing file is created; a file without a header line gets
/// one on top.
pub async fn prepend_entry(index_path: &Path, entry: String) -> io::Result<()> {
    let mut lines = read_lines(index_path).await?;

    match lines.iter().position(|line| is_header(line)) {
        Some(header_at) => lines.insert(header_at + 1, entry),
        None => {
            lines.insert(0, entry);
            lines.insert(0, DAY_INDEX_HEADER.to_string());
        }
    }

    write_lines(index_path, &lines).await
}
