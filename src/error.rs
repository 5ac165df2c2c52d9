//! Error types for the scraping pipeline.
//!
//! Only [`ExtractError`], list-page [`RenderError`]s, [`StoreError`] and
//! [`LockError`] abort a run. Article fetch failures and filesystem failures
//! while writing snapshots or indexes are logged and absorbed where they occur.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed announcement on the list page. Fatal for the run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unparseable publication timestamp {raw:?}: {source}")]
    BadTimestamp {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("announcement {title:?} has no link")]
    MissingLink { title: String },
}

/// A page could not be loaded or the expected element never appeared.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP status {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("element .{selector} not visible after {secs}s")]
    Timeout { selector: String, secs: u64 },

    #[error("no page loaded")]
    NoPage,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored timestamp {raw:?} is malformed: {source}")]
    BadTimestamp {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another run holds {}; remove it if that run is gone", path.display())]
    Held { path: PathBuf },

    #[error("cannot create lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("announcement list unavailable: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("base directory: {0}")]
    Io(#[from] io::Error),
}
