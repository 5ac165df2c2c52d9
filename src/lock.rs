//! Run-level mutual exclusion.
//!
//! Snapshot numbering and index updates are read-modify-write operations on
//! shared files, so two runs must never overlap. A run holds `{base}/.run.lock`
//! for its whole duration; the file is created with create-new semantics and
//! removed when the guard drops, on every exit path.

use crate::error::LockError;
use chrono::Utc;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const LOCK_FILE: &str = ".run.lock";

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Take the lock in `base_dir`, failing if another run holds it.
    pub fn acquire(base_dir: &Path) -> Result<Self, LockError> {
        let path = base_dir.join(LOCK_FILE);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LockError::Held { path });
            }
            Err(source) => return Err(LockError::Io { path, source }),
        };

        let stamp = format!("pid={} started={}\n", std::process::id(), Utc::now().to_rfc3339());
        if let Err(source) = file.write_all(stamp.as_bytes()) {
            let _ = fs::remove_file(&path);
            return Err(LockError::Io { path, source });
        }
        info!(path = %path.display(), "Acquired run lock");
        Ok(Self { path })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Released run lock"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove run lock"),
        }
    }
}
