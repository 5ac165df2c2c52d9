//! Snapshot and index files under the base directory.
//!
//! # Submodules
//!
//! - [`day_index`]: writes numbered article snapshots and the per-day `index.html`
//! - [`global_index`]: keeps the top-level index of day directories
//! - [`markup`]: reading and writing the index line format
//!
//! # Output Structure
//!
//! ```text
//! mid-news/
//! ├── mid_news_index.html    # global index, newest days first
//! ├── 01-03-2024/
//! │   ├── index.html         # header + entries, newest first
//! │   ├── 1.html
//! │   └── 2.html
//! └── 02-03-2024/
//!     ├── index.html
//!     └── 1.html
//! ```
//!
//! Both index layers are append-only: entries are inserted below the header
//! and existing lines are carried over verbatim. Nothing here ever deletes a
//! day directory, a snapshot, or an index entry.

pub mod day_index;
pub mod global_index;
pub mod markup;
