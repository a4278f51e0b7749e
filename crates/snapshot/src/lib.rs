//! # TIAS Snapshot
//!
//! Savegame ingestion and the per-date snapshot store.
//!
//! ## Pipeline
//!
//! ```text
//! Saves directory
//!     │
//!     ├──> Source lookup (*_<Y>-<M>-<D>.gz)
//!     │      └─> Savegame path
//!     │
//!     ├──> Staleness check (store mtime vs savegame mtime)
//!     │      └─> Rebuild decision
//!     │
//!     └──> Ingest (gzip, BOM-tolerant JSON)
//!            └─> SQLite store: build/savegame_<YYYY-MM-DD>.db
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use tias_snapshot::{
//!     assess_staleness, read_savegame, select_source_artifact, store_path, GameDate,
//!     SnapshotStore,
//! };
//!
//! fn main() -> tias_snapshot::Result<()> {
//!     let date = GameDate::parse("2027-8-1")?;
//!     let saves = Path::new("/saves");
//!     let store = store_path(Path::new("build"), &date);
//!
//!     if assess_staleness(&store, saves, &date, false)?.stale {
//!         let source = select_source_artifact(saves, &date)?;
//!         SnapshotStore::rebuild(&store, &read_savegame(&source)?, Some(&source))?;
//!     }
//!
//!     let snapshot = SnapshotStore::open(&store)?;
//!     println!("{} collections", snapshot.collection_keys()?.len());
//!     Ok(())
//! }
//! ```

mod date;
mod error;
mod ingest;
mod paths;
mod source;
mod staleness;
mod store;

pub use date::GameDate;
pub use error::{Result, SnapshotError};
pub use ingest::{read_savegame, Savegame};
pub use paths::{
    savegame_pattern, store_path, BUILD_DIR_NAME, GENERATED_DIR_NAME, SAVEGAME_EXTENSION,
};
pub use source::{locate_source_artifacts, select_source_artifact};
pub use staleness::{assess_staleness, compare_mtimes, is_stale, StaleAssessment, StaleReason};
pub use store::{SnapshotStore, StoreSummary, SOURCE_FILE_KEY};
