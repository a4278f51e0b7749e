use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(
        "Invalid date format: '{0}'. Supported formats: YYYY-M-D, YYYY-MM-DD, DD/MM/YYYY, D/M/YYYY"
    )]
    InvalidDate(String),

    #[error(
        "No savegame found matching {pattern} in {} (available: {})",
        dir.display(),
        available.join(", ")
    )]
    MissingSourceArtifact {
        dir: PathBuf,
        pattern: String,
        available: Vec<String>,
    },

    #[error("Savegame {} has no `gamestates` object", path.display())]
    MalformedSource { path: PathBuf },

    #[error("Snapshot store not found: {}", path.display())]
    StoreMissing { path: PathBuf },

    #[error("Failed to write snapshot store {}: {reason}", path.display())]
    StoreWrite { path: PathBuf, reason: String },
}
