use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TierError>;

#[derive(Error, Debug)]
pub enum TierError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Snapshot error: {0}")]
    SnapshotError(#[from] tias_snapshot::SnapshotError),

    #[error(transparent)]
    ViewError(#[from] tias_views::ViewError),

    #[error("Invalid tier configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write verdict {path}: {reason}")]
    VerdictWrite { path: PathBuf, reason: String },
}
