use crate::EntityKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewError>;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Snapshot error: {0}")]
    SnapshotError(#[from] tias_snapshot::SnapshotError),

    #[error("No human player record in snapshot")]
    NoHumanPlayer,

    #[error("Multiple human player records in snapshot: {players:?}")]
    MultipleHumanPlayers { players: Vec<EntityKey> },
}

impl ViewError {
    /// True for snapshot contents no evaluation can proceed from, as opposed to I/O failures.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::NoHumanPlayer | Self::MultipleHumanPlayers { .. }
        )
    }
}
