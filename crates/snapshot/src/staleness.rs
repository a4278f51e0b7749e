use crate::source::select_source_artifact;
use crate::{GameDate, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    StoreMissing,
    SourceNewer,
    Forced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleAssessment {
    pub stale: bool,
    pub reasons: Vec<StaleReason>,
    /// Savegame the decision was based on, when one was found.
    pub source: Option<PathBuf>,
}

/// Decides whether the store at `store_path` must be rebuilt for `date`.
///
/// Without a matching savegame the store is reported fresh even when it
/// exists: nothing could replace it.
pub fn assess_staleness(
    store_path: &Path,
    saves_dir: &Path,
    date: &GameDate,
    force: bool,
) -> Result<StaleAssessment> {
    let source = select_source_artifact(saves_dir, date).ok();

    if force {
        return Ok(StaleAssessment {
            stale: true,
            reasons: vec![StaleReason::Forced],
            source,
        });
    }

    let store_mtime = modified_time(store_path)?;
    let source_mtime = match &source {
        Some(path) => modified_time(path)?,
        None => {
            log::debug!(
                "No savegame for {} in {}",
                date.savegame_token(),
                saves_dir.display()
            );
            None
        }
    };

    let mut assessment = compare_mtimes(store_mtime, source_mtime);
    assessment.source = source;
    Ok(assessment)
}

/// Contract form of [`assess_staleness`] without forcing.
///
/// Metadata failures are logged and treated as "not stale" so an existing
/// store is never discarded on an error path.
#[must_use]
pub fn is_stale(store_path: &Path, saves_dir: &Path, date: &GameDate) -> bool {
    match assess_staleness(store_path, saves_dir, date, false) {
        Ok(assessment) => assessment.stale,
        Err(err) => {
            log::warn!(
                "Staleness check for {} failed: {err}",
                store_path.display()
            );
            false
        }
    }
}

/// Pure comparison of store and savegame modification times.
#[must_use]
pub fn compare_mtimes(store: Option<SystemTime>, source: Option<SystemTime>) -> StaleAssessment {
    let mut reasons = Vec::new();
    match (store, source) {
        (None, _) => reasons.push(StaleReason::StoreMissing),
        (Some(store), Some(source)) if source > store => reasons.push(StaleReason::SourceNewer),
        _ => {}
    }

    StaleAssessment {
        stale: !reasons.is_empty(),
        reasons,
        source: None,
    }
}

fn modified_time(path: &Path) -> Result<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.modified()?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn stale_when_store_missing() {
        let out = compare_mtimes(None, at(10));
        assert_eq!(out.stale, true);
        assert_eq!(out.reasons, vec![StaleReason::StoreMissing]);

        let out = compare_mtimes(None, None);
        assert_eq!(out.reasons, vec![StaleReason::StoreMissing]);
    }

    #[test]
    fn stale_when_source_newer() {
        let out = compare_mtimes(at(100), at(101));
        assert_eq!(out.stale, true);
        assert_eq!(out.reasons, vec![StaleReason::SourceNewer]);
    }

    #[test]
    fn fresh_when_source_older_or_equal() {
        assert_eq!(compare_mtimes(at(100), at(99)).stale, false);
        assert_eq!(compare_mtimes(at(100), at(100)).stale, false);
    }

    #[test]
    fn fresh_when_source_missing() {
        let out = compare_mtimes(at(100), None);
        assert_eq!(out.stale, false);
        assert_eq!(out.reasons, Vec::<StaleReason>::new());
    }
}
