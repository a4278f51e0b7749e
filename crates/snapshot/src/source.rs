use crate::paths::{savegame_pattern, SAVEGAME_EXTENSION};
use crate::{GameDate, Result, SnapshotError};
use std::path::{Path, PathBuf};

/// Lists every savegame in `saves_dir` whose name carries `date`, sorted by path.
///
/// A missing or unreadable directory yields an empty list.
#[must_use]
pub fn locate_source_artifacts(saves_dir: &Path, date: &GameDate) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&saves_dir.to_string_lossy()),
        savegame_pattern(date)
    );
    let mut matches: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).filter(|p| p.is_file()).collect(),
        Err(err) => {
            log::debug!("Invalid savegame pattern {pattern}: {err}");
            Vec::new()
        }
    };
    matches.sort();
    matches
}

/// Picks the savegame for `date`.
///
/// Several matches are not disambiguated: the first path in sort order wins
/// and the full match list is logged as a warning.
pub fn select_source_artifact(saves_dir: &Path, date: &GameDate) -> Result<PathBuf> {
    let mut matches = locate_source_artifacts(saves_dir, date);
    if matches.is_empty() {
        return Err(SnapshotError::MissingSourceArtifact {
            dir: saves_dir.to_path_buf(),
            pattern: savegame_pattern(date),
            available: available_savegames(saves_dir),
        });
    }
    if matches.len() > 1 {
        log::warn!(
            "Multiple savegames match {}: {:?}; using {}",
            savegame_pattern(date),
            matches
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect::<Vec<_>>(),
            matches[0].display()
        );
    }
    Ok(matches.swap_remove(0))
}

fn available_savegames(saves_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(saves_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(SAVEGAME_EXTENSION))
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}
