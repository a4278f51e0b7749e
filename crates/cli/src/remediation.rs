//! Maps fatal errors onto a stable code and the command that fixes them.

use crate::config::ConfigError;
use serde::Serialize;
use tias_snapshot::{GameDate, SnapshotError};
use tias_tiers::TierError;
use tias_views::ViewError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remediation {
    pub code: &'static str,
    pub hint: String,
}

impl Remediation {
    fn new(code: &'static str, hint: impl Into<String>) -> Self {
        Self {
            code,
            hint: hint.into(),
        }
    }
}

/// Walks the error chain and returns the first recognised cause.
#[must_use]
pub fn classify(err: &anyhow::Error, date: Option<&GameDate>) -> Option<Remediation> {
    let date = date.map_or_else(|| "<date>".to_string(), GameDate::savegame_token);
    err.chain().find_map(|cause| {
        if let Some(err) = cause.downcast_ref::<SnapshotError>() {
            return classify_snapshot(err, &date);
        }
        if let Some(err) = cause.downcast_ref::<ViewError>() {
            return classify_view(err, &date);
        }
        if let Some(err) = cause.downcast_ref::<TierError>() {
            return classify_tier(err, &date);
        }
        cause
            .downcast_ref::<ConfigError>()
            .map(|err| classify_config(err, &date))
    })
}

fn classify_snapshot(err: &SnapshotError, date: &str) -> Option<Remediation> {
    match err {
        SnapshotError::MissingSourceArtifact { dir, pattern, .. } => Some(Remediation::new(
            "source_missing",
            format!(
                "save the campaign on {date} so a file matching {pattern} exists in {}, then run: tias parse --date {date}",
                dir.display()
            ),
        )),
        SnapshotError::MalformedSource { .. } => Some(Remediation::new(
            "source_malformed",
            format!("re-save the campaign in game, then run: tias parse --date {date} --force"),
        )),
        SnapshotError::StoreMissing { .. } => Some(Remediation::new(
            "store_missing",
            format!("run: tias parse --date {date}"),
        )),
        SnapshotError::StoreWrite { path, .. } => Some(Remediation::new(
            "store_write_failed",
            format!(
                "check free space and permissions for {}, then run: tias parse --date {date} --force",
                path.display()
            ),
        )),
        SnapshotError::InvalidDate(_) => Some(Remediation::new(
            "invalid_date",
            "use YYYY-M-D, YYYY-MM-DD, DD/MM/YYYY or D/M/YYYY",
        )),
        SnapshotError::SqliteError(_) => Some(Remediation::new(
            "store_corrupt",
            format!("rebuild the store: tias parse --date {date} --force"),
        )),
        SnapshotError::IoError(_) | SnapshotError::SerializationError(_) => None,
    }
}

fn classify_view(err: &ViewError, date: &str) -> Option<Remediation> {
    match err {
        ViewError::SnapshotError(inner) => classify_snapshot(inner, date),
        err if err.is_configuration_error() => Some(Remediation::new(
            "player_unresolved",
            format!(
                "the snapshot must contain exactly one human player; load a single-player campaign save and run: tias evaluate --date {date} --force"
            ),
        )),
        _ => None,
    }
}

fn classify_tier(err: &TierError, date: &str) -> Option<Remediation> {
    match err {
        TierError::ViewError(inner) => classify_view(inner, date),
        TierError::SnapshotError(inner) => classify_snapshot(inner, date),
        TierError::InvalidConfig(_) => Some(Remediation::new(
            "tier_config_invalid",
            "fix the [tiers] table in tias.toml",
        )),
        TierError::VerdictWrite { path, .. } => Some(Remediation::new(
            "verdict_write_failed",
            format!("check permissions for {}", path.display()),
        )),
        TierError::IoError(_) | TierError::SerializationError(_) => None,
    }
}

fn classify_config(err: &ConfigError, _date: &str) -> Remediation {
    match err {
        ConfigError::SavesDirUnset => Remediation::new(
            "saves_dir_unset",
            "set saves_dir in tias.toml, export TIAS_SAVES_DIR, or pass --saves-dir",
        ),
        ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Remediation::new(
            "config_invalid",
            format!("fix or remove {}", path.display()),
        ),
    }
}
