use crate::config::{ConfigError, Settings};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tias_snapshot::{
    assess_staleness, read_savegame, select_source_artifact, store_path, GameDate, SnapshotStore,
    StaleAssessment, StoreSummary,
};
use tias_tiers::{evaluate, verdict_path, write_verdict, TierVerdict};

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub store_path: PathBuf,
    pub rebuilt: bool,
    pub assessment: StaleAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<StoreSummary>,
}

/// Makes sure an up-to-date store exists for `date`, rebuilding it from the
/// matching savegame when it is missing, older than the savegame, or `force`d.
///
/// Without a configured saves directory an existing store is used as is.
pub fn refresh_store(settings: &Settings, date: &GameDate, force: bool) -> Result<RefreshOutcome> {
    let store = store_path(&settings.build_dir, date);

    let saves_dir = match settings.saves_dir.as_deref() {
        Some(dir) => dir,
        None if store.is_file() && !force => {
            log::warn!(
                "Savegame directory not configured; using existing store {}",
                store.display()
            );
            return Ok(RefreshOutcome {
                store_path: store,
                rebuilt: false,
                assessment: StaleAssessment {
                    stale: false,
                    reasons: Vec::new(),
                    source: None,
                },
                summary: None,
            });
        }
        None => return Err(ConfigError::SavesDirUnset.into()),
    };

    let assessment = assess_staleness(&store, saves_dir, date, force)
        .with_context(|| format!("Failed to check staleness of {}", store.display()))?;
    if !assessment.stale {
        log::info!("Snapshot store is up to date: {}", store.display());
        return Ok(RefreshOutcome {
            store_path: store,
            rebuilt: false,
            assessment,
            summary: None,
        });
    }

    log::info!(
        "Rebuilding snapshot store for {date} ({:?})",
        assessment.reasons
    );
    // Selecting again only reports the missing savegame.
    let source = match assessment.source.clone() {
        Some(source) => source,
        None => select_source_artifact(saves_dir, date)?,
    };
    let savegame = read_savegame(&source)?;
    let summary = SnapshotStore::rebuild(&store, &savegame, Some(&source))?;

    Ok(RefreshOutcome {
        store_path: store,
        rebuilt: true,
        assessment,
        summary: Some(summary),
    })
}

#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub refresh: RefreshOutcome,
    pub verdict_path: PathBuf,
    pub verdict: TierVerdict,
}

/// Refreshes the store, evaluates every tier condition and records the verdict.
pub fn run_evaluation(settings: &Settings, date: &GameDate, force: bool) -> Result<EvaluationOutcome> {
    let refresh = refresh_store(settings, date, force)?;
    let store = SnapshotStore::open(&refresh.store_path)?;
    let verdict = evaluate(&store, date, &settings.tiers)?;

    let path = verdict_path(&settings.generated_dir, date);
    write_verdict(&path, &verdict)?;
    log::info!("Verdict written: {}", path.display());

    Ok(EvaluationOutcome {
        refresh,
        verdict_path: path,
        verdict,
    })
}
