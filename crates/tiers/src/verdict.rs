use crate::condition::{ConditionOutcome, Tier};
use crate::{Result, TierError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tias_snapshot::GameDate;

pub const TIER_STATE_FILE_NAME: &str = "tier_state.json";
pub const VERDICT_SCHEMA_VERSION: u32 = 1;

/// Tier reported when no verdict can be read.
pub const FALLBACK_TIER: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierReport {
    pub conditions: BTreeMap<String, bool>,
    pub met: usize,
    pub required: usize,
    pub unlocked: bool,
}

impl TierReport {
    #[must_use]
    pub fn from_outcomes(
        outcomes: &BTreeMap<&'static str, ConditionOutcome>,
        required: usize,
    ) -> Self {
        let conditions: BTreeMap<String, bool> = outcomes
            .iter()
            .map(|(name, outcome)| ((*name).to_string(), outcome.is_met()))
            .collect();
        let met = conditions.values().filter(|met| **met).count();
        Self {
            conditions,
            met,
            required,
            unlocked: met >= required,
        }
    }
}

/// Persisted outcome of one evaluation. Contains no wall-clock data, so an
/// unchanged store always produces the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierVerdict {
    pub schema_version: u32,
    pub date: GameDate,
    pub current_tier: u8,
    pub readiness: f64,
    pub snapshot_fingerprint: String,
    pub tiers: BTreeMap<String, TierReport>,
    #[serde(default)]
    pub stubs: Vec<String>,
}

impl TierVerdict {
    #[must_use]
    pub fn report(&self, tier: Tier) -> Option<&TierReport> {
        self.tiers.get(tier.key())
    }
}

#[must_use]
pub fn verdict_path(generated_dir: &Path, date: &GameDate) -> PathBuf {
    generated_dir.join(date.iso()).join(TIER_STATE_FILE_NAME)
}

/// Writes the verdict through a temporary sibling and a rename, so readers
/// never observe a partial file.
pub fn write_verdict(path: &Path, verdict: &TierVerdict) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut bytes = serde_json::to_vec_pretty(verdict)?;
    bytes.push(b'\n');
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &bytes)?;
    std::fs::rename(&tmp, path).map_err(|err| {
        let _ = std::fs::remove_file(&tmp);
        TierError::VerdictWrite {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    })?;
    log::debug!("Verdict written: {}", path.display());
    Ok(())
}

pub fn read_verdict(path: &Path) -> Result<Option<TierVerdict>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Current tier recorded for `date`, or [`FALLBACK_TIER`] when the verdict is
/// missing or unreadable.
#[must_use]
pub fn read_current_tier(generated_dir: &Path, date: &GameDate) -> u8 {
    let path = verdict_path(generated_dir, date);
    match read_verdict(&path) {
        Ok(Some(verdict)) => verdict.current_tier,
        Ok(None) => {
            log::debug!(
                "No verdict at {}; assuming tier {FALLBACK_TIER}",
                path.display()
            );
            FALLBACK_TIER
        }
        Err(err) => {
            log::warn!(
                "Unreadable verdict {}: {err}; assuming tier {FALLBACK_TIER}",
                path.display()
            );
            FALLBACK_TIER
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn verdict(date: GameDate) -> TierVerdict {
        let outcomes = BTreeMap::from([
            ("lunar_fleet", ConditionOutcome::Met),
            ("orbital_stations", ConditionOutcome::Unmet),
        ]);
        TierVerdict {
            schema_version: VERDICT_SCHEMA_VERSION,
            date,
            current_tier: 2,
            readiness: 0.6,
            snapshot_fingerprint: "00000000000000ff".to_string(),
            tiers: BTreeMap::from([(
                Tier::Two.key().to_string(),
                TierReport::from_outcomes(&outcomes, 1),
            )]),
            stubs: Vec::new(),
        }
    }

    #[test]
    fn verdict_lands_under_iso_date() {
        let date = GameDate::parse("2027-8-1").unwrap();
        assert_eq!(
            verdict_path(Path::new("generated"), &date),
            PathBuf::from("generated/2027-08-01/tier_state.json")
        );
    }

    #[test]
    fn written_verdict_reads_back() {
        let tmp = TempDir::new().unwrap();
        let date = GameDate::parse("2027-8-1").unwrap();
        let path = verdict_path(tmp.path(), &date);

        write_verdict(&path, &verdict(date)).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let back = read_verdict(&path).unwrap().unwrap();
        assert_eq!(back, verdict(date));
        assert_eq!(back.report(Tier::Two).map(|r| r.met), Some(1));
        assert_eq!(read_current_tier(tmp.path(), &date), 2);
    }

    #[test]
    fn current_tier_falls_back_to_one() {
        let tmp = TempDir::new().unwrap();
        let date = GameDate::parse("2027-8-1").unwrap();
        assert_eq!(read_current_tier(tmp.path(), &date), FALLBACK_TIER);

        let path = verdict_path(tmp.path(), &date);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{ not json").unwrap();
        assert_eq!(read_current_tier(tmp.path(), &date), FALLBACK_TIER);
    }
}
