//! # TIAS Tiers
//!
//! Evaluates the tier condition catalog over one snapshot and resolves the
//! campaign's current tier and readiness.
//!
//! ```text
//! SnapshotStore ─> SnapshotViews ─> DerivedViews
//!                                       │
//!              CATALOG (tier 2: 5, tier 3: 6 conditions)
//!                                       │
//!                      resolve_tier ─> TierVerdict ─> generated/<date>/tier_state.json
//! ```
//!
//! Every threshold lives in [`TierConfig`].

mod condition;
mod config;
mod error;
pub mod predicates;
mod resolver;
mod verdict;

pub use condition::{
    conditions_for, evaluate_tier, Check, ConditionOutcome, ConditionSpec, Predicate, Tier,
    CATALOG,
};
pub use config::TierConfig;
pub use error::{Result, TierError};
pub use resolver::{resolve_tier, TierResolution};
pub use verdict::{
    read_current_tier, read_verdict, verdict_path, write_verdict, TierReport, TierVerdict,
    FALLBACK_TIER, TIER_STATE_FILE_NAME, VERDICT_SCHEMA_VERSION,
};

use predicates::EvalContext;
use std::collections::BTreeMap;
use tias_snapshot::{GameDate, SnapshotStore};
use tias_views::{DerivedViews, SnapshotViews};

/// Builds the views for `store` and evaluates the whole catalog.
///
/// Fails on I/O errors and when the human player cannot be identified.
/// Missing collections only make the conditions that need them false.
pub fn evaluate(store: &SnapshotStore, date: &GameDate, config: &TierConfig) -> Result<TierVerdict> {
    let views = SnapshotViews::build(store)?;
    let fingerprint = store.content_fingerprint()?;
    evaluate_views(&views, date, fingerprint, config)
}

pub fn evaluate_views(
    views: &SnapshotViews,
    date: &GameDate,
    fingerprint: u64,
    config: &TierConfig,
) -> Result<TierVerdict> {
    config.validate(
        conditions_for(Tier::Two).count(),
        conditions_for(Tier::Three).count(),
    )?;

    let derived = DerivedViews::build(views)?;
    let ctx = EvalContext::new(views, &derived);

    let tier2 = TierReport::from_outcomes(
        &evaluate_tier(Tier::Two, &ctx, config),
        config.required_tier2,
    );
    let tier3 = TierReport::from_outcomes(
        &evaluate_tier(Tier::Three, &ctx, config),
        config.required_tier3,
    );
    let resolution = resolve_tier(tier2.met, tier3.met, config);

    log::info!(
        "Tier {} for {date} (readiness {:.2}; tier 2: {}/{}, tier 3: {}/{})",
        resolution.current_tier,
        resolution.readiness,
        tier2.met,
        tier2.required,
        tier3.met,
        tier3.required
    );

    let stubs = CATALOG
        .iter()
        .filter(|spec| spec.is_stub())
        .map(|spec| spec.name.to_string())
        .collect();

    Ok(TierVerdict {
        schema_version: VERDICT_SCHEMA_VERSION,
        date: *date,
        current_tier: resolution.current_tier,
        readiness: resolution.readiness,
        snapshot_fingerprint: format!("{fingerprint:016x}"),
        tiers: BTreeMap::from([
            (Tier::Two.key().to_string(), tier2),
            (Tier::Three.key().to_string(), tier3),
        ]),
        stubs,
    })
}
