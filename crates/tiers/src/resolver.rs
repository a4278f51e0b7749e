use crate::TierConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierResolution {
    pub current_tier: u8,
    pub readiness: f64,
    pub unlocked_tier2: bool,
    pub unlocked_tier3: bool,
}

/// Maps met-condition counts onto the current tier and a readiness score.
///
/// Tier 3 is reached on its own count alone; a snapshot meeting the tier-3
/// bar is reported as tier 3 even if tier 2 is still locked.
#[must_use]
pub fn resolve_tier(met_tier2: usize, met_tier3: usize, config: &TierConfig) -> TierResolution {
    let unlocked_tier2 = met_tier2 >= config.required_tier2;
    let unlocked_tier3 = met_tier3 >= config.required_tier3;

    let (current_tier, readiness) = if unlocked_tier3 {
        (3, 1.0)
    } else if unlocked_tier2 {
        (
            2,
            config.tier2_floor
                + config.tier3_increment * fraction(met_tier3, config.required_tier3),
        )
    } else {
        (1, config.tier2_floor * fraction(met_tier2, config.required_tier2))
    };

    TierResolution {
        current_tier,
        readiness: readiness.clamp(0.0, 1.0),
        unlocked_tier2,
        unlocked_tier3,
    }
}

fn fraction(met: usize, required: usize) -> f64 {
    if required == 0 {
        return 1.0;
    }
    (met as f64 / required as f64).min(1.0)
}
