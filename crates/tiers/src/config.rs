use crate::{Result, TierError};
use serde::{Deserialize, Serialize};

/// Thresholds and readiness constants for tier evaluation.
///
/// Every field has a default, so a partial `[tiers]` table only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierConfig {
    /// Tier-2 conditions that must hold to unlock tier 2.
    pub required_tier2: usize,
    /// Tier-3 conditions that must hold to unlock tier 3.
    pub required_tier3: usize,
    /// Readiness reached on unlocking tier 2.
    pub tier2_floor: f64,
    /// Readiness gained across tier 2 towards tier 3.
    pub tier3_increment: f64,

    pub mission_control_tier2: f64,
    pub mission_control_tier3: f64,
    pub stations_tier2: usize,
    pub bases_tier3: usize,
    pub federation_members_tier2: usize,
    pub federation_members_tier3: usize,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            required_tier2: 2,
            required_tier3: 3,
            tier2_floor: 0.6,
            tier3_increment: 0.1,
            mission_control_tier2: 12.0,
            mission_control_tier3: 25.0,
            stations_tier2: 2,
            bases_tier3: 4,
            federation_members_tier2: 3,
            federation_members_tier3: 6,
        }
    }
}

impl TierConfig {
    /// Rejects constants that would let readiness leave `[0, 1]` or require
    /// more conditions than a tier has.
    pub fn validate(&self, tier2_conditions: usize, tier3_conditions: usize) -> Result<()> {
        if !(0.0..=1.0).contains(&self.tier2_floor) {
            return Err(TierError::InvalidConfig(format!(
                "tier2_floor must be within [0, 1], got {}",
                self.tier2_floor
            )));
        }
        if self.tier3_increment < 0.0 || self.tier2_floor + self.tier3_increment > 1.0 {
            return Err(TierError::InvalidConfig(format!(
                "tier2_floor + tier3_increment must stay within [0, 1], got {} + {}",
                self.tier2_floor, self.tier3_increment
            )));
        }
        if self.required_tier2 > tier2_conditions {
            return Err(TierError::InvalidConfig(format!(
                "required_tier2 = {} exceeds the {tier2_conditions} tier-2 conditions",
                self.required_tier2
            )));
        }
        if self.required_tier3 > tier3_conditions {
            return Err(TierError::InvalidConfig(format!(
                "required_tier3 = {} exceeds the {tier3_conditions} tier-3 conditions",
                self.required_tier3
            )));
        }
        Ok(())
    }
}
