use crate::predicates::{self, EvalContext, HAB_TYPE_BASE, HAB_TYPE_STATION, LUNA, MARS};
use crate::TierConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    Two,
    Three,
}

impl Tier {
    /// Key of the tier in the verdict record.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Two => "tier_2",
            Self::Three => "tier_3",
        }
    }
}

pub type Predicate = fn(&EvalContext<'_>, &TierConfig) -> bool;

#[derive(Clone, Copy)]
pub enum Check {
    Evaluate(Predicate),
    /// Not observable in snapshots; always reported unmet.
    Stub,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evaluate(_) => f.write_str("Evaluate"),
            Self::Stub => f.write_str("Stub"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConditionSpec {
    pub name: &'static str,
    pub tier: Tier,
    pub check: Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOutcome {
    Met,
    Unmet,
    Stub,
}

impl ConditionOutcome {
    #[must_use]
    pub const fn is_met(self) -> bool {
        matches!(self, Self::Met)
    }
}

impl ConditionSpec {
    #[must_use]
    pub fn evaluate(&self, ctx: &EvalContext<'_>, config: &TierConfig) -> ConditionOutcome {
        match self.check {
            Check::Stub => ConditionOutcome::Stub,
            Check::Evaluate(predicate) if predicate(ctx, config) => ConditionOutcome::Met,
            Check::Evaluate(_) => ConditionOutcome::Unmet,
        }
    }

    #[must_use]
    pub const fn is_stub(&self) -> bool {
        matches!(self.check, Check::Stub)
    }
}

pub const CATALOG: &[ConditionSpec] = &[
    ConditionSpec {
        name: "lunar_base_councilor",
        tier: Tier::Two,
        check: Check::Evaluate(|ctx, _| {
            predicates::councilor_at_hab_on(ctx, HAB_TYPE_BASE, LUNA)
        }),
    },
    ConditionSpec {
        name: "mission_control_capacity",
        tier: Tier::Two,
        check: Check::Evaluate(|ctx, config| {
            predicates::mission_control(ctx) >= config.mission_control_tier2
        }),
    },
    ConditionSpec {
        name: "orbital_stations",
        tier: Tier::Two,
        check: Check::Evaluate(|ctx, config| {
            predicates::player_hab_count(ctx, HAB_TYPE_STATION) >= config.stations_tier2
        }),
    },
    ConditionSpec {
        name: "federation_member",
        tier: Tier::Two,
        check: Check::Evaluate(|ctx, config| {
            predicates::federation_with_members(ctx, config.federation_members_tier2)
        }),
    },
    ConditionSpec {
        name: "lunar_fleet",
        tier: Tier::Two,
        check: Check::Evaluate(|ctx, _| predicates::fleet_orbits(ctx, LUNA)),
    },
    ConditionSpec {
        name: "martian_base_councilor",
        tier: Tier::Three,
        check: Check::Evaluate(|ctx, _| {
            predicates::councilor_at_hab_on(ctx, HAB_TYPE_BASE, MARS)
        }),
    },
    ConditionSpec {
        name: "mission_control_network",
        tier: Tier::Three,
        check: Check::Evaluate(|ctx, config| {
            predicates::mission_control(ctx) >= config.mission_control_tier3
        }),
    },
    ConditionSpec {
        name: "base_network",
        tier: Tier::Three,
        check: Check::Evaluate(|ctx, config| {
            predicates::player_hab_count(ctx, HAB_TYPE_BASE) >= config.bases_tier3
        }),
    },
    ConditionSpec {
        name: "great_federation",
        tier: Tier::Three,
        check: Check::Evaluate(|ctx, config| {
            predicates::federation_with_members(ctx, config.federation_members_tier3)
        }),
    },
    ConditionSpec {
        name: "martian_fleet",
        tier: Tier::Three,
        check: Check::Evaluate(|ctx, _| predicates::fleet_orbits(ctx, MARS)),
    },
    ConditionSpec {
        name: "alien_contact_analysed",
        tier: Tier::Three,
        check: Check::Stub,
    },
];

pub fn conditions_for(tier: Tier) -> impl Iterator<Item = &'static ConditionSpec> {
    CATALOG.iter().filter(move |spec| spec.tier == tier)
}

/// Evaluates every condition of `tier` independently.
#[must_use]
pub fn evaluate_tier(
    tier: Tier,
    ctx: &EvalContext<'_>,
    config: &TierConfig,
) -> BTreeMap<&'static str, ConditionOutcome> {
    conditions_for(tier)
        .map(|spec| {
            let outcome = spec.evaluate(ctx, config);
            log::debug!("{} {}: {:?}", tier.key(), spec.name, outcome);
            (spec.name, outcome)
        })
        .collect()
}
