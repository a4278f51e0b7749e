//! Building blocks for condition predicates. All of them are pure reads over
//! the shared views and treat missing data as "not satisfied".

use tias_views::{DerivedViews, EntityKey, SnapshotViews};

pub const LUNA: &str = "Luna";
pub const MARS: &str = "Mars";

pub const HAB_TYPE_BASE: &str = "Base";
pub const HAB_TYPE_STATION: &str = "Station";

const MISSION_CONTROL_FIELD: &str = "baseIncomes_year.MissionControl";

/// Views shared by every predicate in one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub views: &'a SnapshotViews,
    pub derived: &'a DerivedViews,
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub const fn new(views: &'a SnapshotViews, derived: &'a DerivedViews) -> Self {
        Self { views, derived }
    }

    fn hab_type(&self, hab: EntityKey) -> Option<&'a str> {
        self.views.habs.get(hab)?.str_field("habType")
    }
}

/// A player councilor sits in a player hab of `hab_type` on `body`.
#[must_use]
pub fn councilor_at_hab_on(ctx: &EvalContext<'_>, hab_type: &str, body: &str) -> bool {
    ctx.derived.councilor_habs.iter().any(|hab| {
        ctx.derived.holdings.habs.contains(hab)
            && ctx.hab_type(*hab) == Some(hab_type)
            && ctx.derived.hab_body_name(*hab) == body
    })
}

/// Yearly MissionControl income of the player faction; 0 when absent.
#[must_use]
pub fn mission_control(ctx: &EvalContext<'_>) -> f64 {
    ctx.derived
        .player
        .faction
        .and_then(|key| ctx.views.factions.get(key))
        .and_then(|faction| faction.f64_field(MISSION_CONTROL_FIELD))
        .unwrap_or(0.0)
}

#[must_use]
pub fn player_hab_count(ctx: &EvalContext<'_>, hab_type: &str) -> usize {
    ctx.derived
        .holdings
        .habs
        .iter()
        .filter(|hab| ctx.hab_type(**hab) == Some(hab_type))
        .count()
}

/// A real player nation belongs to a federation of at least `members` real nations.
#[must_use]
pub fn federation_with_members(ctx: &EvalContext<'_>, members: usize) -> bool {
    ctx.derived.federations.values().any(|count| *count >= members)
}

#[must_use]
pub fn fleet_orbits(ctx: &EvalContext<'_>, body: &str) -> bool {
    ctx.derived
        .holdings
        .fleets
        .iter()
        .any(|fleet| ctx.derived.fleet_body_name(*fleet) == body)
}

