//! Composite views that follow references across collections.
//!
//! Everything here is computed once per evaluation from [`SnapshotViews`] and
//! is read-only afterwards. Broken reference chains degrade to empty values.

use crate::{resolve, CollectionTag, EntityKey, Result, SnapshotViews, View, ViewError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const DISPLAY_NAME: &str = "displayName";

/// The human player and the faction they control. `faction` is `None` when
/// the player's reference does not resolve in the faction collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerFaction {
    pub player: EntityKey,
    pub faction: Option<EntityKey>,
}

/// Finds the unique player record with `isAI == false`.
///
/// A player without an `isAI` field is not treated as human. A dangling
/// faction reference is not an error: the player simply holds nothing.
pub fn player_faction(views: &SnapshotViews) -> Result<PlayerFaction> {
    let humans: Vec<_> = views
        .players
        .records()
        .filter(|p| p.bool_field("isAI") == Some(false))
        .collect();

    let player = match humans.as_slice() {
        [] => return Err(ViewError::NoHumanPlayer),
        [player] => *player,
        many => {
            return Err(ViewError::MultipleHumanPlayers {
                players: many.iter().map(|p| p.key()).collect(),
            })
        }
    };

    let faction = resolve(&views.factions, player, "faction");
    match faction {
        Some(faction) => log::debug!("Human player {} controls faction {faction}", player.key()),
        None => log::warn!(
            "Human player {} has no resolvable faction; treating holdings as empty",
            player.key()
        ),
    }
    Ok(PlayerFaction {
        player: player.key(),
        faction,
    })
}

/// Entities owned by the player faction. Only keys present in their
/// collection are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerHoldings {
    pub councilors: BTreeSet<EntityKey>,
    pub fleets: BTreeSet<EntityKey>,
    pub control_points: BTreeSet<EntityKey>,
    pub habs: BTreeSet<EntityKey>,
    pub nations: BTreeSet<EntityKey>,
}

impl PlayerHoldings {
    #[must_use]
    pub fn collect(views: &SnapshotViews, faction: Option<EntityKey>) -> Self {
        let Some((faction, record)) =
            faction.and_then(|key| views.factions.get(key).map(|record| (key, record)))
        else {
            return Self::default();
        };

        let owned = |field: &str, target: &View| -> BTreeSet<EntityKey> {
            record
                .references(field)
                .into_iter()
                .filter(|key| target.contains(*key))
                .collect()
        };

        let councilors = owned("councilors", &views.councilors);
        let fleets = owned("fleets", &views.fleets);
        let control_points = owned("controlPoints", &views.control_points);

        let mut habs = owned("habs", &views.habs);
        habs.extend(
            views
                .habs
                .records()
                .filter(|hab| hab.reference("faction") == Some(faction))
                .map(|hab| hab.key()),
        );

        let nations = control_points
            .iter()
            .filter_map(|cp| views.control_points.get(*cp))
            .filter_map(|cp| resolve(&views.nations, cp, "nation"))
            .collect();

        Self {
            councilors,
            fleets,
            control_points,
            habs,
            nations,
        }
    }
}

/// Body name for every hab via `habSite → parentBody`; `""` where a hop is broken.
#[must_use]
pub fn hab_body_names(views: &SnapshotViews) -> BTreeMap<EntityKey, String> {
    views
        .habs
        .records()
        .map(|hab| {
            let name = resolve(&views.hab_sites, hab, "habSite")
                .and_then(|site| views.hab_sites.get(site))
                .and_then(|site| body_name(&views.space_bodies, site, "parentBody"));
            (hab.key(), name.unwrap_or_default())
        })
        .collect()
}

/// Body name for every fleet via `orbitState → barycenter`; `""` where a hop is broken.
#[must_use]
pub fn fleet_body_names(views: &SnapshotViews) -> BTreeMap<EntityKey, String> {
    views
        .fleets
        .records()
        .map(|fleet| {
            let name = resolve(&views.orbits, fleet, "orbitState")
                .and_then(|orbit| views.orbits.get(orbit))
                .and_then(|orbit| body_name(&views.space_bodies, orbit, "barycenter"));
            (fleet.key(), name.unwrap_or_default())
        })
        .collect()
}

fn body_name(bodies: &View, record: &crate::Record, field: &str) -> Option<String> {
    let body = bodies.get(resolve(bodies, record, field)?)?;
    body.str_field(DISPLAY_NAME).map(str::to_string)
}

/// Habs where any of `councilors` is located. Locations tagged with another
/// collection (regions, fleets) are ignored even when the key collides with a hab.
#[must_use]
pub fn councilor_hab_locations(
    views: &SnapshotViews,
    councilors: &BTreeSet<EntityKey>,
) -> BTreeSet<EntityKey> {
    councilors
        .iter()
        .filter_map(|key| views.councilors.get(*key))
        .filter_map(|councilor| views.resolve_tagged(councilor, "location"))
        .filter(|location| location.tag == CollectionTag::Hab)
        .map(|location| location.key)
        .collect()
}

/// Nations that take part in federations: neither aggregate nor alien.
#[must_use]
pub fn is_real_nation(views: &SnapshotViews, nation: EntityKey) -> bool {
    views
        .nations
        .get(nation)
        .is_some_and(|n| !n.flag("aggregateNation") && !n.flag("alienNation"))
}

/// Existing, real member nations of a federation.
#[must_use]
pub fn real_member_count(views: &SnapshotViews, federation: EntityKey) -> usize {
    views.federations.get(federation).map_or(0, |fed| {
        fed.references("members")
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|member| is_real_nation(views, *member))
            .count()
    })
}

/// Federation key → real member count for every federation a real player
/// nation belongs to.
#[must_use]
pub fn player_federations(
    views: &SnapshotViews,
    nations: &BTreeSet<EntityKey>,
) -> BTreeMap<EntityKey, usize> {
    nations
        .iter()
        .filter(|nation| is_real_nation(views, **nation))
        .filter_map(|nation| views.nations.get(*nation))
        .filter_map(|nation| resolve(&views.federations, nation, "federation"))
        .map(|federation| (federation, real_member_count(views, federation)))
        .collect()
}

/// Player-relative composites shared by every condition.
#[derive(Debug, Clone)]
pub struct DerivedViews {
    pub player: PlayerFaction,
    pub holdings: PlayerHoldings,
    pub councilor_habs: BTreeSet<EntityKey>,
    pub federations: BTreeMap<EntityKey, usize>,
    hab_bodies: BTreeMap<EntityKey, String>,
    fleet_bodies: BTreeMap<EntityKey, String>,
}

impl DerivedViews {
    /// Fails only when the human player cannot be identified.
    pub fn build(views: &SnapshotViews) -> Result<Self> {
        let player = player_faction(views)?;
        let holdings = PlayerHoldings::collect(views, player.faction);
        let councilor_habs = councilor_hab_locations(views, &holdings.councilors);
        let federations = player_federations(views, &holdings.nations);

        log::debug!(
            "Player holdings: {} councilors, {} habs, {} fleets, {} nations",
            holdings.councilors.len(),
            holdings.habs.len(),
            holdings.fleets.len(),
            holdings.nations.len()
        );

        Ok(Self {
            player,
            holdings,
            councilor_habs,
            federations,
            hab_bodies: hab_body_names(views),
            fleet_bodies: fleet_body_names(views),
        })
    }

    /// `""` when the hab is unknown or its chain to a body is broken.
    #[must_use]
    pub fn hab_body_name(&self, hab: EntityKey) -> &str {
        self.hab_bodies.get(&hab).map_or("", String::as_str)
    }

    #[must_use]
    pub fn fleet_body_name(&self, fleet: EntityKey) -> &str {
        self.fleet_bodies.get(&fleet).map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn view(collection: &str, records: serde_json::Value) -> View {
        View::from_document(collection, records)
    }

    #[test]
    fn player_faction_requires_exactly_one_human() {
        let mut views = SnapshotViews {
            factions: view(collections::FACTION, json!([{ "Key": { "value": 3 }, "Value": {} }])),
            players: view(
                collections::PLAYER,
                json!([
                    { "Key": { "value": 1 }, "Value": { "isAI": true, "faction": { "value": 3 } } },
                    { "Key": { "value": 2 }, "Value": { "faction": { "value": 3 } } }
                ]),
            ),
            ..SnapshotViews::default()
        };
        assert!(matches!(player_faction(&views), Err(ViewError::NoHumanPlayer)));

        views.players = view(
            collections::PLAYER,
            json!([
                { "Key": { "value": 1 }, "Value": { "isAI": false, "faction": { "value": 3 } } },
                { "Key": { "value": 2 }, "Value": { "isAI": false, "faction": { "value": 3 } } }
            ]),
        );
        match player_faction(&views) {
            Err(ViewError::MultipleHumanPlayers { players }) => {
                assert_eq!(players, vec![EntityKey(1), EntityKey(2)]);
            }
            other => panic!("unexpected: {other:?}"),
        }

        views.players = view(
            collections::PLAYER,
            json!([{ "Key": { "value": 1 }, "Value": { "isAI": false, "faction": { "value": 4 } } }]),
        );
        assert_eq!(
            player_faction(&views).unwrap(),
            PlayerFaction {
                player: EntityKey(1),
                faction: None
            }
        );
    }

    #[test]
    fn unresolved_faction_yields_empty_holdings() {
        let views = SnapshotViews {
            players: view(
                collections::PLAYER,
                json!([{ "Key": { "value": 1 }, "Value": { "isAI": false, "faction": { "value": 3 } } }]),
            ),
            habs: view(
                collections::HAB,
                json!([{ "Key": { "value": 7 }, "Value": { "faction": { "value": 3 } } }]),
            ),
            ..SnapshotViews::default()
        };
        let derived = DerivedViews::build(&views).unwrap();
        assert_eq!(derived.player.faction, None);
        assert_eq!(derived.holdings, PlayerHoldings::default());
        assert!(derived.councilor_habs.is_empty());
        assert!(derived.federations.is_empty());
    }

    #[test]
    fn hab_body_name_is_empty_when_site_has_no_parent_body() {
        let views = SnapshotViews {
            habs: view(
                collections::HAB,
                json!([
                    { "Key": { "value": 1 }, "Value": { "habSite": { "value": 10 } } },
                    { "Key": { "value": 2 }, "Value": { "habSite": { "value": 11 } } },
                    { "Key": { "value": 3 }, "Value": {} }
                ]),
            ),
            hab_sites: view(
                collections::HAB_SITE,
                json!([
                    { "Key": { "value": 10 }, "Value": { "parentBody": { "value": 100 } } },
                    { "Key": { "value": 11 }, "Value": {} }
                ]),
            ),
            space_bodies: view(
                collections::SPACE_BODY,
                json!([{ "Key": { "value": 100 }, "Value": { "displayName": "Luna" } }]),
            ),
            ..SnapshotViews::default()
        };
        let names = hab_body_names(&views);
        assert_eq!(names[&EntityKey(1)], "Luna");
        assert_eq!(names[&EntityKey(2)], "");
        assert_eq!(names[&EntityKey(3)], "");
    }

    #[test]
    fn federation_members_exclude_aggregate_alien_and_dangling() {
        let views = SnapshotViews {
            nations: view(
                collections::NATION,
                json!([
                    { "Key": { "value": 1 }, "Value": { "federation": { "value": 50 } } },
                    { "Key": { "value": 2 }, "Value": { "federation": { "value": 50 } } },
                    { "Key": { "value": 3 }, "Value": { "aggregateNation": true } },
                    { "Key": { "value": 4 }, "Value": { "alienNation": true } }
                ]),
            ),
            federations: view(
                collections::FEDERATION,
                json!([{ "Key": { "value": 50 }, "Value": {
                    "members": [{ "value": 1 }, { "value": 2 }, { "value": 3 }, { "value": 4 }, { "value": 9 }, null]
                } }]),
            ),
            ..SnapshotViews::default()
        };
        assert_eq!(real_member_count(&views, EntityKey(50)), 2);

        let player_nations = [EntityKey(1), EntityKey(3)].into_iter().collect();
        assert_eq!(
            player_federations(&views, &player_nations),
            BTreeMap::from([(EntityKey(50), 2)])
        );
    }
}
