use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tempfile::TempDir;
use tias_snapshot::{store_path, GameDate, Savegame, SnapshotStore};
use tias_tiers::{
    evaluate, read_current_tier, verdict_path, write_verdict, Tier, TierConfig, TierError,
    TierVerdict,
};
use tias_views::{collections, ViewError};

fn entity(key: i64, value: Value) -> Value {
    json!({ "Key": { "value": key }, "Value": value })
}

fn hab_ref(key: i64) -> Value {
    json!({ "value": key, "$type": collections::HAB })
}

/// Campaign with a lunar base (councilor aboard) and a fleet around Luna.
/// `with_mars` adds a staffed Martian base, a Martian fleet and enough
/// MissionControl for both tiers.
fn campaign(with_mars: bool) -> Vec<(String, Value)> {
    let mission_control = if with_mars { 30.0 } else { 5.0 };
    let mut councilors = vec![entity(100, json!({ "location": hab_ref(200) }))];
    let mut habs = vec![entity(
        200,
        json!({ "habType": "Base", "habSite": { "value": 400 }, "faction": { "value": 10 } }),
    )];
    let mut fleets = vec![entity(300, json!({ "orbitState": { "value": 600 } }))];
    let mut faction = json!({
        "displayName": "Resistance",
        "baseIncomes_year": { "MissionControl": mission_control },
        "councilors": [{ "value": 100 }],
        "fleets": [{ "value": 300 }],
        "controlPoints": [{ "value": 500 }],
        "habs": []
    });

    if with_mars {
        councilors.push(entity(101, json!({ "location": hab_ref(201) })));
        habs.push(entity(
            201,
            json!({ "habType": "Base", "habSite": { "value": 401 } }),
        ));
        fleets.push(entity(301, json!({ "orbitState": { "value": 601 } })));
        faction["councilors"] = json!([{ "value": 100 }, { "value": 101 }]);
        faction["fleets"] = json!([{ "value": 300 }, { "value": 301 }]);
        faction["habs"] = json!([{ "value": 201 }]);
    }

    vec![
        (
            collections::PLAYER.to_string(),
            json!([
                entity(1, json!({ "isAI": false, "faction": { "value": 10 } })),
                entity(2, json!({ "isAI": true, "faction": { "value": 20 } })),
            ]),
        ),
        (
            collections::FACTION.to_string(),
            json!([entity(10, faction), entity(20, json!({}))]),
        ),
        (collections::COUNCILOR.to_string(), Value::Array(councilors)),
        (collections::HAB.to_string(), Value::Array(habs)),
        (
            collections::HAB_SITE.to_string(),
            json!([
                entity(400, json!({ "parentBody": { "value": 700 } })),
                entity(401, json!({ "parentBody": { "value": 701 } })),
            ]),
        ),
        (
            collections::SPACE_BODY.to_string(),
            json!([
                entity(700, json!({ "displayName": "Luna" })),
                entity(701, json!({ "displayName": "Mars" })),
            ]),
        ),
        (collections::FLEET.to_string(), Value::Array(fleets)),
        (
            collections::ORBIT.to_string(),
            json!([
                entity(600, json!({ "barycenter": { "value": 700 } })),
                entity(601, json!({ "barycenter": { "value": 701 } })),
            ]),
        ),
        (
            collections::CONTROL_POINT.to_string(),
            json!([entity(500, json!({ "nation": { "value": 800 } }))]),
        ),
        (
            collections::NATION.to_string(),
            json!([
                entity(800, json!({ "federation": { "value": 50 } })),
                entity(801, json!({ "federation": { "value": 50 } })),
            ]),
        ),
        (
            collections::FEDERATION.to_string(),
            json!([entity(50, json!({ "members": [{ "value": 800 }, { "value": 801 }] }))]),
        ),
    ]
}

fn store(documents: Vec<(String, Value)>) -> SnapshotStore {
    SnapshotStore::in_memory(&Savegame::from_gamestates(documents)).expect("store")
}

fn date() -> GameDate {
    GameDate::parse("2027-8-1").expect("date")
}

#[test]
fn two_tier_two_conditions_unlock_tier_two_by_default() {
    let verdict = evaluate(&store(campaign(false)), &date(), &TierConfig::default()).unwrap();

    let tier2 = verdict.report(Tier::Two).unwrap();
    assert_eq!(tier2.met, 2);
    assert_eq!(tier2.conditions["lunar_base_councilor"], true);
    assert_eq!(tier2.conditions["lunar_fleet"], true);
    assert_eq!(tier2.conditions["mission_control_capacity"], false);
    assert_eq!(tier2.conditions["federation_member"], false);
    assert_eq!(verdict.report(Tier::Three).unwrap().met, 0);

    assert_eq!(verdict.current_tier, 2);
    assert!((verdict.readiness - 0.6).abs() < 1e-9);
    assert_eq!(verdict.stubs, vec!["alien_contact_analysed".to_string()]);
}

#[test]
fn raised_tier_two_bar_reports_partial_readiness() {
    let config = TierConfig {
        required_tier2: 5,
        ..TierConfig::default()
    };
    let verdict = evaluate(&store(campaign(false)), &date(), &config).unwrap();

    assert_eq!(verdict.current_tier, 1);
    assert!((verdict.readiness - 0.24).abs() < 1e-9);
    assert!(!verdict.report(Tier::Two).unwrap().unlocked);
}

#[test]
fn martian_presence_reaches_tier_three() {
    let verdict = evaluate(&store(campaign(true)), &date(), &TierConfig::default()).unwrap();

    let tier3 = verdict.report(Tier::Three).unwrap();
    assert_eq!(tier3.conditions["martian_base_councilor"], true);
    assert_eq!(tier3.conditions["martian_fleet"], true);
    assert_eq!(tier3.conditions["mission_control_network"], true);
    assert_eq!(tier3.conditions["alien_contact_analysed"], false);
    assert_eq!(tier3.met, 3);
    assert_eq!(verdict.current_tier, 3);
    assert!((verdict.readiness - 1.0).abs() < 1e-9);
}

#[test]
fn federation_conditions_count_real_members() {
    let mut documents = campaign(false);
    for (key, document) in &mut documents {
        if key == collections::NATION {
            *document = json!([
                entity(800, json!({ "federation": { "value": 50 } })),
                entity(801, json!({ "federation": { "value": 50 } })),
                entity(802, json!({ "federation": { "value": 50 } })),
                entity(803, json!({ "federation": { "value": 50 }, "aggregateNation": true })),
            ]);
        }
        if key == collections::FEDERATION {
            *document = json!([entity(50, json!({ "members": [
                { "value": 800 }, { "value": 801 }, { "value": 802 }, { "value": 803 }
            ] }))]);
        }
    }
    let verdict = evaluate(&store(documents), &date(), &TierConfig::default()).unwrap();
    assert_eq!(verdict.report(Tier::Two).unwrap().conditions["federation_member"], true);
    assert_eq!(verdict.report(Tier::Three).unwrap().conditions["great_federation"], false);
}

fn all_conditions(verdict: &TierVerdict) -> BTreeMap<String, bool> {
    verdict
        .tiers
        .values()
        .flat_map(|report| report.conditions.clone())
        .collect()
}

#[test]
fn removing_any_collection_only_falsifies_dependent_conditions() {
    const BASE_COUNCILORS: &[&str] = &["lunar_base_councilor", "martian_base_councilor"];
    const FLEETS: &[&str] = &["lunar_fleet", "martian_fleet"];
    const FEDERATIONS: &[&str] = &["federation_member", "great_federation"];
    const BODIES: &[&str] = &[
        "lunar_base_councilor",
        "martian_base_councilor",
        "lunar_fleet",
        "martian_fleet",
    ];

    let full = evaluate(&store(campaign(true)), &date(), &TierConfig::default()).unwrap();
    let full_conditions = all_conditions(&full);
    let every: Vec<&str> = full_conditions.keys().map(String::as_str).collect();

    let cases: [(&str, &[&str]); 10] = [
        (collections::FACTION, &every),
        (collections::COUNCILOR, BASE_COUNCILORS),
        (collections::HAB, BASE_COUNCILORS),
        (collections::HAB_SITE, BASE_COUNCILORS),
        (collections::SPACE_BODY, BODIES),
        (collections::FLEET, FLEETS),
        (collections::ORBIT, FLEETS),
        (collections::CONTROL_POINT, FEDERATIONS),
        (collections::NATION, FEDERATIONS),
        (collections::FEDERATION, FEDERATIONS),
    ];

    for (removed, dependent) in cases {
        let trimmed: Vec<_> = campaign(true)
            .into_iter()
            .filter(|(key, _)| key != removed)
            .collect();
        let verdict = evaluate(&store(trimmed), &date(), &TierConfig::default())
            .unwrap_or_else(|err| panic!("evaluation without {removed} failed: {err}"));

        for (name, met) in all_conditions(&verdict) {
            if dependent.contains(&name.as_str()) {
                assert!(!met, "{name} should be false without {removed}");
            } else {
                assert_eq!(met, full_conditions[&name], "{name} changed without {removed}");
            }
        }
        assert!(verdict.current_tier <= full.current_tier, "without {removed}");
        assert!(verdict.readiness <= full.readiness, "without {removed}");
    }
}

#[test]
fn unresolved_player_faction_degrades_to_tier_one() {
    let trimmed: Vec<_> = campaign(false)
        .into_iter()
        .filter(|(key, _)| key != collections::FACTION)
        .collect();
    let verdict = evaluate(&store(trimmed), &date(), &TierConfig::default()).unwrap();

    assert!(all_conditions(&verdict).values().all(|met| !met));
    assert_eq!(verdict.current_tier, 1);
    assert_eq!(verdict.readiness, 0.0);
}

#[test]
fn missing_human_player_is_reported_not_defaulted() {
    let trimmed: Vec<_> = campaign(false)
        .into_iter()
        .filter(|(key, _)| key != collections::PLAYER)
        .collect();
    let err = evaluate(&store(trimmed), &date(), &TierConfig::default()).unwrap_err();
    assert!(matches!(err, TierError::ViewError(ViewError::NoHumanPlayer)));
}

#[test]
fn unchanged_store_yields_identical_verdict_bytes() {
    let tmp = TempDir::new().unwrap();
    let date = date();
    let db = store_path(&tmp.path().join("build"), &date);
    SnapshotStore::rebuild(&db, &Savegame::from_gamestates(campaign(true)), None).unwrap();
    let path = verdict_path(&tmp.path().join("generated"), &date);

    let first = evaluate(&SnapshotStore::open(&db).unwrap(), &date, &TierConfig::default()).unwrap();
    write_verdict(&path, &first).unwrap();
    let first_bytes = std::fs::read(&path).unwrap();

    let second = evaluate(&SnapshotStore::open(&db).unwrap(), &date, &TierConfig::default()).unwrap();
    write_verdict(&path, &second).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), first_bytes);
    assert_eq!(read_current_tier(&tmp.path().join("generated"), &date), 3);
}
