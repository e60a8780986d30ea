//! Tests for distribution resolution and hierarchy-gated grants

use super::*;
use crate::config::{CycleCheck, EngineConfig};
use crate::error::PolicyError;
use crate::location::{Catalog, Location, LocationTree};
use crate::permission::{PermissionSet, RuleKind};
use std::sync::Arc;
use test_case::test_case;

fn loc(text: &str) -> Location {
    Location::parse(text).unwrap()
}

fn catalog() -> Arc<Catalog> {
    let places = [
        loc("TORONTO,ONTARIO,CANADA"),
        loc("OTTAWA,ONTARIO,CANADA"),
        loc("MONTREAL,QUEBEC,CANADA"),
        loc("AUSTIN,TX,US"),
        loc("DALLAS,TX,US"),
        loc("FRESNO,CA,US"),
    ];
    Arc::new(Catalog::from_locations(places.iter()))
}

fn engine() -> PolicyEngine {
    PolicyEngine::new(catalog(), EngineConfig::default())
}

/// include = {"US": {}}
fn country_grant() -> PermissionSet {
    let include: LocationTree = [loc("US")].iter().collect();
    PermissionSet::from_trees(include, LocationTree::new())
}

/// include = {"US": {"TX": {"AUSTIN"}}}
fn city_grant() -> PermissionSet {
    let mut perms = PermissionSet::new();
    perms.add(RuleKind::Include, &loc("AUSTIN,TX,US")).unwrap();
    perms
}

#[test_case("US", true, DecisionReason::CountryIncluded ; "country")]
#[test_case("TX,US", true, DecisionReason::InheritedFromCountry ; "province")]
#[test_case("AUSTIN,TX,US", true, DecisionReason::InheritedFromCountry ; "city")]
#[test_case("CANADA", false, DecisionReason::CountryNotIncluded ; "other country")]
fn test_country_grant_without_provinces(text: &str, allowed: bool, reason: DecisionReason) {
    let decision = resolve(&country_grant(), &loc(text));
    assert_eq!(decision.allowed, allowed);
    assert_eq!(decision.reason, reason);
}

#[test_case("DALLAS,TX,US", false, DecisionReason::CityNotIncluded ; "unlisted city in scoped province")]
#[test_case("AUSTIN,TX,US", true, DecisionReason::CityIncluded ; "listed city")]
#[test_case("TX,US", true, DecisionReason::ProvinceIncluded ; "scoped province")]
#[test_case("CA,US", true, DecisionReason::InheritedFromCountry ; "untouched province")]
#[test_case("FRESNO,CA,US", true, DecisionReason::InheritedFromCountry ; "city in untouched province")]
#[test_case("US", true, DecisionReason::CountryIncluded ; "country")]
#[test_case("MEXICO", false, DecisionReason::CountryNotIncluded ; "absent country")]
fn test_city_grant(text: &str, allowed: bool, reason: DecisionReason) {
    let decision = resolve(&city_grant(), &loc(text));
    assert_eq!(decision.allowed, allowed);
    assert_eq!(decision.reason, reason);
}

#[test]
fn test_exclude_wins_over_include() {
    let mut perms = city_grant();
    perms.add(RuleKind::Exclude, &loc("AUSTIN,TX,US")).unwrap();

    let decision = resolve(&perms, &loc("AUSTIN,TX,US"));
    assert!(!decision.allowed);
    assert_eq!(decision.reason, DecisionReason::Excluded);
}

#[test]
fn test_exclude_only_blocks_its_granularity() {
    let include: LocationTree = [loc("US")].iter().collect();
    let exclude: LocationTree = [loc("AUSTIN,TX,US")].iter().collect();
    let perms = PermissionSet::from_trees(include, exclude);

    assert!(!resolve(&perms, &loc("AUSTIN,TX,US")).allowed);
    assert!(resolve(&perms, &loc("TX,US")).allowed);
    assert!(resolve(&perms, &loc("US")).allowed);
    assert!(resolve(&perms, &loc("DALLAS,TX,US")).allowed);
}

#[test]
fn test_empty_permissions_deny() {
    let perms = PermissionSet::new();
    assert_eq!(
        resolve(&perms, &loc("US")).reason,
        DecisionReason::CountryNotIncluded
    );
}

#[test]
fn test_grant_include_without_parent() {
    let mut engine = engine();
    engine.add_distributor("A").unwrap();

    let outcome = engine.grant_include("A", "toronto, ontario, canada", false).unwrap();
    assert_eq!(outcome, GrantOutcome::Added);
    assert!(engine.includes("A", &loc("TORONTO,ONTARIO,CANADA")).unwrap());

    let again = engine.grant_include("A", "TORONTO,ONTARIO,CANADA", false).unwrap();
    assert_eq!(again, GrantOutcome::AlreadyPresent);
}

#[test]
fn test_grant_rejects_unknown_place() {
    let mut engine = engine();
    engine.add_distributor("A").unwrap();

    let result = engine.grant_include("A", "VANCOUVER,BRITISH COLUMBIA,CANADA", false);
    assert!(matches!(result, Err(PolicyError::InvalidLocation { .. })));
    assert!(engine.permissions("A").unwrap().is_empty());
}

#[test]
fn test_grant_rejects_partial_location() {
    let mut engine = engine();
    engine.add_distributor("A").unwrap();

    for text in ["CANADA", "ONTARIO,CANADA"] {
        let result = engine.grant_exclude("A", text, false);
        assert!(matches!(result, Err(PolicyError::InvalidLocation { .. })));
    }
}

#[test]
fn test_grant_unknown_distributor() {
    let mut engine = engine();
    let result = engine.grant_include("GHOST", "AUSTIN,TX,US", false);
    assert!(matches!(result, Err(PolicyError::NotFound { .. })));
}

#[test]
fn test_grant_move_requires_confirmation() {
    let mut engine = engine();
    engine.add_distributor("A").unwrap();
    engine.grant_exclude("A", "AUSTIN,TX,US", false).unwrap();

    let outcome = engine.grant_include("A", "AUSTIN,TX,US", false).unwrap();
    assert_eq!(
        outcome,
        GrantOutcome::ConfirmationRequired {
            existing: RuleKind::Exclude
        }
    );
    assert!(engine.excludes("A", &loc("AUSTIN,TX,US")).unwrap());
    assert!(!engine.includes("A", &loc("AUSTIN,TX,US")).unwrap());

    let outcome = engine.grant_include("A", "AUSTIN,TX,US", true).unwrap();
    assert_eq!(
        outcome,
        GrantOutcome::Moved {
            from: RuleKind::Exclude
        }
    );
    assert!(!engine.excludes("A", &loc("AUSTIN,TX,US")).unwrap());
    assert!(engine.includes("A", &loc("AUSTIN,TX,US")).unwrap());
    assert!(engine.permissions("A").unwrap().tree(RuleKind::Exclude).is_empty());
}

#[test]
fn test_grant_exclude_moves_from_include() {
    let mut engine = engine();
    engine.add_distributor("A").unwrap();
    engine.grant_include("A", "DALLAS,TX,US", false).unwrap();

    let outcome = engine.grant_exclude("A", "DALLAS,TX,US", true).unwrap();
    assert_eq!(
        outcome,
        GrantOutcome::Moved {
            from: RuleKind::Include
        }
    );
    assert!(!engine.can_distribute("A", &loc("DALLAS,TX,US")).unwrap());
}

#[test]
fn test_parent_gate_rejects_include() {
    let mut engine = engine();
    engine.add_distributor("PARENT").unwrap();
    engine.add_distributor("CHILD").unwrap();
    engine.link("CHILD", "PARENT").unwrap();
    engine.grant_include("PARENT", "TORONTO,ONTARIO,CANADA", false).unwrap();

    let outcome = engine.grant_include("CHILD", "OTTAWA,ONTARIO,CANADA", false).unwrap();
    assert_eq!(
        outcome,
        GrantOutcome::RejectedByParent {
            parent: "PARENT".to_string()
        }
    );
    assert!(!engine.includes("CHILD", &loc("OTTAWA,ONTARIO,CANADA")).unwrap());

    let outcome = engine.grant_include("CHILD", "TORONTO,ONTARIO,CANADA", false).unwrap();
    assert_eq!(outcome, GrantOutcome::Added);
}

#[test]
fn test_parent_gate_applies_to_exclude() {
    let mut engine = engine();
    engine.add_distributor("PARENT").unwrap();
    engine.add_distributor("CHILD").unwrap();
    engine.link("CHILD", "PARENT").unwrap();

    let outcome = engine.grant_exclude("CHILD", "AUSTIN,TX,US", false).unwrap();
    assert!(matches!(outcome, GrantOutcome::RejectedByParent { .. }));
    assert!(engine.permissions("CHILD").unwrap().is_empty());

    engine.grant_include("PARENT", "AUSTIN,TX,US", false).unwrap();
    let outcome = engine.grant_exclude("CHILD", "AUSTIN,TX,US", false).unwrap();
    assert_eq!(outcome, GrantOutcome::Added);
}

#[test]
fn test_parent_gate_only_checks_immediate_parent() {
    let mut engine = engine();
    for name in ["ROOT", "MID", "LEAF"] {
        engine.add_distributor(name).unwrap();
    }
    engine.link("MID", "ROOT").unwrap();
    engine.link("LEAF", "MID").unwrap();
    engine.grant_include("ROOT", "AUSTIN,TX,US", false).unwrap();

    let outcome = engine.grant_include("LEAF", "AUSTIN,TX,US", false).unwrap();
    assert!(matches!(outcome, GrantOutcome::RejectedByParent { parent } if parent == "MID"));
}

#[test]
fn test_rejected_move_still_removes_conflict() {
    let mut engine = engine();
    engine.add_distributor("PARENT").unwrap();
    engine.add_distributor("CHILD").unwrap();
    engine.link("CHILD", "PARENT").unwrap();
    engine.grant_include("PARENT", "AUSTIN,TX,US", false).unwrap();
    engine.grant_include("CHILD", "AUSTIN,TX,US", false).unwrap();

    engine.wipe_permissions("PARENT", RuleKind::Include).unwrap();
    let outcome = engine.grant_exclude("CHILD", "AUSTIN,TX,US", true).unwrap();

    assert!(matches!(outcome, GrantOutcome::RejectedByParent { .. }));
    assert!(!engine.includes("CHILD", &loc("AUSTIN,TX,US")).unwrap());
    assert!(!engine.excludes("CHILD", &loc("AUSTIN,TX,US")).unwrap());
}

#[test]
fn test_link_rejects_child_with_permissions() {
    let mut engine = engine();
    engine.add_distributor("PARENT").unwrap();
    engine.add_distributor("CHILD").unwrap();
    engine.grant_exclude("CHILD", "FRESNO,CA,US", false).unwrap();

    assert!(matches!(
        engine.link("CHILD", "PARENT"),
        Err(PolicyError::NonEmptyPermissions { .. })
    ));

    engine.wipe_permissions("CHILD", RuleKind::Exclude).unwrap();
    engine.link("CHILD", "PARENT").unwrap();
}

#[test]
fn test_one_hop_config() {
    let config = EngineConfig {
        cycle_check: CycleCheck::OneHop,
        ..EngineConfig::default()
    };
    let mut engine = PolicyEngine::new(catalog(), config);
    for name in ["A", "B", "C"] {
        engine.add_distributor(name).unwrap();
    }
    engine.link("B", "A").unwrap();
    engine.link("C", "B").unwrap();
    assert!(engine.link("A", "C").is_ok());

    let mut engine = PolicyEngine::new(catalog(), EngineConfig::default());
    for name in ["A", "B", "C"] {
        engine.add_distributor(name).unwrap();
    }
    engine.link("B", "A").unwrap();
    engine.link("C", "B").unwrap();
    assert!(matches!(
        engine.link("A", "C"),
        Err(PolicyError::CycleDetected { .. })
    ));
}

#[test]
fn test_unlink_outcomes() {
    let mut engine = engine();
    engine.add_distributor("PARENT").unwrap();
    engine.add_distributor("CHILD").unwrap();
    engine.link("CHILD", "PARENT").unwrap();

    assert_eq!(
        engine.unlink("CHILD").unwrap(),
        UnlinkOutcome::Unlinked {
            parent: "PARENT".to_string()
        }
    );
    assert_eq!(engine.unlink("CHILD").unwrap(), UnlinkOutcome::AlreadyOrphan);
}

#[test]
fn test_can_distribute_unknown_distributor() {
    let engine = engine();
    assert!(matches!(
        engine.can_distribute("GHOST", &loc("US")),
        Err(PolicyError::NotFound { .. })
    ));
}

#[test]
fn test_end_to_end_canada() {
    let mut engine = engine();
    engine.add_distributor("A").unwrap();

    let outcome = engine.grant_include("A", "TORONTO,ONTARIO,CANADA", false).unwrap();
    assert_eq!(outcome, GrantOutcome::Added);

    assert!(engine.can_distribute("A", &loc("CANADA")).unwrap());
    // QUEBEC was never scoped, so the country grant covers it.
    assert!(engine.can_distribute("A", &loc("QUEBEC,CANADA")).unwrap());
    assert!(engine.can_distribute("A", &loc("ONTARIO,CANADA")).unwrap());
    assert!(!engine.can_distribute("A", &loc("OTTAWA,ONTARIO,CANADA")).unwrap());
}
