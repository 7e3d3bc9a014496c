use roguesim::data::catalog::CatalogError;
use roguesim::data::validate::{validate_catalog, ValidationSeverity};
use roguesim::{ReputationRank, TierCatalog};

#[test]
fn builtin_catalog_has_four_ordered_tiers() {
    let catalog = TierCatalog::builtin().expect("built-in catalog should load");
    let ids: Vec<&str> = catalog.tiers().iter().map(|tier| tier.id.as_str()).collect();
    assert_eq!(ids, ["INITIATE", "OPERATIVE", "VETERAN", "ELITE"]);

    let gates: Vec<(i32, ReputationRank)> = catalog
        .tiers()
        .iter()
        .map(|tier| (tier.unlock.min_level, tier.unlock.min_reputation))
        .collect();
    assert!(gates.windows(2).all(|pair| pair[0] <= pair[1]), "{gates:?}");
}

#[test]
fn builtin_catalog_validates_without_findings_above_info() {
    let catalog = TierCatalog::builtin().expect("built-in catalog should load");
    let report = validate_catalog(catalog);
    assert_eq!(report.count(ValidationSeverity::Error), 0);
    assert_eq!(report.count(ValidationSeverity::Warning), 0);
}

#[test]
fn every_tier_offers_a_repeatable_blueprint() {
    let catalog = TierCatalog::builtin().expect("built-in catalog should load");
    for tier in catalog.tiers() {
        assert!(
            tier.missions.iter().any(|bp| bp.repeatable),
            "{} has no repeatable mission",
            tier.id
        );
    }
}

#[test]
fn find_blueprint_ignores_case() {
    let catalog = TierCatalog::builtin().expect("built-in catalog should load");
    let (tier, blueprint) = catalog
        .find_blueprint("ELITE_QUANTUM_VAULT")
        .expect("blueprint should exist");
    assert_eq!(tier.id, "ELITE");
    assert_eq!(blueprint.rewards.unlocks, ["aegis_master_key"]);
}

#[test]
fn empty_catalog_is_rejected() {
    match TierCatalog::from_yaml_str("tiers: []") {
        Err(CatalogError::Empty) => {}
        other => panic!("expected empty catalog error, got {other:?}"),
    }
}

#[test]
fn tier_without_missions_is_rejected() {
    let raw = r#"
tiers:
  - id: HOLLOW
    label: Hollow
    unlock: { min_level: 1, min_reputation: NOVICE }
    missions: []
"#;
    match TierCatalog::from_yaml_str(raw) {
        Err(CatalogError::EmptyTier(id)) => assert_eq!(id, "HOLLOW"),
        other => panic!("expected empty tier error, got {other:?}"),
    }
}

#[test]
fn unknown_reputation_labels_in_yaml_normalize() {
    let raw = r#"
tiers:
  - id: ODD
    label: Odd
    unlock: { min_level: 2, min_reputation: legendary }
    missions:
      - { id: odd_job, title: o, synopsis: o, target: o, recommended_level: 2, difficulty: 3, rewards: { credits: 1, reputation: 1 } }
"#;
    let catalog = TierCatalog::from_yaml_str(raw).expect("catalog should parse");
    assert_eq!(catalog.first_tier().unlock.min_reputation, ReputationRank::Legend);
}
