// tests/stage_table.rs
use idle_accrual::error::ConfigError;
use idle_accrual::systems::stage_table::{DEFAULT_MAX_STAGE, StageBand, StageTable};

#[test]
fn default_table_matches_reference_curve() {
    let t = StageTable::default();
    assert_eq!(t.bands().len(), 5 + 19);
    assert_eq!(t.bands().last().map(|b| b.end_stage), Some(1000));
    assert_eq!(t.lookup(1), 1.6);
    assert_eq!(t.lookup(10), 1.6);
    assert_eq!(t.lookup(11), 1.4);
    assert_eq!(t.lookup(50), 1.05);
    assert_eq!(t.lookup(51), 1.001);
}

#[test]
fn lookup_past_last_band_fails_open() {
    let t =
        StageTable::new(1.0, vec![StageBand::new(1, 3, 2.0), StageBand::new(4, 5, 1.5)]).unwrap();
    assert_eq!(t.lookup(6), 1.5);
    assert_eq!(t.lookup(10_000), 1.5);
    assert_eq!(t.lookup(0), 1.5);
}

#[test]
fn stage_is_clamped() {
    let t = StageTable::with_max_stage(1.0, vec![StageBand::new(1, 10, 1.1)], 10).unwrap();
    assert_eq!(t.stage_for(0), 1);
    assert_eq!(t.stage_for(8), 9);
    assert_eq!(t.stage_for(9), 10);
    assert_eq!(t.stage_for(u64::MAX), 10);
}

#[test]
fn rejects_invalid_tables() {
    assert!(matches!(
        StageTable::new(0.0, vec![StageBand::new(1, 2, 1.1)]),
        Err(ConfigError::BaseValue(_))
    ));
    assert!(matches!(StageTable::new(0.5, vec![]), Err(ConfigError::NoBands)));
    assert!(matches!(
        StageTable::new(0.5, vec![StageBand::new(5, 2, 1.1)]),
        Err(ConfigError::BandRange { index: 0, .. })
    ));
    assert!(matches!(
        StageTable::new(0.5, vec![StageBand::new(1, 2, 1.1), StageBand::new(3, 4, 0.0)]),
        Err(ConfigError::Multiplier { index: 1, .. })
    ));
}

#[test]
fn json_uses_source_field_names() {
    let t = StageTable::from_json(r#"{"v1":0.5,"blocks":[{"start":1,"end":10,"r":1.6}]}"#).unwrap();
    assert_eq!(t.base_value(), 0.5);
    assert_eq!(t.max_stage(), DEFAULT_MAX_STAGE);
    let back = serde_json::to_value(&t).unwrap();
    assert_eq!(back["blocks"][0]["r"], 1.6);
    assert_eq!(back["maxStage"], 1000);

    assert!(StageTable::from_json(r#"{"v1":0.5,"blocks":[]}"#).is_err());
    assert!(StageTable::from_json(r#"{"blocks":[{"start":1,"end":2,"r":1.1}]}"#).is_err());
}
