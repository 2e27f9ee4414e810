//! End-to-end test: inserting a rule at the head of the cascade.

use diasim_hypothesis::{EngineState, Side};
use diasim_rules::sample::DARK_L;
use diasim_tests::{ids, sample_engine};
use diasim_types::EtymonId;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn insertion_maps_and_correspondences() {
    let (mut engine, lang) = sample_engine();
    engine
        .propose_insert(0, DARK_L, &lang.compiler, "velarization before consonants")
        .unwrap();
    assert_eq!(engine.state(), EngineState::Dirty);
    assert_eq!(engine.hypothesis().len(), 12);

    let map = engine.index_map();
    assert_eq!(map.hyp_of(2), Some(3));
    assert_eq!(map.base_of(2), Some(1));

    let report = engine.generate_comparison().unwrap();
    let (base_row, hyp_row) = report.rule_correspondences();
    let mut expected_base = vec![None];
    expected_base.extend((0..11).map(Some));
    assert_eq!(base_row, expected_base);
    assert_eq!(hyp_row, (0..12).map(Some).collect::<Vec<_>>());
    assert_eq!(report.divergence_point(), Some(0));
}

#[test]
fn insertion_differential_derivation() {
    let (mut engine, lang) = sample_engine();
    engine.propose_insert(0, DARK_L, &lang.compiler, "").unwrap();
    let report = engine.generate_comparison().unwrap();

    assert_eq!(report.etyma_with_changed_derivations(), ids(&[1]));
    let expected = [
        "CONCORDANT UNTIL RULE: 0",
        "0[-1|0] : fed or inserted | #moltəd# > #moɫtəd#",
        "Waypoint 1 Gold: #moltəd# | #moɫtəd#",
        "7[6|7] : #moltəd# > #molʔəd# | #moɫtəd# > #moɫʔəd#",
        "Waypoint 2 Black: #molʔəd# | #moɫʔəd#",
        "Waypoint 3 Gold: #molʔəd# | #moɫʔəd#",
        "Final forms: #molʔəd# | #moɫʔəd#",
    ]
    .join("\n");
    assert_eq!(report.differential_derivation(EtymonId(1)), expected);
    assert_eq!(report.differential_derivation(EtymonId(0)), "");
    assert_eq!(report.differential_derivation(EtymonId(8)), "");
}

#[test]
fn insertion_rule_effects() {
    let (mut engine, lang) = sample_engine();
    engine.propose_insert(0, DARK_L, &lang.compiler, "").unwrap();
    let report = engine.generate_comparison().unwrap();

    let effects = report.changed_rule_effects();
    assert_eq!(effects.keys().copied().collect::<Vec<_>>(), vec![0]);
    assert_eq!(
        effects[&0].gained.get(&EtymonId(1)).map(String::as_str),
        Some("#moltəd# > #moɫtəd#")
    );
    assert!(effects[&0].lost.is_empty());
    assert_eq!(report.effects_blocked(0), 0);
    assert_eq!(report.hyp_indices_to_global()[0], 0);
    assert_eq!(report.base_indices_to_global()[0], 1);
}

#[test]
fn insertion_fixes_gold_stages() {
    let (mut engine, lang) = sample_engine();
    engine.propose_insert(0, DARK_L, &lang.compiler, "").unwrap();
    let report = engine.generate_comparison().unwrap();
    for stage in [0, 2] {
        let delta = report.accuracy_at(stage).unwrap();
        assert_eq!(delta.fixed(), ids(&[1]), "stage {}", delta.stage);
        assert_eq!(delta.hypothesis.accuracy(), Some(1.0));
    }
    let trace = report
        .globalized_derivation(EtymonId(1), Side::Hypothesis)
        .unwrap();
    assert!(trace.contains("| 0 : l > ɫ / __ [+cons]"));
}
