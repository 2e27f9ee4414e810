//! End-to-end test: modification, accept and discard.
//!
//! A modification is a deletion followed by an insertion at the same index,
//! so even an identical notation yields a new rule with its own identity.

use diasim_hypothesis::{EngineState, HypothesisError};
use diasim_rules::sample::DARK_L;
use diasim_tests::{ids, rendered, sample_engine, sample_run, BASELINE_FINALS};
use diasim_types::{CompileError, EtymonId};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn modify_with_same_notation_splits_the_slot() {
    let (mut engine, lang) = sample_engine();
    engine
        .propose_modify(6, "t > ʔ / __ ə", &lang.compiler, "re-entered")
        .unwrap();
    assert_eq!(engine.hypothesis().len(), 11);
    assert_eq!(engine.hypothesis_stage_positions(), &[7, 8, 11]);
    assert_eq!(engine.change_log().outline(), vec![(6, false), (7, true)]);

    let report = engine.generate_comparison().unwrap();
    assert_eq!(report.timeline().len(), 12);
    assert_eq!(report.divergence_point(), Some(6));
    let changed: Vec<usize> = report
        .changed_slots()
        .iter()
        .enumerate()
        .filter_map(|(g, &c)| c.then_some(g))
        .collect();
    assert_eq!(changed, vec![6, 7]);

    let effects = report.changed_rule_effects();
    assert_eq!(
        effects[&6].gained.get(&EtymonId(1)).map(String::as_str),
        Some("#moltəd# > #molʔəd#")
    );
    assert_eq!(
        effects[&7].lost.get(&EtymonId(1)).map(String::as_str),
        Some("#moltəd# > #molʔəd#")
    );
}

#[test]
fn modified_rule_moves_the_middle_stage() {
    let (mut engine, lang) = sample_engine();
    engine
        .propose_modify(6, "t > ʔ / __ ə", &lang.compiler, "")
        .unwrap();
    let report = engine.generate_comparison().unwrap();

    // The new rule sits before the shifted Middle cut, the old one after it.
    assert_eq!(report.etyma_with_changed_derivations(), ids(&[1]));
    let expected = [
        "CONCORDANT UNTIL RULE: 6",
        "6[-1|6] : fed or inserted | #moltəd# > #molʔəd#",
        "7[6|-1] : #moltəd# > #molʔəd# | bled or deleted",
        "Waypoint 1 Gold: #moltəd# | #molʔəd#",
        "Waypoint 2 Black: #molʔəd# | #molʔəd#",
        "Waypoint 3 Gold: #molʔəd# | #molʔəd#",
        "Final forms: #molʔəd# | #molʔəd#",
    ]
    .join("\n");
    assert_eq!(report.differential_derivation(EtymonId(1)), expected);
    assert_eq!(report.final_distance(EtymonId(1)), Some(0.0));
}

#[test]
fn failed_compile_leaves_engine_untouched() {
    let (mut engine, lang) = sample_engine();
    let err = engine
        .propose_modify(2, "s > ʃ", &lang.compiler, "")
        .unwrap_err();
    assert_eq!(
        err,
        HypothesisError::Compile(CompileError::Unrecognised("s > ʃ".into()))
    );
    assert_eq!(engine.state(), EngineState::Clean);
    assert!(engine.index_map().is_identity());
}

#[test]
fn accept_without_edits_reproduces_baseline() {
    let (mut engine, _) = sample_engine();
    let before = engine.generate_comparison().unwrap();
    engine.accept().unwrap();
    let after = engine.generate_comparison().unwrap();

    assert_eq!(
        after.baseline().current_result(),
        before.baseline().current_result()
    );
    assert_eq!(
        after.baseline().current_result(),
        sample_run().current_result()
    );
    assert_eq!(rendered(&after.hypothesis().current_result()), BASELINE_FINALS);
}

#[test]
fn accept_then_compare_is_quiet() {
    let (mut engine, lang) = sample_engine();
    engine.propose_insert(0, DARK_L, &lang.compiler, "").unwrap();
    engine.accept().unwrap();
    assert_eq!(engine.state(), EngineState::Clean);
    assert_eq!(engine.baseline().len(), 12);
    assert_eq!(engine.baseline_stages().positions(), vec![7, 9, 12]);

    let report = engine.generate_comparison().unwrap();
    assert_eq!(report.divergence_point(), None);
    assert!(report.changed_slots().iter().all(|c| !c));
    assert!(report.etyma_with_changed_derivations().is_empty());
    assert_eq!(
        report.baseline().current_form(EtymonId(1)).unwrap().to_string(),
        "#moɫʔəd#"
    );
}

#[test]
fn discard_returns_to_clean() {
    let (mut engine, lang) = sample_engine();
    engine.propose_insert(3, DARK_L, &lang.compiler, "").unwrap();
    engine
        .propose_modify(0, "t > ɾ / [+syl] __ ə", &lang.compiler, "")
        .unwrap();
    assert_eq!(engine.edit_count(), 2);
    engine.discard();
    assert_eq!(engine.state(), EngineState::Clean);
    assert_eq!(engine.hypothesis().len(), 11);
    assert!(engine.change_log().is_empty());

    let report = engine.generate_comparison().unwrap();
    assert_eq!(report.divergence_point(), None);
    assert_eq!(rendered(&report.hypothesis().current_result()), BASELINE_FINALS);
}
