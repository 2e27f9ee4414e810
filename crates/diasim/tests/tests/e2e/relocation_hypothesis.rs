//! End-to-end test: moving a rule later in the cascade.

use diasim_hypothesis::Edit;
use diasim_tests::{ids, sample_engine};
use diasim_types::EtymonId;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn relocation_correspondences() {
    let (mut engine, _) = sample_engine();
    engine.apply(Edit::relocate(1, 6), "flap after apocope").unwrap();
    assert_eq!(engine.hypothesis().len(), 11);
    assert_eq!(engine.hypothesis_stage_positions(), &[5, 8, 11]);

    let report = engine.generate_comparison().unwrap();
    let (base_row, hyp_row) = report.rule_correspondences();
    assert_eq!(base_row, (0..11).map(Some).collect::<Vec<_>>());
    assert_eq!(hyp_row[1], Some(6));
    assert_eq!(
        hyp_row,
        [0, 6, 1, 2, 3, 4, 5, 7, 8, 9, 10].map(Some).to_vec()
    );
    assert_eq!(report.divergence_point(), Some(1));
    assert_eq!(
        report.changed_slots().iter().position(|&c| c),
        Some(1)
    );
}

#[test]
fn relocation_differential_derivation() {
    let (mut engine, _) = sample_engine();
    engine.apply(Edit::relocate(1, 6), "").unwrap();
    let report = engine.generate_comparison().unwrap();

    assert_eq!(report.etyma_with_changed_derivations(), ids(&[9]));
    let expected = [
        "CONCORDANT UNTIL RULE: 1",
        "1[1|-1] : #dodə# > #doɾə# | bled or deleted",
        "3[3|2] : #doɾə# > #doɾ# | #dodə# > #dod#",
        "Waypoint 1 Gold: #doɾ# | #dod#",
        "Waypoint 2 Black: #doɾ# | #dod#",
        "8[8|8] : #doɾ# > #dor# | bled or deleted",
        "Waypoint 3 Gold: #dor# | #dod#",
        "Final forms: #dor# | #dod#",
    ]
    .join("\n");
    assert_eq!(report.differential_derivation(EtymonId(9)), expected);
}

#[test]
fn relocation_bleeds_and_blocks() {
    let (mut engine, _) = sample_engine();
    engine.apply(Edit::relocate(1, 6), "").unwrap();
    let report = engine.generate_comparison().unwrap();

    let effects = report.changed_rule_effects();
    assert_eq!(effects.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(
        effects[&1].lost.get(&EtymonId(9)).map(String::as_str),
        Some("#dodə# > #doɾə#")
    );
    assert_eq!(report.effects_blocked(1), 1);
    assert!(report.final_distance(EtymonId(9)).unwrap() > 0.0);
}

#[test]
fn relocation_earlier_in_the_cascade() {
    let (mut engine, _) = sample_engine();
    engine.apply(Edit::relocate(6, 0), "glottal stop first").unwrap();
    assert_eq!(engine.hypothesis_stage_positions(), &[7, 8, 11]);

    let report = engine.generate_comparison().unwrap();
    let (_, hyp_row) = report.rule_correspondences();
    assert_eq!(hyp_row[6], Some(0));
    assert_eq!(report.divergence_point(), Some(0));
    assert_eq!(report.etyma_with_changed_derivations(), ids(&[0, 2]));

    let derivation = report.differential_derivation(EtymonId(2));
    assert!(derivation.starts_with(
        "CONCORDANT UNTIL RULE: 0\n6[-1|0] : fed or inserted | #butə# > #buʔə#\n\
         0[0|1] : #butə# > #buɾə# | bled or deleted"
    ));
    assert!(derivation.contains("8[8|8] : #buɾ# > #bur# | bled or deleted"));
    assert_eq!(report.effects_blocked(6), 2);

    let logged: Vec<usize> = engine.change_log().iter().map(|c| c.position).collect();
    assert_eq!(logged, vec![6, 6]);
    assert!(report.changed_slots()[6]);
}

#[test]
fn relocating_back_restores_results() {
    let (mut engine, _) = sample_engine();
    engine.apply(Edit::relocate(1, 6), "").unwrap();
    engine.apply(Edit::relocate(6, 1), "").unwrap();
    assert!(engine.index_map().is_identity());

    let report = engine.generate_comparison().unwrap();
    assert_eq!(report.divergence_point(), Some(1));
    assert!(report.etyma_with_changed_derivations().is_empty());
    assert!(report.changed_rule_effects().is_empty());
    assert_eq!(
        report.baseline().current_result(),
        report.hypothesis().current_result()
    );
}
