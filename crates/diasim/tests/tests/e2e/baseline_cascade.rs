//! End-to-end test: the sample cascade run on its own.
//!
//! Covers stage walking, snapshots, scoring against gold references and the
//! empty-cascade identity.

use diasim_metric::{evaluate_stage, FeatureEditDistance};
use diasim_simulator::{Simulation, SimulationConfig};
use diasim_tests::{ids, rendered, sample, sample_run, BASELINE_FINALS};
use diasim_types::{Cascade, EtymonId, Stage, Stages};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn full_run_produces_expected_finals() {
    let sim = sample_run();
    assert!(sim.is_complete());
    assert_eq!(rendered(&sim.current_result()), BASELINE_FINALS);
}

#[test]
fn stage_snapshots_are_consistent_cuts() {
    let sim = sample_run();
    let middle = rendered(sim.result_at(0).unwrap());
    assert_eq!(middle[2], "#buɾ#");
    assert_eq!(middle[3], "#ken#");
    assert_eq!(middle[5], "#sempom#");
    let late = rendered(sim.result_at(1).unwrap());
    assert_eq!(late[1], "#molʔəd#");
    assert_eq!(late[3], "#kin#");
    assert_eq!(late[9], "#doɾ#");
}

#[test]
fn walking_stage_by_stage() {
    let lang = sample();
    let mut sim = Simulation::with_config(
        lang.lexicon,
        lang.cascade,
        lang.stages,
        SimulationConfig::sequential(),
    )
    .unwrap();

    let mut visited = Vec::new();
    let mut was_complete = false;
    while let Some(stage) = sim.run_to_next_stage() {
        assert!(!was_complete, "completion must be permanent");
        was_complete = sim.is_complete();
        visited.push((
            stage,
            sim.position(),
            sim.just_hit_gold_stage(),
            sim.just_hit_black_stage(),
        ));
    }
    assert_eq!(
        visited,
        vec![(0, 6, true, false), (1, 8, false, true), (2, 11, true, false)]
    );
    assert!(sim.is_complete());
}

#[test]
fn modern_accuracy_misses_dark_l() {
    let sim = sample_run();
    let modern = sim.stages().get(2).unwrap();
    let report = evaluate_stage(
        modern,
        sim.result_at(2).unwrap(),
        &FeatureEditDistance::default(),
    )
    .unwrap();
    assert_eq!(report.comparable_count(), 9);
    assert!((report.accuracy().unwrap() - 8.0 / 9.0).abs() < 1e-9);
    assert_eq!(report.mismatches(), ids(&[1]));
}

#[test]
fn empty_cascade_is_identity() {
    let lang = sample();
    let stages = Stages::new()
        .with_stage(Stage::gold("Input", 0, lang.lexicon.clone()))
        .unwrap();
    let sim = Simulation::new(lang.lexicon.clone(), Cascade::default(), stages).unwrap();
    assert!(sim.is_complete());
    assert_eq!(sim.current_result(), lang.lexicon);

    let fed = FeatureEditDistance::default();
    let report = evaluate_stage(sim.stages().get(0).unwrap(), &sim.current_result(), &fed).unwrap();
    assert_eq!(report.accuracy(), Some(1.0));
    assert_eq!(report.average_feature_distance(), Some(0.0));
}

#[test]
fn rule_effects_and_trace() {
    let sim = sample_run();
    let effects = sim.rule_effects(8);
    let touched: Vec<EtymonId> = effects.iter().map(|(id, _)| *id).collect();
    assert_eq!(touched, ids(&[2, 9]));

    let trace = sim.derivation_text(EtymonId(9)).unwrap();
    assert!(trace.starts_with("/dodə/"));
    assert!(trace.contains("#doɾə# | 1 : d > ɾ / [+syl] __ ə"));
    assert!(trace.ends_with("Final form : #dor#"));
}

#[test]
fn prefix_run_stops_early() {
    let lang = sample();
    let partial = Simulation::run_prefix(&lang.lexicon, &lang.cascade, 4).unwrap();
    let forms = rendered(&partial);
    assert_eq!(forms[2], "#buɾ#");
    assert_eq!(forms[9], "#doɾ#");
    assert_eq!(forms[3], "#ken#");
}
