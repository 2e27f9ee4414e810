//! Property tests: arbitrary edit sequences against the sample language.
//!
//! Whatever the edits, the engine keeps its bookkeeping consistent, the
//! comparison accounts for every rule, and accepting leaves nothing to report.

use std::collections::BTreeSet;

use diasim_hypothesis::{DifferentialReport, Edit, EngineState, HypothesisEngine};
use diasim_rules::sample::SampleLanguage;
use diasim_simulator::{DerivationStep, Simulation, SimulationConfig};
use diasim_tests::{sample, sample_engine};
use diasim_types::{RuleCompiler, Stages};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_seeds() -> impl Strategy<Value = Vec<(u8, usize, usize)>> {
    prop::collection::vec((0u8..4, any::<usize>(), any::<usize>()), 1..6)
}

/// Turn a seed into an edit that is valid for the current hypothesis.
fn concretize(engine: &HypothesisEngine, lang: &SampleLanguage, (kind, a, b): (u8, usize, usize)) -> Option<Edit> {
    let len = engine.hypothesis().len();
    let notations: Vec<&str> = lang.compiler.notations().collect();
    let compile = |i: usize| lang.compiler.compile(notations[i % notations.len()]).ok();
    match kind {
        0 => Some(Edit::Insert {
            position: a % (len + 1),
            rules: compile(b)?,
        }),
        1 if len > 0 => Some(Edit::delete(a % len)),
        2 if len > 1 => {
            let from = a % len;
            let to = b % len;
            (from != to).then_some(Edit::relocate(from, to))
        }
        3 if len > 0 => Some(Edit::Modify {
            position: a % len,
            rules: compile(b)?,
        }),
        _ => None,
    }
}

fn edited_engine(seeds: Vec<(u8, usize, usize)>) -> HypothesisEngine {
    let (mut engine, lang) = sample_engine();
    for seed in seeds {
        if let Some(edit) = concretize(&engine, &lang, seed) {
            engine.apply(edit, "generated").unwrap();
        }
    }
    engine
}

fn changed_slots(report: &DifferentialReport) -> BTreeSet<usize> {
    report
        .changed_slots()
        .iter()
        .enumerate()
        .filter(|(_, &c)| c)
        .map(|(g, _)| g)
        .collect()
}

fn effect(step: Option<&DerivationStep>) -> Option<(String, String)> {
    step.map(|s| (s.before.to_string(), s.after.to_string()))
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Stage positions stay ordered and inside the hypothesis cascade.
    #[test]
    fn stage_positions_stay_valid(seeds in arb_seeds()) {
        let engine = edited_engine(seeds);
        let positions = engine.hypothesis_stage_positions();
        prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(positions.iter().all(|&p| p <= engine.hypothesis().len()));
        prop_assert_eq!(engine.index_map().hyp_len(), engine.hypothesis().len());
        prop_assert!(engine.hypothesis_stages().is_ok());
    }

    /// Matched slots really pair a baseline rule with the same rule object.
    #[test]
    fn matched_rules_are_identical(seeds in arb_seeds()) {
        let engine = edited_engine(seeds);
        let map = engine.index_map();
        for (b, rule) in engine.baseline().iter().enumerate() {
            if let Some(h) = map.hyp_of(b) {
                prop_assert!(rule.same_rule(engine.hypothesis().get(h).unwrap()));
            }
        }
    }

    /// The report covers every rule once and agrees with the edit marks.
    #[test]
    fn comparison_is_well_formed(seeds in arb_seeds()) {
        let mut engine = edited_engine(seeds);
        let report = engine.generate_comparison().unwrap();
        let (base_row, hyp_row) = report.rule_correspondences();
        prop_assert_eq!(base_row.iter().flatten().count(), engine.baseline().len());
        prop_assert_eq!(hyp_row.iter().flatten().count(), engine.hypothesis().len());
        let first_edit = report.changed_slots().iter().position(|&c| c);
        prop_assert_eq!(report.divergence_point().is_some(), first_edit.is_some());
        if let (Some(dp), Some(first)) = (report.divergence_point(), first_edit) {
            prop_assert!(dp <= first);
        }
        for slot in report.changed_rule_effects().keys() {
            prop_assert!(report.changed_slots()[*slot]);
        }
        for id in report.etyma_with_changed_derivations() {
            let dp = report.divergence_point().unwrap();
            let text = report.differential_derivation(id);
            let header = format!("CONCORDANT UNTIL RULE: {}", dp);
            prop_assert!(text.starts_with(&header));
        }
    }

    /// Every slot before the divergence point does the same thing to every
    /// etymon in both runs.
    #[test]
    fn runs_agree_before_divergence(seeds in arb_seeds()) {
        let mut engine = edited_engine(seeds);
        let report = engine.generate_comparison().unwrap();
        let timeline = report.timeline();
        let end = report.divergence_point().unwrap_or(timeline.len());
        let runs = report.baseline().derivations().iter().zip(report.hypothesis().derivations());
        for (base, hyp) in runs {
            for slot in &timeline.slots()[..end] {
                prop_assert!(slot.is_matched());
                let b = slot.base.and_then(|p| base.step_at(p));
                let h = slot.hyp.and_then(|p| hyp.step_at(p));
                prop_assert_eq!(effect(b), effect(h));
            }
        }
    }

    /// The change log and the report number edits the same way.
    #[test]
    fn change_log_marks_the_edited_slots(seeds in arb_seeds()) {
        let mut engine = edited_engine(seeds);
        let report = engine.generate_comparison().unwrap();
        let logged: BTreeSet<usize> = engine.change_log().iter().map(|c| c.position).collect();
        prop_assert_eq!(logged, changed_slots(&report));
    }

    /// After accepting, a fresh comparison reports no divergence at all.
    #[test]
    fn accept_leaves_nothing_to_report(seeds in arb_seeds()) {
        let mut engine = edited_engine(seeds);
        let expected = engine.generate_comparison().unwrap().hypothesis().current_result();
        engine.accept().unwrap();
        prop_assert_eq!(engine.state(), EngineState::Clean);
        let report = engine.generate_comparison().unwrap();
        prop_assert_eq!(report.divergence_point(), None);
        prop_assert!(report.etyma_with_changed_derivations().is_empty());
        prop_assert_eq!(report.baseline().current_result(), expected);
    }

    /// Completion flips exactly once, after the last rule.
    #[test]
    fn completion_is_monotone(rules in 0usize..=11) {
        let lang = sample();
        let cascade = lang.cascade.prefix(rules);
        let mut sim = Simulation::with_config(
            lang.lexicon,
            cascade,
            Stages::new(),
            SimulationConfig::sequential(),
        )
        .unwrap();
        let mut seen_complete = sim.is_complete();
        let mut steps = 0;
        while sim.step().is_ok() {
            steps += 1;
            prop_assert!(!seen_complete);
            prop_assert_eq!(sim.is_complete(), steps == rules);
            seen_complete = sim.is_complete();
        }
        prop_assert_eq!(steps, rules);
        prop_assert!(sim.is_complete());
    }
}
