use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use diasim_metric::{evaluate_stage, EvaluationReport, FeatureEditDistance, MetricError};
use diasim_simulator::{Derivation, DerivationStep, Simulation};
use diasim_types::{EtymonId, PhonologicalForm};

use crate::index_map::RuleIndexMap;
use crate::timeline::{GlobalTimeline, TracePoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Baseline,
    Hypothesis,
}

/// Effects an edited slot lost (baseline only) or gained (hypothesis only),
/// keyed by etymon and described as `#before# > #after#`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectChanges {
    pub lost: BTreeMap<EtymonId, String>,
    pub gained: BTreeMap<EtymonId, String>,
}

impl EffectChanges {
    pub fn is_empty(&self) -> bool {
        self.lost.is_empty() && self.gained.is_empty()
    }
}

/// Baseline and hypothesis scored against one gold stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccuracyDelta {
    pub stage: String,
    pub baseline: EvaluationReport,
    pub hypothesis: EvaluationReport,
}

impl AccuracyDelta {
    pub fn change(&self) -> Option<f64> {
        Some(self.hypothesis.accuracy()? - self.baseline.accuracy()?)
    }

    /// Baseline mismatches the hypothesis gets right.
    pub fn fixed(&self) -> Vec<EtymonId> {
        Self::newly_exact(&self.baseline, &self.hypothesis)
    }

    /// Baseline hits the hypothesis gets wrong.
    pub fn broken(&self) -> Vec<EtymonId> {
        Self::newly_exact(&self.hypothesis, &self.baseline)
    }

    fn newly_exact(from: &EvaluationReport, to: &EvaluationReport) -> Vec<EtymonId> {
        from.mismatches()
            .into_iter()
            .filter(|id| to.score(*id).is_some_and(|s| s.is_exact()))
            .collect()
    }
}

/// Serializable digest of a comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub baseline_rules: usize,
    pub hypothesis_rules: usize,
    pub divergence_point: Option<usize>,
    pub baseline_row: Vec<Option<usize>>,
    pub hypothesis_row: Vec<Option<usize>>,
    pub changed_etyma: Vec<EtymonId>,
    pub rule_effects: BTreeMap<usize, EffectChanges>,
    pub effects_blocked: BTreeMap<usize, usize>,
    pub mean_final_distance: Option<f64>,
}

/// Everything learned from running the baseline and the hypothesis side by
/// side. Global slot indices refer to [`GlobalTimeline`].
#[derive(Clone, Debug)]
pub struct DifferentialReport {
    baseline: Arc<Simulation>,
    hypothesis: Arc<Simulation>,
    timeline: GlobalTimeline,
    changed: Vec<bool>,
    divergence_point: Option<usize>,
    derivations: Vec<String>,
    rule_effects: BTreeMap<usize, EffectChanges>,
    blocked: BTreeMap<usize, BTreeSet<EtymonId>>,
    distances: Vec<Option<f64>>,
    fed: FeatureEditDistance,
}

struct EtymonAnalysis {
    derivation: String,
    effects: Vec<(usize, Option<String>, Option<String>)>,
    blocked_by: BTreeSet<usize>,
    distance: Option<f64>,
}

struct Comparison<'a> {
    baseline: &'a Simulation,
    hypothesis: &'a Simulation,
    timeline: &'a GlobalTimeline,
    changed: &'a [bool],
    /// Trace index of the first edited point and the divergence point.
    divergence: Option<(usize, usize)>,
    fed: &'a FeatureEditDistance,
}

impl DifferentialReport {
    pub(crate) fn build(
        baseline: Arc<Simulation>,
        hypothesis: Arc<Simulation>,
        map: &RuleIndexMap,
        relocated: &BTreeSet<usize>,
        fed: FeatureEditDistance,
        parallel_threshold: usize,
    ) -> Self {
        assert!(
            baseline.is_complete() && hypothesis.is_complete(),
            "comparison needs two completed runs"
        );
        let timeline = GlobalTimeline::build(map, relocated);
        let changed: Vec<bool> = timeline
            .slots()
            .iter()
            .enumerate()
            .map(|(global, slot)| !slot.is_matched() || timeline.is_moved(global))
            .collect();
        let divergence = find_divergence(&timeline, &changed);
        let divergence_point = divergence.map(|(_, global)| global);

        let analyses = Comparison {
            baseline: &baseline,
            hypothesis: &hypothesis,
            timeline: &timeline,
            changed: &changed,
            divergence,
            fed: &fed,
        }
        .analyze_all(parallel_threshold);

        let mut rule_effects: BTreeMap<usize, EffectChanges> = BTreeMap::new();
        let mut blocked: BTreeMap<usize, BTreeSet<EtymonId>> = BTreeMap::new();
        let mut derivations = Vec::with_capacity(analyses.len());
        let mut distances = Vec::with_capacity(analyses.len());
        for (index, analysis) in analyses.into_iter().enumerate() {
            let id = EtymonId(index);
            for (slot, lost, gained) in analysis.effects {
                let entry = rule_effects.entry(slot).or_default();
                if let Some(effect) = lost {
                    entry.lost.insert(id, effect);
                }
                if let Some(effect) = gained {
                    entry.gained.insert(id, effect);
                }
            }
            for slot in analysis.blocked_by {
                blocked.entry(slot).or_default().insert(id);
            }
            derivations.push(analysis.derivation);
            distances.push(analysis.distance);
        }

        let report = Self {
            baseline,
            hypothesis,
            timeline,
            changed,
            divergence_point,
            derivations,
            rule_effects,
            blocked,
            distances,
            fed,
        };
        tracing::debug!(
            slots = report.timeline.len(),
            divergence = ?report.divergence_point,
            edited_slots = report.changed.iter().filter(|&&c| c).count(),
            "Differential report built"
        );
        report
    }

    pub fn baseline(&self) -> &Simulation {
        &self.baseline
    }

    pub fn hypothesis(&self) -> &Simulation {
        &self.hypothesis
    }

    pub fn timeline(&self) -> &GlobalTimeline {
        &self.timeline
    }

    /// Baseline row and hypothesis row of the merged timeline.
    pub fn rule_correspondences(&self) -> (Vec<Option<usize>>, Vec<Option<usize>>) {
        self.timeline.correspondences()
    }

    pub fn base_indices_to_global(&self) -> &[usize] {
        self.timeline.base_to_global()
    }

    pub fn hyp_indices_to_global(&self) -> &[usize] {
        self.timeline.hyp_to_global()
    }

    /// Earliest global slot either run applies at or after the first edited
    /// point of the trace; `None` when the cascades are the same. Every slot
    /// before it does the same thing in both runs.
    pub fn divergence_point(&self) -> Option<usize> {
        self.divergence_point
    }

    /// Per global slot: was it inserted, deleted or relocated.
    pub fn changed_slots(&self) -> &[bool] {
        &self.changed
    }

    /// Side-by-side derivation from the divergence point on; empty when the
    /// etymon ends and passes every stage identically in both runs.
    pub fn differential_derivation(&self, id: EtymonId) -> &str {
        self.derivations.get(id.index()).map_or("", String::as_str)
    }

    pub fn etyma_with_changed_derivations(&self) -> Vec<EtymonId> {
        self.derivations
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_empty())
            .map(|(i, _)| EtymonId(i))
            .collect()
    }

    /// Edited slots whose effect differs for at least one etymon.
    pub fn changed_rule_effects(&self) -> &BTreeMap<usize, EffectChanges> {
        &self.rule_effects
    }

    /// Distinct etyma for which an unedited rule fired on one side only,
    /// attributed to the latest edit at `slot` that had altered them.
    pub fn effects_blocked(&self, slot: usize) -> usize {
        self.blocked.get(&slot).map_or(0, BTreeSet::len)
    }

    pub fn blocked_etyma(&self, slot: usize) -> Vec<EtymonId> {
        self.blocked
            .get(&slot)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Feature edit distance between the two final forms; `None` when either
    /// is absent.
    pub fn final_distance(&self, id: EtymonId) -> Option<f64> {
        self.distances.get(id.index()).copied().flatten()
    }

    pub fn mean_final_distance(&self) -> Option<f64> {
        let known: Vec<f64> = self.distances.iter().flatten().copied().collect();
        (!known.is_empty()).then(|| known.iter().sum::<f64>() / known.len() as f64)
    }

    /// One side's derivation with steps labelled by global slot.
    pub fn globalized_derivation(&self, id: EtymonId, side: Side) -> Option<String> {
        let (sim, to_global): (&Simulation, &[usize]) = match side {
            Side::Baseline => (&*self.baseline, self.timeline.base_to_global()),
            Side::Hypothesis => (&*self.hypothesis, self.timeline.hyp_to_global()),
        };
        let derivation = sim.derivation_of(id)?;
        Some(derivation.render_with(|position| {
            let global = to_global.get(position).copied().unwrap_or(position);
            format!("{} : {}", global, rule_text(sim, position))
        }))
    }

    /// Score both runs at a gold stage.
    ///
    /// # Panics
    ///
    /// If `stage` is not a declared stage index.
    pub fn accuracy_at(&self, stage: usize) -> Result<AccuracyDelta, MetricError> {
        let stages = self.baseline.stages();
        let Some(declared) = stages.get(stage) else {
            panic!("stage index {stage} out of range for {} stages", stages.len());
        };
        let score = |sim: &Simulation| {
            let snapshot = sim
                .result_at(stage)
                .cloned()
                .unwrap_or_else(|| sim.current_result());
            evaluate_stage(declared, &snapshot, &self.fed)
        };
        Ok(AccuracyDelta {
            stage: declared.name().to_string(),
            baseline: score(&*self.baseline)?,
            hypothesis: score(&*self.hypothesis)?,
        })
    }

    /// The merged timeline, one line per slot, edits tagged.
    pub fn timeline_listing(&self) -> Vec<String> {
        self.timeline
            .slots()
            .iter()
            .enumerate()
            .map(|(global, slot)| {
                let label = slot.label(global);
                match (slot.base, slot.hyp) {
                    (Some(_), Some(hyp)) if self.timeline.is_moved(global) => {
                        format!("{} : {} [RELOCATED]", label, rule_text(&self.hypothesis, hyp))
                    }
                    (Some(_), Some(hyp)) => {
                        format!("{} : {}", label, rule_text(&self.hypothesis, hyp))
                    }
                    (None, Some(hyp)) => {
                        format!("{} : {} [INSERTED]", label, rule_text(&self.hypothesis, hyp))
                    }
                    (Some(base), None) => {
                        format!("{} : {} [DELETED]", label, rule_text(&self.baseline, base))
                    }
                    _ => label,
                }
            })
            .collect()
    }

    pub fn summary(&self) -> ComparisonSummary {
        let (baseline_row, hypothesis_row) = self.rule_correspondences();
        ComparisonSummary {
            baseline_rules: self.baseline.cascade().len(),
            hypothesis_rules: self.hypothesis.cascade().len(),
            divergence_point: self.divergence_point,
            baseline_row,
            hypothesis_row,
            changed_etyma: self.etyma_with_changed_derivations(),
            rule_effects: self.rule_effects.clone(),
            effects_blocked: self
                .blocked
                .iter()
                .map(|(slot, ids)| (*slot, ids.len()))
                .collect(),
            mean_final_distance: self.mean_final_distance(),
        }
    }
}

/// Trace index of the first edited point, paired with the lowest slot applied
/// from there on. A rule relocated backward is applied by the hypothesis
/// before slots that precede its own.
fn find_divergence(timeline: &GlobalTimeline, changed: &[bool]) -> Option<(usize, usize)> {
    let trace = timeline.trace();
    let start = trace.iter().position(|p| changed[p.global])?;
    let global = trace[start..].iter().map(|p| p.global).min()?;
    Some((start, global))
}

fn rule_text(sim: &Simulation, position: usize) -> String {
    sim.cascade()
        .get(position)
        .map(|r| r.text())
        .unwrap_or_default()
}

fn same_effect(base: Option<&DerivationStep>, hyp: Option<&DerivationStep>) -> bool {
    match (base, hyp) {
        (None, None) => true,
        (Some(b), Some(h)) => b.before == h.before && b.after == h.after,
        _ => false,
    }
}

fn steps<'d>(
    point: &TracePoint,
    base: &'d Derivation,
    hyp: &'d Derivation,
) -> (Option<&'d DerivationStep>, Option<&'d DerivationStep>) {
    (
        point.base.and_then(|p| base.step_at(p)),
        point.hyp.and_then(|p| hyp.step_at(p)),
    )
}

fn form_text(form: Option<&PhonologicalForm>) -> String {
    form.map_or_else(|| PhonologicalForm::ABSENT_MARK.to_string(), ToString::to_string)
}

/// Same final form and the same form at every stage.
fn concordant(base: &Derivation, hyp: &Derivation) -> bool {
    base.final_form() == hyp.final_form()
        && base.waypoints().len() == hyp.waypoints().len()
        && base
            .waypoints()
            .iter()
            .zip(hyp.waypoints())
            .all(|(b, h)| b.form == h.form)
}

impl Comparison<'_> {
    fn analyze_all(&self, parallel_threshold: usize) -> Vec<EtymonAnalysis> {
        let base = self.baseline.derivations();
        let hyp = self.hypothesis.derivations();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if base.len() >= parallel_threshold {
                return base
                    .par_iter()
                    .zip(hyp.par_iter())
                    .enumerate()
                    .map(|(i, (b, h))| self.analyze(EtymonId(i), b, h))
                    .collect();
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel_threshold;

        base.iter()
            .zip(hyp)
            .enumerate()
            .map(|(i, (b, h))| self.analyze(EtymonId(i), b, h))
            .collect()
    }

    fn analyze(&self, id: EtymonId, base: &Derivation, hyp: &Derivation) -> EtymonAnalysis {
        let mut effects = Vec::new();
        let mut altered = BTreeSet::new();
        for (global, slot) in self.timeline.slots().iter().enumerate() {
            if !self.changed[global] {
                continue;
            }
            let b = slot.base.and_then(|p| base.step_at(p));
            let h = slot.hyp.and_then(|p| hyp.step_at(p));
            if !same_effect(b, h) {
                effects.push((
                    global,
                    b.map(DerivationStep::describe),
                    h.map(DerivationStep::describe),
                ));
                altered.insert(global);
            }
        }

        // Attribution follows the order the rules actually ran in, so a
        // backward relocation is credited with the rules it bleeds.
        let mut blocked_by = BTreeSet::new();
        let mut last_edit = None;
        for point in self.timeline.trace() {
            if self.changed[point.global] {
                if altered.contains(&point.global) {
                    last_edit = Some(point.global);
                }
                continue;
            }
            let (b, h) = steps(point, base, hyp);
            if b.is_some() != h.is_some() {
                if let Some(edit) = last_edit {
                    blocked_by.insert(edit);
                }
            }
        }

        let derivation = match self.divergence {
            Some((start, dp)) if !concordant(base, hyp) => self.render(start, dp, base, hyp),
            _ => String::new(),
        };
        let distance = match (self.baseline.current_form(id), self.hypothesis.current_form(id)) {
            (Some(a), Some(b)) => self.fed.distance(a, b).ok(),
            _ => None,
        };
        EtymonAnalysis {
            derivation,
            effects,
            blocked_by,
            distance,
        }
    }

    fn render(&self, start: usize, dp: usize, base: &Derivation, hyp: &Derivation) -> String {
        let mut lines = vec![format!("CONCORDANT UNTIL RULE: {}", dp)];

        let hyp_positions = self.hypothesis.stages().positions();
        let mut waypoints: Vec<(usize, usize)> = self
            .baseline
            .stages()
            .positions()
            .into_iter()
            .zip(hyp_positions)
            .enumerate()
            .map(|(stage, (b, h))| {
                let cut = self.timeline.base_cut(b).max(self.timeline.hyp_cut(h));
                (cut, stage)
            })
            .filter(|(cut, _)| *cut > start)
            .collect();
        waypoints.sort_unstable();
        let mut pending = waypoints.into_iter().peekable();

        for (index, point) in self.timeline.trace().iter().enumerate().skip(start) {
            while let Some((_, stage)) = pending.next_if(|(cut, _)| *cut <= index) {
                lines.push(self.waypoint_line(stage, base, hyp));
            }
            let label = point.label();
            match steps(point, base, hyp) {
                (Some(b), Some(h)) => {
                    lines.push(format!("{} : {} | {}", label, b.describe(), h.describe()))
                }
                (Some(b), None) => {
                    lines.push(format!("{} : {} | bled or deleted", label, b.describe()))
                }
                (None, Some(h)) => {
                    lines.push(format!("{} : fed or inserted | {}", label, h.describe()))
                }
                (None, None) => {}
            }
        }
        for (_, stage) in pending {
            lines.push(self.waypoint_line(stage, base, hyp));
        }
        lines.push(format!(
            "Final forms: {} | {}",
            form_text(base.final_form()),
            form_text(hyp.final_form())
        ));
        lines.join("\n")
    }

    fn waypoint_line(&self, stage: usize, base: &Derivation, hyp: &Derivation) -> String {
        let kind = self
            .baseline
            .stages()
            .get(stage)
            .map(|s| s.kind().to_string())
            .unwrap_or_default();
        format!(
            "Waypoint {} {}: {} | {}",
            stage + 1,
            kind,
            form_text(base.waypoint(stage).map(|w| &w.form)),
            form_text(hyp.waypoint(stage).map(|w| &w.form))
        )
    }
}
