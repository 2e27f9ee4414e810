use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use diasim_metric::FeatureEditDistance;
use diasim_simulator::{Simulation, SimulationError};
use diasim_types::{Cascade, Lexicon, RuleCompiler, RuleRef, Stages};

use crate::change_log::ProposedChangeLog;
use crate::config::EngineConfig;
use crate::edit::Edit;
use crate::error::HypothesisError;
use crate::index_map::{PositionShift, RuleIndexMap};
use crate::report::DifferentialReport;
use crate::timeline::GlobalTimeline;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// The hypothesis equals the baseline.
    Clean,
    /// At least one edit since the last accept or discard.
    Dirty,
}

/// A baseline cascade and an editable hypothesis copy of it.
///
/// Edits touch only the hypothesis. The baseline changes only through
/// [`HypothesisEngine::accept`].
#[derive(Clone, Debug)]
pub struct HypothesisEngine {
    input: Lexicon,
    baseline: Cascade,
    baseline_stages: Stages,
    hypothesis: Cascade,
    hypothesis_stage_positions: Vec<usize>,
    index_map: RuleIndexMap,
    log: ProposedChangeLog,
    relocated: BTreeSet<usize>,
    edit_count: usize,
    config: EngineConfig,
    baseline_run: Option<Arc<Simulation>>,
    hypothesis_run: Option<Arc<Simulation>>,
}

impl HypothesisEngine {
    pub fn new(
        input: Lexicon,
        cascade: Cascade,
        stages: Stages,
        config: EngineConfig,
    ) -> Result<Self, HypothesisError> {
        stages.validate(cascade.len(), input.len())?;
        Ok(Self {
            hypothesis: cascade.clone(),
            hypothesis_stage_positions: stages.positions(),
            index_map: RuleIndexMap::identity(cascade.len()),
            log: ProposedChangeLog::new(),
            relocated: BTreeSet::new(),
            edit_count: 0,
            input,
            baseline: cascade,
            baseline_stages: stages,
            config,
            baseline_run: None,
            hypothesis_run: None,
        })
    }

    /// Start from an existing run, reusing it as the baseline result.
    pub fn from_simulation(mut sim: Simulation, config: EngineConfig) -> Result<Self, HypothesisError> {
        sim.run_to_end();
        let mut engine = Self::new(
            sim.input().clone(),
            sim.cascade().clone(),
            sim.stages().clone(),
            config,
        )?;
        engine.baseline_run = Some(Arc::new(sim));
        Ok(engine)
    }

    pub fn input(&self) -> &Lexicon {
        &self.input
    }

    pub fn baseline(&self) -> &Cascade {
        &self.baseline
    }

    pub fn baseline_stages(&self) -> &Stages {
        &self.baseline_stages
    }

    pub fn hypothesis(&self) -> &Cascade {
        &self.hypothesis
    }

    pub fn hypothesis_stage_positions(&self) -> &[usize] {
        &self.hypothesis_stage_positions
    }

    /// The baseline stages placed at their hypothesis positions.
    pub fn hypothesis_stages(&self) -> Result<Stages, HypothesisError> {
        Ok(self
            .baseline_stages
            .with_positions(&self.hypothesis_stage_positions)?)
    }

    pub fn index_map(&self) -> &RuleIndexMap {
        &self.index_map
    }

    pub fn change_log(&self) -> &ProposedChangeLog {
        &self.log
    }

    /// Baseline indices of rules moved by a relocation.
    pub fn relocated(&self) -> &BTreeSet<usize> {
        &self.relocated
    }

    pub fn edit_count(&self) -> usize {
        self.edit_count
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        if self.edit_count == 0 {
            EngineState::Clean
        } else {
            EngineState::Dirty
        }
    }

    /// Apply one edit to the hypothesis. A rejected edit changes nothing.
    pub fn apply(&mut self, edit: Edit, annotation: impl Into<String>) -> Result<(), HypothesisError> {
        edit.validate(self.hypothesis.len())?;
        let annotation = annotation.into();
        let name = edit.name();
        match edit {
            Edit::Insert { position, rules } => self.insert_rules(position, rules, &annotation),
            Edit::Delete { position } => self.delete_rule(position, &annotation),
            Edit::Relocate { from, to } => self.relocate_rule(from, to, &annotation),
            Edit::Modify { position, rules } => {
                self.delete_rule(position, &annotation);
                self.insert_rules(position, rules, &annotation);
            }
        }
        self.log
            .reposition(&GlobalTimeline::build(&self.index_map, &self.relocated));
        self.edit_count += 1;
        self.hypothesis_run = None;
        tracing::info!(
            edit = name,
            hypothesis_rules = self.hypothesis.len(),
            pending = self.edit_count,
            "Hypothesis edit applied"
        );
        Ok(())
    }

    /// Compile `text` and insert the result at `position`.
    pub fn propose_insert(
        &mut self,
        position: usize,
        text: &str,
        compiler: &dyn RuleCompiler,
        annotation: impl Into<String>,
    ) -> Result<(), HypothesisError> {
        let rules = compiler.compile(text)?;
        self.apply(Edit::Insert { position, rules }, annotation)
    }

    /// Compile `text` and let it replace the rule at `position`.
    pub fn propose_modify(
        &mut self,
        position: usize,
        text: &str,
        compiler: &dyn RuleCompiler,
        annotation: impl Into<String>,
    ) -> Result<(), HypothesisError> {
        let rules = compiler.compile(text)?;
        self.apply(Edit::Modify { position, rules }, annotation)
    }

    fn insert_rules(&mut self, position: usize, rules: Vec<RuleRef>, annotation: &str) {
        let width = rules.len();
        self.log.record_insertion(position, &rules, annotation);
        self.hypothesis.insert(position, rules);
        self.index_map.apply_insert(position, width);
        self.shift_stages(PositionShift::Insert { at: position, width });
    }

    fn delete_rule(&mut self, position: usize, annotation: &str) {
        self.log
            .record_deletion(position, self.index_map.base_of(position), annotation);
        self.hypothesis.remove(position);
        if let Some(base) = self.index_map.apply_delete(position) {
            self.relocated.remove(&base);
        }
        self.shift_stages(PositionShift::Delete { at: position });
    }

    fn relocate_rule(&mut self, from: usize, to: usize, annotation: &str) {
        let rule = self.hypothesis.remove(from);
        self.log
            .record_deletion(from, self.index_map.base_of(from), annotation);
        self.shift_stages(PositionShift::Delete { at: from });
        self.log
            .record_insertion(to, std::slice::from_ref(&rule), annotation);
        self.hypothesis.insert(to, [rule]);
        self.shift_stages(PositionShift::Insert { at: to, width: 1 });
        if let Some(base) = self.index_map.apply_relocate(from, to) {
            self.relocated.insert(base);
        }
    }

    fn shift_stages(&mut self, shift: PositionShift) {
        for position in &mut self.hypothesis_stage_positions {
            *position = shift.apply_to_cut(*position);
        }
    }

    fn run_pair(
        &self,
        hypothesis_stages: Stages,
    ) -> (
        Result<Arc<Simulation>, SimulationError>,
        Result<Arc<Simulation>, SimulationError>,
    ) {
        let baseline_job = || match &self.baseline_run {
            Some(run) => Ok(Arc::clone(run)),
            None => Simulation::run(
                self.input.clone(),
                self.baseline.clone(),
                self.baseline_stages.clone(),
                self.config.simulation.clone(),
            )
            .map(Arc::new),
        };
        let hypothesis_job = move || match &self.hypothesis_run {
            Some(run) => Ok(Arc::clone(run)),
            None => Simulation::run(
                self.input.clone(),
                self.hypothesis.clone(),
                hypothesis_stages,
                self.config.simulation.clone(),
            )
            .map(Arc::new),
        };

        #[cfg(feature = "parallel")]
        let pair = rayon::join(baseline_job, hypothesis_job);
        #[cfg(not(feature = "parallel"))]
        let pair = (baseline_job(), hypothesis_job());
        pair
    }

    /// Run both cascades (reusing cached runs) and compare them.
    pub fn generate_comparison(&mut self) -> Result<DifferentialReport, HypothesisError> {
        let hypothesis_stages = self.hypothesis_stages()?;
        if self.edit_count == 0 && self.hypothesis_run.is_none() {
            self.hypothesis_run = self.baseline_run.clone();
        }
        let (baseline, hypothesis) = self.run_pair(hypothesis_stages);
        let (baseline, hypothesis) = (baseline?, hypothesis?);
        self.baseline_run = Some(Arc::clone(&baseline));
        self.hypothesis_run = Some(Arc::clone(&hypothesis));

        let report = DifferentialReport::build(
            baseline,
            hypothesis,
            &self.index_map,
            &self.relocated,
            FeatureEditDistance::new(&self.config.metric),
            self.config.simulation.parallel_threshold,
        );
        tracing::info!(
            divergence = ?report.divergence_point(),
            changed_etyma = report.etyma_with_changed_derivations().len(),
            edited_slots = report.changed_rule_effects().len(),
            "Comparison generated"
        );
        Ok(report)
    }

    /// Make the hypothesis the new baseline.
    pub fn accept(&mut self) -> Result<(), HypothesisError> {
        let stages = self.hypothesis_stages()?;
        let promoted = if self.edit_count == 0 {
            self.baseline_run.take()
        } else {
            self.hypothesis_run.take()
        };
        let accepted = self.edit_count;
        self.baseline = self.hypothesis.clone();
        self.baseline_stages = stages;
        self.reset_hypothesis();
        self.baseline_run = promoted;
        tracing::info!(
            rules = self.baseline.len(),
            edits = accepted,
            "Hypothesis accepted as baseline"
        );
        Ok(())
    }

    /// Throw the hypothesis away and start again from the baseline.
    pub fn discard(&mut self) {
        let discarded = self.edit_count;
        self.hypothesis = self.baseline.clone();
        self.reset_hypothesis();
        tracing::info!(edits = discarded, "Hypothesis discarded");
    }

    fn reset_hypothesis(&mut self) {
        self.hypothesis_stage_positions = self.baseline_stages.positions();
        self.index_map = RuleIndexMap::identity(self.baseline.len());
        self.log.clear();
        self.relocated.clear();
        self.edit_count = 0;
        self.hypothesis_run = None;
    }
}
