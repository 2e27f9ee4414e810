use diasim_types::{
    Cascade, EtymonId, Lexicon, PhonologicalForm, RuleRef, StageKind, Stages,
};

use crate::config::SimulationConfig;
use crate::derivation::{Derivation, DerivationStep, Waypoint};
use crate::error::SimulationError;

/// A cascade being applied to a lexicon, one rule position at a time.
#[derive(Clone, Debug)]
pub struct Simulation {
    input: Lexicon,
    cascade: Cascade,
    stages: Stages,
    config: SimulationConfig,
    forms: Vec<PhonologicalForm>,
    derivations: Vec<Derivation>,
    snapshots: Vec<Option<Lexicon>>,
    position: usize,
    next_stage: usize,
    last_hits: Vec<usize>,
}

impl Simulation {
    pub fn new(input: Lexicon, cascade: Cascade, stages: Stages) -> Result<Self, SimulationError> {
        Self::with_config(input, cascade, stages, SimulationConfig::default())
    }

    pub fn with_config(
        input: Lexicon,
        cascade: Cascade,
        stages: Stages,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        stages.validate(cascade.len(), input.len())?;
        let forms = input.forms().to_vec();
        let derivations = forms.iter().cloned().map(Derivation::new).collect();
        let mut sim = Self {
            snapshots: vec![None; stages.len()],
            input,
            cascade,
            stages,
            config,
            forms,
            derivations,
            position: 0,
            next_stage: 0,
            last_hits: Vec::new(),
        };
        sim.capture_stages();
        sim.finish_if_complete();
        Ok(sim)
    }

    /// Build and run to completion.
    pub fn run(
        input: Lexicon,
        cascade: Cascade,
        stages: Stages,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let mut sim = Self::with_config(input, cascade, stages, config)?;
        sim.run_to_end();
        Ok(sim)
    }

    /// Result of applying only the first `rules` rules of `cascade`.
    pub fn run_prefix(input: &Lexicon, cascade: &Cascade, rules: usize) -> Result<Lexicon, SimulationError> {
        let mut sim = Self::new(input.clone(), cascade.prefix(rules), Stages::new())?;
        sim.run_to_end();
        Ok(sim.current_result())
    }

    /// Apply the next rule to every etymon.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        if self.is_complete() {
            return Err(SimulationError::AlreadyComplete {
                rules: self.cascade.len(),
            });
        }
        self.advance();
        Ok(())
    }

    /// Step until a stage is reached, returning the first stage hit.
    ///
    /// Returns `None` when the cascade completes without reaching one.
    pub fn run_to_next_stage(&mut self) -> Option<usize> {
        while !self.is_complete() {
            self.advance();
            if let Some(&stage) = self.last_hits.first() {
                return Some(stage);
            }
        }
        None
    }

    pub fn run_to_end(&mut self) {
        while !self.is_complete() {
            self.advance();
        }
    }

    pub fn is_complete(&self) -> bool {
        self.position == self.cascade.len()
    }

    /// Number of rules applied so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Indices of stages reached by the most recent step.
    pub fn stages_just_hit(&self) -> &[usize] {
        &self.last_hits
    }

    pub fn just_hit_gold_stage(&self) -> bool {
        self.just_hit(StageKind::Gold)
    }

    pub fn just_hit_black_stage(&self) -> bool {
        self.just_hit(StageKind::Black)
    }

    fn just_hit(&self, kind: StageKind) -> bool {
        self.last_hits
            .iter()
            .filter_map(|&i| self.stages.get(i))
            .any(|s| s.kind() == kind)
    }

    /// Snapshot taken at `stage`, or `None` if it has not been reached yet.
    ///
    /// # Panics
    /// If `stage` is not a declared stage index.
    pub fn result_at(&self, stage: usize) -> Option<&Lexicon> {
        assert!(
            stage < self.stages.len(),
            "stage index {} out of range: {} stages declared",
            stage,
            self.stages.len()
        );
        self.snapshots[stage].as_ref()
    }

    pub fn current_result(&self) -> Lexicon {
        self.forms.iter().cloned().collect()
    }

    pub fn current_form(&self, id: EtymonId) -> Option<&PhonologicalForm> {
        self.forms.get(id.index())
    }

    pub fn derivation_of(&self, id: EtymonId) -> Option<&Derivation> {
        self.derivations.get(id.index())
    }

    pub fn derivations(&self) -> &[Derivation] {
        &self.derivations
    }

    /// Rendered derivation trace for one etymon.
    pub fn derivation_text(&self, id: EtymonId) -> Option<String> {
        self.derivation_of(id).map(|d| d.render(&self.cascade))
    }

    /// Every etymon the rule at `position` changed, with its step.
    pub fn rule_effects(&self, position: usize) -> Vec<(EtymonId, &DerivationStep)> {
        self.derivations
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.step_at(position).map(|s| (EtymonId(i), s)))
            .collect()
    }

    pub fn input(&self) -> &Lexicon {
        &self.input
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    pub fn stages(&self) -> &Stages {
        &self.stages
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn advance(&mut self) {
        let position = self.position;
        let rule = self.cascade.rules()[position].clone();
        let changed = self.apply_rule(&rule, position);
        self.position += 1;
        tracing::trace!(position, rule = %rule, changed, "Rule applied");

        let interval = self.config.progress_interval;
        if interval > 0 && self.position % interval == 0 {
            tracing::debug!(
                applied = self.position,
                total = self.cascade.len(),
                "Simulation progress"
            );
        }

        self.last_hits.clear();
        self.capture_stages();
        self.finish_if_complete();
    }

    fn apply_rule(&mut self, rule: &RuleRef, position: usize) -> usize {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            if self.forms.len() >= self.config.parallel_threshold {
                return self
                    .forms
                    .par_iter_mut()
                    .zip(self.derivations.par_iter_mut())
                    .map(|(form, derivation)| apply_to_etymon(rule, position, form, derivation))
                    .filter(|&fired| fired)
                    .count();
            }
        }

        self.forms
            .iter_mut()
            .zip(self.derivations.iter_mut())
            .map(|(form, derivation)| apply_to_etymon(rule, position, form, derivation))
            .filter(|&fired| fired)
            .count()
    }

    fn capture_stages(&mut self) {
        while let Some(stage) = self.stages.get(self.next_stage) {
            if stage.position() != self.position {
                break;
            }
            let index = self.next_stage;
            for (form, derivation) in self.forms.iter().zip(self.derivations.iter_mut()) {
                derivation.record_waypoint(Waypoint {
                    stage: index,
                    kind: stage.kind(),
                    position: self.position,
                    form: form.clone(),
                });
            }
            self.snapshots[index] = Some(self.forms.iter().cloned().collect());
            self.last_hits.push(index);
            tracing::debug!(
                stage = %stage.name(),
                kind = %stage.kind(),
                position = self.position,
                "Stage reached"
            );
            self.next_stage += 1;
        }
    }

    fn finish_if_complete(&mut self) {
        if !self.is_complete() {
            return;
        }
        for (form, derivation) in self.forms.iter().zip(self.derivations.iter_mut()) {
            derivation.finish(form.clone());
        }
        tracing::info!(
            rules = self.cascade.len(),
            etyma = self.forms.len(),
            "Simulation complete"
        );
    }
}

/// Apply one rule to one etymon, recording the step if it fired.
fn apply_to_etymon(
    rule: &RuleRef,
    position: usize,
    form: &mut PhonologicalForm,
    derivation: &mut Derivation,
) -> bool {
    match rule.apply(form) {
        Some(after) => {
            let before = std::mem::replace(form, after.clone());
            derivation.record_step(position, before, after);
            true
        }
        None => false,
    }
}
