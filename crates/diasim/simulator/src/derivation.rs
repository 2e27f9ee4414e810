use serde::{Deserialize, Serialize};

use diasim_types::{Cascade, PhonologicalForm, StageKind};

/// One rule application that changed the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationStep {
    pub position: usize,
    pub before: PhonologicalForm,
    pub after: PhonologicalForm,
}

impl DerivationStep {
    /// `#before# > #after#`
    pub fn describe(&self) -> String {
        format!("{} > {}", self.before, self.after)
    }
}

/// The form an etymon had when a stage was reached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub stage: usize,
    pub kind: StageKind,
    pub position: usize,
    pub form: PhonologicalForm,
}

impl Waypoint {
    fn line(&self) -> String {
        format!(
            "Waypoint {} {} stage form : {}",
            self.stage + 1,
            self.kind,
            self.form
        )
    }
}

/// History of one etymon through a cascade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    input: PhonologicalForm,
    steps: Vec<DerivationStep>,
    waypoints: Vec<Waypoint>,
    final_form: Option<PhonologicalForm>,
}

impl Derivation {
    pub fn new(input: PhonologicalForm) -> Self {
        Self {
            input,
            steps: Vec::new(),
            waypoints: Vec::new(),
            final_form: None,
        }
    }

    pub fn input(&self) -> &PhonologicalForm {
        &self.input
    }

    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Set once the whole cascade has run.
    pub fn final_form(&self) -> Option<&PhonologicalForm> {
        self.final_form.as_ref()
    }

    pub fn step_at(&self, position: usize) -> Option<&DerivationStep> {
        self.steps
            .binary_search_by_key(&position, |s| s.position)
            .ok()
            .map(|i| &self.steps[i])
    }

    pub fn fired_at(&self, position: usize) -> bool {
        self.step_at(position).is_some()
    }

    pub fn waypoint(&self, stage: usize) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.stage == stage)
    }

    pub(crate) fn record_step(&mut self, position: usize, before: PhonologicalForm, after: PhonologicalForm) {
        debug_assert!(self.steps.last().map_or(true, |s| s.position < position));
        self.steps.push(DerivationStep {
            position,
            before,
            after,
        });
    }

    pub(crate) fn record_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub(crate) fn finish(&mut self, form: PhonologicalForm) {
        self.final_form = Some(form);
    }

    /// Trace labelled with cascade positions and rule notation:
    ///
    /// ```text
    /// /dodə/
    /// #doɾə# | 1 : d > ɾ / [+syl] __ ə
    /// Waypoint 1 Gold stage form : #doɾə#
    /// Final form : #doɾə#
    /// ```
    pub fn render(&self, cascade: &Cascade) -> String {
        self.render_with(|position| {
            let rule = cascade.get(position).map(|r| r.text()).unwrap_or_default();
            format!("{} : {}", position, rule)
        })
    }

    /// Trace with a caller-supplied label for each step's rule.
    pub fn render_with(&self, mut label: impl FnMut(usize) -> String) -> String {
        let mut lines = vec![format!("/{}/", self.input.phone_string())];
        let mut waypoints = self.waypoints.iter().peekable();
        for step in &self.steps {
            while let Some(w) = waypoints.next_if(|w| w.position <= step.position) {
                lines.push(w.line());
            }
            lines.push(format!("{} | {}", step.after, label(step.position)));
        }
        lines.extend(waypoints.map(Waypoint::line));
        if let Some(form) = &self.final_form {
            lines.push(format!("Final form : {}", form));
        }
        lines.join("\n")
    }
}
