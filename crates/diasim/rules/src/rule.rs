use std::fmt;
use std::sync::Arc;

use diasim_types::{
    Boundary, FeatureInventory, FeatureMatrix, Phone, PhonologicalForm, Rule, Segment,
};

/// What a neighbouring segment must be for a rule to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextItem {
    Features(FeatureMatrix),
    WordBoundary,
    MorphemeBoundary,
}

impl ContextItem {
    pub fn phone(phone: &Phone) -> Self {
        Self::Features(FeatureMatrix::of_phone(phone))
    }

    pub fn matches(&self, segment: &Segment) -> bool {
        match (self, segment) {
            (Self::Features(m), Segment::Phone(p)) => m.matches(p),
            (Self::WordBoundary, Segment::Boundary(Boundary::Word)) => true,
            (Self::MorphemeBoundary, Segment::Boundary(Boundary::Morpheme)) => true,
            _ => false,
        }
    }
}

/// One-segment environment on either side of the focus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    pub left: Option<ContextItem>,
    pub right: Option<ContextItem>,
}

impl Context {
    fn left_ok(&self, segments: &[Segment], at: usize) -> bool {
        match &self.left {
            None => true,
            Some(item) => at > 0 && item.matches(&segments[at - 1]),
        }
    }

    fn right_ok(&self, segments: &[Segment], at: usize) -> bool {
        match &self.right {
            None => true,
            Some(item) => segments.get(at).is_some_and(|s| item.matches(s)),
        }
    }
}

#[derive(Clone, Debug)]
pub enum RuleKind {
    /// Replace a matching phone with a fixed phone.
    Substitution { target: FeatureMatrix, output: Phone },
    /// Overwrite features of a matching phone; the result must name a symbol.
    FeatureChange {
        target: FeatureMatrix,
        changes: FeatureMatrix,
        inventory: Arc<FeatureInventory>,
    },
    Deletion { target: FeatureMatrix },
    /// Insert a phone into every gap whose neighbours satisfy the context.
    Epenthesis { inserted: Phone },
    /// Swap adjacent `first` `second` pairs.
    Metathesis {
        first: FeatureMatrix,
        second: FeatureMatrix,
    },
}

/// A concrete single-pass rule.
///
/// Matching is simultaneous: every site is found against the input form,
/// then all rewrites are applied left to right.
#[derive(Clone, Debug)]
pub struct PhoneRule {
    notation: String,
    kind: RuleKind,
    context: Context,
}

impl PhoneRule {
    pub fn new(notation: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            notation: notation.into(),
            kind,
            context: Context::default(),
        }
    }

    pub fn substitution(notation: impl Into<String>, target: FeatureMatrix, output: Phone) -> Self {
        Self::new(notation, RuleKind::Substitution { target, output })
    }

    pub fn feature_change(
        notation: impl Into<String>,
        target: FeatureMatrix,
        changes: FeatureMatrix,
        inventory: Arc<FeatureInventory>,
    ) -> Self {
        Self::new(
            notation,
            RuleKind::FeatureChange {
                target,
                changes,
                inventory,
            },
        )
    }

    pub fn deletion(notation: impl Into<String>, target: FeatureMatrix) -> Self {
        Self::new(notation, RuleKind::Deletion { target })
    }

    pub fn epenthesis(notation: impl Into<String>, inserted: Phone) -> Self {
        Self::new(notation, RuleKind::Epenthesis { inserted })
    }

    pub fn metathesis(notation: impl Into<String>, first: FeatureMatrix, second: FeatureMatrix) -> Self {
        Self::new(notation, RuleKind::Metathesis { first, second })
    }

    pub fn left(mut self, item: ContextItem) -> Self {
        self.context.left = Some(item);
        self
    }

    pub fn right(mut self, item: ContextItem) -> Self {
        self.context.right = Some(item);
        self
    }

    pub fn notation(&self) -> &str {
        &self.notation
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    fn rewrite_phone(&self, phone: &Phone) -> Option<Option<Phone>> {
        match &self.kind {
            RuleKind::Substitution { target, output } if target.matches(phone) => {
                Some(Some(output.clone()))
            }
            RuleKind::FeatureChange {
                target,
                changes,
                inventory,
            } if target.matches(phone) => {
                let features = changes.apply_to(phone.features());
                // Unnamed feature bundles are left alone.
                inventory.phone_with_features(&features).map(Some)
            }
            RuleKind::Deletion { target } if target.matches(phone) => Some(None),
            _ => None,
        }
    }

    fn apply_rewrites(&self, segments: &[Segment]) -> Option<Vec<Segment>> {
        let mut fired = false;
        let mut out = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let rewrite = segment
                .as_phone()
                .filter(|_| self.context.left_ok(segments, i) && self.context.right_ok(segments, i + 1))
                .and_then(|p| self.rewrite_phone(p));
            match rewrite {
                Some(replacement) => {
                    fired = true;
                    out.extend(replacement.map(Segment::Phone));
                }
                None => out.push(segment.clone()),
            }
        }
        fired.then_some(out)
    }

    fn apply_epenthesis(&self, segments: &[Segment], inserted: &Phone) -> Option<Vec<Segment>> {
        let mut fired = false;
        let mut out = Vec::with_capacity(segments.len() + 1);
        for gap in 0..=segments.len() {
            if self.context.left_ok(segments, gap) && self.context.right_ok(segments, gap) {
                fired = true;
                out.push(Segment::Phone(inserted.clone()));
            }
            if let Some(segment) = segments.get(gap) {
                out.push(segment.clone());
            }
        }
        fired.then_some(out)
    }

    fn apply_metathesis(
        &self,
        segments: &[Segment],
        first: &FeatureMatrix,
        second: &FeatureMatrix,
    ) -> Option<Vec<Segment>> {
        let mut out = segments.to_vec();
        let mut fired = false;
        let mut i = 0;
        while i + 1 < segments.len() {
            let pair = (segments[i].as_phone(), segments[i + 1].as_phone());
            let hit = matches!(pair, (Some(a), Some(b)) if first.matches(a) && second.matches(b))
                && self.context.left_ok(segments, i)
                && self.context.right_ok(segments, i + 2);
            if hit {
                out.swap(i, i + 1);
                fired = true;
                i += 2;
            } else {
                i += 1;
            }
        }
        fired.then_some(out)
    }
}

impl fmt::Display for PhoneRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}

impl Rule for PhoneRule {
    fn apply(&self, form: &PhonologicalForm) -> Option<PhonologicalForm> {
        let PhonologicalForm::Present(segments) = form else {
            return None;
        };
        let rewritten = match &self.kind {
            RuleKind::Epenthesis { inserted } => self.apply_epenthesis(segments, inserted),
            RuleKind::Metathesis { first, second } => self.apply_metathesis(segments, first, second),
            _ => self.apply_rewrites(segments),
        }?;
        Some(PhonologicalForm::new(rewritten))
    }
}
