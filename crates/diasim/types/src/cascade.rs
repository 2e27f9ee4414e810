use crate::rule::RuleRef;

/// Ordered rule sequence, addressed by zero-based position.
#[derive(Clone, Debug, Default)]
pub struct Cascade {
    rules: Vec<RuleRef>,
}

impl Cascade {
    pub fn new(rules: Vec<RuleRef>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&RuleRef> {
        self.rules.get(position)
    }

    pub fn rules(&self) -> &[RuleRef] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleRef> {
        self.rules.iter()
    }

    /// Insert `rules` so the first of them lands at `position`.
    ///
    /// # Panics
    /// If `position > len()`; callers validate positions first.
    pub fn insert<I>(&mut self, position: usize, rules: I)
    where
        I: IntoIterator<Item = RuleRef>,
    {
        self.rules.splice(position..position, rules);
    }

    /// # Panics
    /// If `position >= len()`.
    pub fn remove(&mut self, position: usize) -> RuleRef {
        self.rules.remove(position)
    }

    /// The first `n` rules (all of them when `n` exceeds the length).
    pub fn prefix(&self, n: usize) -> Cascade {
        Self::new(self.rules[..n.min(self.rules.len())].to_vec())
    }

    /// Positions of rules whose notation contains `needle`.
    pub fn find(&self, needle: &str) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.text().contains(needle))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn position_of(&self, rule: &RuleRef) -> Option<usize> {
        self.rules.iter().position(|r| r.same_rule(rule))
    }

    /// `position : notation` per rule.
    pub fn listing(&self) -> Vec<String> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{} : {}", i, r))
            .collect()
    }
}

impl FromIterator<RuleRef> for Cascade {
    fn from_iter<I: IntoIterator<Item = RuleRef>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
