use diasim_types::RuleRef;

use crate::error::HypothesisError;

/// A proposed change to the hypothesis cascade, in hypothesis positions.
///
/// Relocation targets are read after the rule has been lifted out, so a
/// rule at `from` lands at index `to` of the final cascade.
#[derive(Clone, Debug)]
pub enum Edit {
    /// Insert `rules` in order starting at `position`, `0..=len`.
    Insert { position: usize, rules: Vec<RuleRef> },
    Delete { position: usize },
    Relocate { from: usize, to: usize },
    /// Delete at `position`, then insert `rules` there.
    Modify { position: usize, rules: Vec<RuleRef> },
}

impl Edit {
    pub fn insert(position: usize, rule: RuleRef) -> Self {
        Self::Insert {
            position,
            rules: vec![rule],
        }
    }

    pub fn delete(position: usize) -> Self {
        Self::Delete { position }
    }

    pub fn relocate(from: usize, to: usize) -> Self {
        Self::Relocate { from, to }
    }

    pub fn modify(position: usize, rule: RuleRef) -> Self {
        Self::Modify {
            position,
            rules: vec![rule],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::Relocate { .. } => "relocate",
            Self::Modify { .. } => "modify",
        }
    }

    /// Check the edit against a hypothesis cascade of `len` rules.
    pub(crate) fn validate(&self, len: usize) -> Result<(), HypothesisError> {
        let operation = self.name();
        let in_range = |position: usize, limit: usize| {
            if position < limit {
                Ok(())
            } else {
                Err(HypothesisError::PositionOutOfRange {
                    operation,
                    position,
                    len,
                })
            }
        };
        match self {
            Self::Insert { position, rules } => {
                if rules.is_empty() {
                    return Err(HypothesisError::NoRules(operation));
                }
                in_range(*position, len + 1)
            }
            Self::Delete { position } => in_range(*position, len),
            Self::Modify { position, rules } => {
                if rules.is_empty() {
                    return Err(HypothesisError::NoRules(operation));
                }
                in_range(*position, len)
            }
            Self::Relocate { from, to } => {
                in_range(*from, len)?;
                in_range(*to, len)?;
                if from == to {
                    return Err(HypothesisError::NoOpRelocation(*from));
                }
                Ok(())
            }
        }
    }
}
