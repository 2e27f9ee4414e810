use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// How a single edit moves hypothesis positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionShift {
    Insert { at: usize, width: usize },
    Delete { at: usize },
}

impl PositionShift {
    /// New index of a rule position; the deleted position itself has none.
    pub fn apply(self, position: usize) -> Option<usize> {
        match self {
            Self::Insert { .. } => Some(self.apply_to_cut(position)),
            Self::Delete { at } => match position.cmp(&at) {
                Ordering::Less => Some(position),
                Ordering::Equal => None,
                Ordering::Greater => Some(position - 1),
            },
        }
    }

    /// New value of a cut point (a stage position or the end sentinel).
    /// Insertions move cuts at or after `at`; deletions move cuts after `at`.
    pub fn apply_to_cut(self, position: usize) -> usize {
        match self {
            Self::Insert { at, width } if position >= at => position + width,
            Self::Delete { at } if position > at => position - 1,
            _ => position,
        }
    }
}

/// Bidirectional correspondence between baseline and hypothesis positions.
///
/// Each array has one entry per rule plus a trailing end sentinel, so the two
/// ends always correspond. `None` marks a rule without a counterpart: deleted
/// from the baseline, or inserted into the hypothesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleIndexMap {
    base_to_hyp: Vec<Option<usize>>,
    hyp_to_base: Vec<Option<usize>>,
}

impl RuleIndexMap {
    pub fn identity(len: usize) -> Self {
        let row: Vec<Option<usize>> = (0..=len).map(Some).collect();
        Self {
            base_to_hyp: row.clone(),
            hyp_to_base: row,
        }
    }

    pub fn base_len(&self) -> usize {
        self.base_to_hyp.len() - 1
    }

    pub fn hyp_len(&self) -> usize {
        self.hyp_to_base.len() - 1
    }

    pub fn base_to_hyp(&self) -> &[Option<usize>] {
        &self.base_to_hyp
    }

    pub fn hyp_to_base(&self) -> &[Option<usize>] {
        &self.hyp_to_base
    }

    pub fn hyp_of(&self, base: usize) -> Option<usize> {
        self.base_to_hyp.get(base).copied().flatten()
    }

    pub fn base_of(&self, hyp: usize) -> Option<usize> {
        self.hyp_to_base.get(hyp).copied().flatten()
    }

    pub fn is_identity(&self) -> bool {
        self.base_len() == self.hyp_len()
            && self
                .base_to_hyp
                .iter()
                .enumerate()
                .all(|(b, h)| *h == Some(b))
    }

    /// `width` new hypothesis-only rules at hypothesis index `at`.
    pub fn apply_insert(&mut self, at: usize, width: usize) {
        assert!(at <= self.hyp_len(), "insertion at {at} past end {}", self.hyp_len());
        let shift = PositionShift::Insert { at, width };
        for h in self.base_to_hyp.iter_mut().flatten() {
            *h = shift.apply_to_cut(*h);
        }
        self.hyp_to_base
            .splice(at..at, std::iter::repeat(None).take(width));
        self.assert_consistent();
    }

    /// Remove hypothesis rule `at`; returns the baseline rule it stood for.
    pub fn apply_delete(&mut self, at: usize) -> Option<usize> {
        assert!(at < self.hyp_len(), "deletion at {at} past end {}", self.hyp_len());
        let shift = PositionShift::Delete { at };
        for entry in self.base_to_hyp.iter_mut() {
            *entry = entry.and_then(|h| shift.apply(h));
        }
        let base = self.hyp_to_base.remove(at);
        self.assert_consistent();
        base
    }

    /// Move hypothesis rule `from` to `to`, keeping its baseline link.
    /// `to` is read after the removal.
    pub fn apply_relocate(&mut self, from: usize, to: usize) -> Option<usize> {
        let base = self.apply_delete(from);
        self.apply_insert(to, 1);
        if let Some(b) = base {
            self.base_to_hyp[b] = Some(to);
            self.hyp_to_base[to] = Some(b);
        }
        self.assert_consistent();
        base
    }

    fn assert_consistent(&self) {
        for (b, h) in self.base_to_hyp.iter().enumerate() {
            if let Some(h) = *h {
                assert_eq!(
                    self.hyp_to_base.get(h).copied().flatten(),
                    Some(b),
                    "rule index map: baseline {b} -> hypothesis {h} is not inverted"
                );
            }
        }
        for (h, b) in self.hyp_to_base.iter().enumerate() {
            if let Some(b) = *b {
                assert_eq!(
                    self.base_to_hyp.get(b).copied().flatten(),
                    Some(h),
                    "rule index map: hypothesis {h} -> baseline {b} is not inverted"
                );
            }
        }
    }
}
