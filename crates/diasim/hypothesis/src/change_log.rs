use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use diasim_types::RuleRef;

use crate::index_map::PositionShift;
use crate::timeline::GlobalTimeline;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Deletion,
    Insertion { rule: String },
}

/// One entry of the proposed change log.
///
/// `position` is a global slot of the comparison timeline: the slot of the
/// deleted or moved baseline rule for a deletion, the slot of the new
/// hypothesis rule for an insertion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposedChange {
    pub position: usize,
    pub kind: ChangeKind,
    pub annotation: String,
    pub recorded_at: DateTime<Utc>,
}

impl ProposedChange {
    pub fn is_deletion(&self) -> bool {
        matches!(self.kind, ChangeKind::Deletion)
    }
}

impl fmt::Display for ProposedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChangeKind::Deletion => write!(f, "{} : deletion", self.position)?,
            ChangeKind::Insertion { rule } => write!(f, "{} : insert {}", self.position, rule)?,
        }
        if !self.annotation.is_empty() {
            write!(f, " | {}", self.annotation)?;
        }
        Ok(())
    }
}

/// What an entry is pinned to while edits pile up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Anchor {
    /// A baseline rule deleted from the hypothesis or moved within it.
    Baseline(usize),
    /// A hypothesis rule that entered since the last accept.
    Hypothesis(usize),
}

#[derive(Clone, Debug)]
struct Entry {
    anchor: Anchor,
    change: ProposedChange,
}

/// Pending edits, ordered by slot of the comparison timeline.
///
/// Positions are refreshed by [`ProposedChangeLog::reposition`]; the engine
/// does so after every edit.
#[derive(Clone, Debug, Default)]
pub struct ProposedChangeLog {
    entries: Vec<Entry>,
}

impl ProposedChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProposedChange> {
        self.entries.iter().map(|e| &e.change)
    }

    pub fn entries(&self) -> Vec<&ProposedChange> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `(position, is_deletion)` pairs in log order.
    pub fn outline(&self) -> Vec<(usize, bool)> {
        self.iter().map(|c| (c.position, c.is_deletion())).collect()
    }

    pub fn render(&self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }

    /// Move hypothesis anchors the way `shift` moves hypothesis rules,
    /// dropping the one it removes.
    fn shift(&mut self, shift: PositionShift) {
        self.entries.retain_mut(|entry| match entry.anchor {
            Anchor::Hypothesis(hyp) => match shift.apply(hyp) {
                Some(moved) => {
                    entry.anchor = Anchor::Hypothesis(moved);
                    true
                }
                None => false,
            },
            Anchor::Baseline(_) => true,
        });
    }

    /// Record removal of hypothesis rule `hyp`, which stands for baseline
    /// rule `base` if any. A rule inserted or moved since the last accept
    /// loses its insertion entry; a baseline rule keeps a single tombstone.
    pub fn record_deletion(&mut self, hyp: usize, base: Option<usize>, annotation: &str) {
        self.shift(PositionShift::Delete { at: hyp });
        let Some(base) = base else {
            return;
        };
        if self.entries.iter().any(|e| e.anchor == Anchor::Baseline(base)) {
            return;
        }
        self.entries.push(Entry {
            anchor: Anchor::Baseline(base),
            change: ProposedChange {
                position: base,
                kind: ChangeKind::Deletion,
                annotation: annotation.to_string(),
                recorded_at: Utc::now(),
            },
        });
    }

    /// Record `rules` entering at hypothesis index `hyp`, one entry each.
    pub fn record_insertion(&mut self, hyp: usize, rules: &[RuleRef], annotation: &str) {
        self.shift(PositionShift::Insert {
            at: hyp,
            width: rules.len(),
        });
        let recorded_at = Utc::now();
        for (offset, rule) in rules.iter().enumerate() {
            self.entries.push(Entry {
                anchor: Anchor::Hypothesis(hyp + offset),
                change: ProposedChange {
                    position: hyp + offset,
                    kind: ChangeKind::Insertion { rule: rule.text() },
                    annotation: annotation.to_string(),
                    recorded_at,
                },
            });
        }
    }

    /// Place every entry on `timeline`, the one the comparison report uses.
    pub fn reposition(&mut self, timeline: &GlobalTimeline) {
        for entry in &mut self.entries {
            let global = match entry.anchor {
                Anchor::Baseline(base) => timeline.base_to_global().get(base),
                Anchor::Hypothesis(hyp) => timeline.hyp_to_global().get(hyp),
            };
            if let Some(&global) = global {
                entry.change.position = global;
            }
        }
        // Deletions sort ahead of insertions sharing a slot.
        self.entries
            .sort_by_key(|e| (e.change.position, !e.change.is_deletion()));
    }
}
