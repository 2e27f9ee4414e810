use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::index_map::RuleIndexMap;

/// One position of the merged baseline/hypothesis rule timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub base: Option<usize>,
    pub hyp: Option<usize>,
}

impl Slot {
    pub fn is_matched(&self) -> bool {
        self.base.is_some() && self.hyp.is_some()
    }

    /// `g[b|h]`, with `-1` for a missing side.
    pub fn label(&self, global: usize) -> String {
        format!(
            "{}[{}|{}]",
            global,
            index_label(self.base),
            index_label(self.hyp)
        )
    }
}

pub(crate) fn index_label(index: Option<usize>) -> String {
    index.map_or_else(|| "-1".to_string(), |i| i.to_string())
}

/// Where one side applies a rule, in the order the two runs are compared.
///
/// A relocated rule has two points sharing its slot: the baseline half at
/// its baseline position and the hypothesis half at its hypothesis position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracePoint {
    pub global: usize,
    pub base: Option<usize>,
    pub hyp: Option<usize>,
}

impl TracePoint {
    pub fn label(&self) -> String {
        Slot {
            base: self.base,
            hyp: self.hyp,
        }
        .label(self.global)
    }
}

/// Every baseline rule and every hypothesis rule, each exactly once.
///
/// Slots follow baseline order. Hypothesis-only rules follow the matched
/// slot of the hypothesis rule just before them. A relocated rule keeps one
/// matched slot at its baseline position; the trace splits it in two.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTimeline {
    slots: Vec<Slot>,
    base_to_global: Vec<usize>,
    hyp_to_global: Vec<usize>,
    trace: Vec<TracePoint>,
    base_to_trace: Vec<usize>,
    hyp_to_trace: Vec<usize>,
    moved: BTreeSet<usize>,
}

/// Entry of the split sequence, before slot numbers are known.
#[derive(Clone, Copy)]
enum Half {
    Matched(usize, usize),
    Base(usize),
    Hyp(usize),
}

impl GlobalTimeline {
    /// `relocated` holds baseline indices of rules moved by a relocation.
    /// A rule whose hypothesis position breaks baseline order is treated as
    /// moved even when it is missing from the set.
    pub fn build(map: &RuleIndexMap, relocated: &BTreeSet<usize>) -> Self {
        let (base_len, hyp_len) = (map.base_len(), map.hyp_len());
        let mut last = None;
        let split: Vec<bool> = (0..base_len)
            .map(|base| match map.hyp_of(base) {
                Some(hyp)
                    if !relocated.contains(&base) && last.map_or(true, |l| hyp > l) =>
                {
                    last = Some(hyp);
                    false
                }
                _ => true,
            })
            .collect();
        let paired = |base: usize| map.hyp_of(base).filter(|_| !split[base]);
        let unpaired_hyp = |hyp: usize| map.base_of(hyp).map_or(true, |b| split[b]);

        // Paired rules appear in the same relative order on both sides, so
        // one walk in baseline order places every hypothesis-only run.
        let mut halves = Vec::with_capacity(base_len + hyp_len);
        let push_run = |halves: &mut Vec<Half>, from: usize| {
            let mut hyp = from;
            while hyp < hyp_len && unpaired_hyp(hyp) {
                halves.push(Half::Hyp(hyp));
                hyp += 1;
            }
        };
        push_run(&mut halves, 0);
        for base in 0..base_len {
            match paired(base) {
                Some(hyp) => {
                    halves.push(Half::Matched(base, hyp));
                    push_run(&mut halves, hyp + 1);
                }
                None => halves.push(Half::Base(base)),
            }
        }

        let mut timeline = Self {
            slots: Vec::with_capacity(halves.len()),
            base_to_global: vec![0; base_len],
            hyp_to_global: vec![0; hyp_len],
            trace: Vec::with_capacity(halves.len()),
            base_to_trace: vec![0; base_len],
            hyp_to_trace: vec![0; hyp_len],
            moved: BTreeSet::new(),
        };
        for half in &halves {
            let global = timeline.slots.len();
            match *half {
                Half::Matched(base, hyp) => {
                    timeline.base_to_global[base] = global;
                    timeline.hyp_to_global[hyp] = global;
                    timeline.slots.push(Slot {
                        base: Some(base),
                        hyp: Some(hyp),
                    });
                }
                Half::Base(base) => {
                    timeline.base_to_global[base] = global;
                    if map.hyp_of(base).is_some() {
                        timeline.moved.insert(global);
                    }
                    timeline.slots.push(Slot {
                        base: Some(base),
                        hyp: map.hyp_of(base),
                    });
                }
                Half::Hyp(hyp) if map.base_of(hyp).is_none() => {
                    timeline.hyp_to_global[hyp] = global;
                    timeline.slots.push(Slot {
                        base: None,
                        hyp: Some(hyp),
                    });
                }
                Half::Hyp(_) => {}
            }
        }
        for half in halves {
            let (global, base, hyp) = match half {
                Half::Matched(base, hyp) => (timeline.base_to_global[base], Some(base), Some(hyp)),
                Half::Base(base) => (timeline.base_to_global[base], Some(base), None),
                Half::Hyp(hyp) => {
                    let global = match map.base_of(hyp) {
                        Some(moved) => timeline.base_to_global[moved],
                        None => timeline.hyp_to_global[hyp],
                    };
                    timeline.hyp_to_global[hyp] = global;
                    (global, None, Some(hyp))
                }
            };
            let index = timeline.trace.len();
            if let Some(base) = base {
                timeline.base_to_trace[base] = index;
            }
            if let Some(hyp) = hyp {
                timeline.hyp_to_trace[hyp] = index;
            }
            timeline.trace.push(TracePoint { global, base, hyp });
        }
        debug_assert_eq!(
            timeline.slots.iter().filter(|s| s.hyp.is_some()).count(),
            hyp_len
        );
        timeline
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, global: usize) -> Option<&Slot> {
        self.slots.get(global)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn base_to_global(&self) -> &[usize] {
        &self.base_to_global
    }

    pub fn hyp_to_global(&self) -> &[usize] {
        &self.hyp_to_global
    }

    /// The two correspondence rows: the baseline index and the hypothesis
    /// index at each global slot.
    pub fn correspondences(&self) -> (Vec<Option<usize>>, Vec<Option<usize>>) {
        self.slots.iter().map(|s| (s.base, s.hyp)).unzip()
    }

    /// Whether the slot holds a rule the hypothesis applies elsewhere.
    pub fn is_moved(&self, global: usize) -> bool {
        self.moved.contains(&global)
    }

    /// Rule applications of both runs in comparison order.
    pub fn trace(&self) -> &[TracePoint] {
        &self.trace
    }

    /// Trace index before which a baseline cut point falls.
    pub fn base_cut(&self, position: usize) -> usize {
        self.base_to_trace
            .get(position)
            .copied()
            .unwrap_or(self.trace.len())
    }

    pub fn hyp_cut(&self, position: usize) -> usize {
        self.hyp_to_trace
            .get(position)
            .copied()
            .unwrap_or(self.trace.len())
    }
}
