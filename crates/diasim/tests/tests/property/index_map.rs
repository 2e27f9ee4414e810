//! Property tests: the rule index map shifts exactly as insertions and
//! deletions dictate and stays invertible.

use std::collections::BTreeSet;

use diasim_hypothesis::{GlobalTimeline, RuleIndexMap};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum MapEdit {
    Insert(usize, usize),
    Delete(usize),
    Relocate(usize, usize),
}

/// Raw edit seeds; positions are reduced modulo the live length when applied.
fn arb_seeds() -> impl Strategy<Value = Vec<(u8, usize, usize)>> {
    prop::collection::vec((0u8..3, any::<usize>(), 1usize..4), 0..12)
}

fn concretize(map: &RuleIndexMap, (kind, a, b): (u8, usize, usize)) -> Option<MapEdit> {
    let len = map.hyp_len();
    match kind {
        0 => Some(MapEdit::Insert(a % (len + 1), b)),
        1 if len > 0 => Some(MapEdit::Delete(a % len)),
        2 if len > 1 => {
            let from = a % len;
            let to = (from + b) % len;
            (from != to).then_some(MapEdit::Relocate(from, to))
        }
        _ => None,
    }
}

fn apply(map: &mut RuleIndexMap, edit: &MapEdit) {
    match *edit {
        MapEdit::Insert(at, width) => map.apply_insert(at, width),
        MapEdit::Delete(at) => {
            map.apply_delete(at);
        }
        MapEdit::Relocate(from, to) => {
            map.apply_relocate(from, to);
        }
    }
}

fn build(base_len: usize, seeds: Vec<(u8, usize, usize)>) -> RuleIndexMap {
    let mut map = RuleIndexMap::identity(base_len);
    for seed in seeds {
        if let Some(edit) = concretize(&map, seed) {
            apply(&mut map, &edit);
        }
    }
    map
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Insertion adds the width to every mapped position at or after it.
    #[test]
    fn insert_shifts_at_or_after(base_len in 0usize..15, seeds in arb_seeds(), at in any::<usize>(), width in 1usize..4) {
        let mut map = build(base_len, seeds);
        let at = at % (map.hyp_len() + 1);
        let before = map.base_to_hyp().to_vec();
        map.apply_insert(at, width);
        for (old, new) in before.iter().zip(map.base_to_hyp()) {
            let expected = old.map(|h| if h >= at { h + width } else { h });
            prop_assert_eq!(*new, expected);
        }
        for h in at..at + width {
            prop_assert_eq!(map.base_of(h), None);
        }
    }

    /// Deletion clears the deleted position and decrements everything after it.
    #[test]
    fn delete_shifts_after(base_len in 1usize..15, seeds in arb_seeds(), at in any::<usize>()) {
        let mut map = build(base_len, seeds);
        prop_assume!(map.hyp_len() > 0);
        let at = at % map.hyp_len();
        let before = map.base_to_hyp().to_vec();
        map.apply_delete(at);
        for (old, new) in before.iter().zip(map.base_to_hyp()) {
            let expected = old.and_then(|h| match h.cmp(&at) {
                std::cmp::Ordering::Less => Some(h),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(h - 1),
            });
            prop_assert_eq!(*new, expected);
        }
    }

    /// The two directions stay inverse and the end sentinels stay linked.
    #[test]
    fn map_stays_invertible(base_len in 0usize..15, seeds in arb_seeds()) {
        let map = build(base_len, seeds);
        prop_assert_eq!(map.base_len(), base_len);
        prop_assert_eq!(map.hyp_of(map.base_len()), Some(map.hyp_len()));
        for (b, h) in map.base_to_hyp().iter().enumerate() {
            if let Some(h) = h {
                prop_assert_eq!(map.base_of(*h), Some(b));
            }
        }
    }

    /// The merged timeline lists every baseline and hypothesis rule once.
    #[test]
    fn timeline_covers_each_rule_once(base_len in 0usize..15, seeds in arb_seeds()) {
        let map = build(base_len, seeds);
        let timeline = GlobalTimeline::build(&map, &BTreeSet::new());
        let (base_row, hyp_row) = timeline.correspondences();
        let mut base: Vec<usize> = base_row.into_iter().flatten().collect();
        let mut hyp: Vec<usize> = hyp_row.into_iter().flatten().collect();
        prop_assert!(base.windows(2).all(|w| w[0] < w[1]), "baseline order must be kept");
        base.sort_unstable();
        hyp.sort_unstable();
        prop_assert_eq!(base, (0..map.base_len()).collect::<Vec<_>>());
        prop_assert_eq!(hyp, (0..map.hyp_len()).collect::<Vec<_>>());
        for (h, &g) in timeline.hyp_to_global().iter().enumerate() {
            prop_assert_eq!(timeline.slots()[g].hyp, Some(h));
        }

        // The trace applies each side's rules in that side's own order.
        let trace = timeline.trace();
        let base_order: Vec<usize> = trace.iter().filter_map(|p| p.base).collect();
        let hyp_order: Vec<usize> = trace.iter().filter_map(|p| p.hyp).collect();
        prop_assert_eq!(base_order, (0..map.base_len()).collect::<Vec<_>>());
        prop_assert_eq!(hyp_order, (0..map.hyp_len()).collect::<Vec<_>>());
    }
}
