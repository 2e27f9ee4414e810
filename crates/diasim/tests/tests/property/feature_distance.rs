//! Property tests: feature edit distance behaves like a distance.

use diasim_metric::{phone_edit_distance, FeatureEditDistance, MetricConfig};
use diasim_rules::sample::SampleLanguage;
use diasim_types::PhonologicalForm;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const SYMBOLS: [&str; 21] = [
    "p", "t", "k", "b", "d", "g", "m", "n", "l", "ɫ", "r", "s", "z", "ʔ", "ɾ", "a", "e", "i", "o",
    "u", "ə",
];

/// A word of up to eight phones from the sample inventory.
fn arb_word() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(SYMBOLS.to_vec()), 0..8)
        .prop_map(|phones| format!("# {} #", phones.join(" ")))
}

fn parse(lang: &SampleLanguage, text: &str) -> PhonologicalForm {
    lang.inventory.parse_form(text).unwrap()
}

fn arb_weights() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1f64..4.0, 9)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Swapping the arguments never changes the distance.
    #[test]
    fn fed_is_symmetric(a in arb_word(), b in arb_word(), weights in arb_weights()) {
        let lang = diasim_tests::sample();
        let (x, y) = (parse(&lang, &a), parse(&lang, &b));
        for fed in [
            FeatureEditDistance::default(),
            FeatureEditDistance::new(&MetricConfig::weighted(weights)),
        ] {
            let xy = fed.distance(&x, &y).unwrap();
            let yx = fed.distance(&y, &x).unwrap();
            prop_assert!((xy - yx).abs() < 1e-9, "{} vs {}", xy, yx);
        }
    }

    /// Every form is at distance zero from itself and aligns onto itself.
    #[test]
    fn fed_identity(a in arb_word()) {
        let lang = diasim_tests::sample();
        let x = parse(&lang, &a);
        let outcome = FeatureEditDistance::default().compute(&x, &x).unwrap();
        prop_assert_eq!(outcome.distance, 0.0);
        let pairs: Vec<(usize, usize)> = outcome.alignment.pairs().collect();
        prop_assert_eq!(pairs.len(), x.phone_count());
        prop_assert!(pairs.iter().all(|(i, j)| i == j));
    }

    /// Bounded below by zero and above by deleting and reinserting everything.
    #[test]
    fn fed_bounds(a in arb_word(), b in arb_word()) {
        let lang = diasim_tests::sample();
        let (x, y) = (parse(&lang, &a), parse(&lang, &b));
        let fed = FeatureEditDistance::default();
        let d = fed.distance(&x, &y).unwrap();
        let ceiling: f64 = x.phones().chain(y.phones()).map(|p| fed.indel_cost(p)).sum();
        prop_assert!(d >= 0.0);
        prop_assert!(d <= ceiling + 1e-9);
    }

    /// Zero feature distance only between phone-identical forms.
    #[test]
    fn zero_distance_means_same_phones(a in arb_word(), b in arb_word()) {
        let lang = diasim_tests::sample();
        let (x, y) = (parse(&lang, &a), parse(&lang, &b));
        let d = FeatureEditDistance::default().distance(&x, &y).unwrap();
        let phones = phone_edit_distance(&x, &y).unwrap();
        prop_assert_eq!(d == 0.0, phones == 0);
    }

    /// Alignment arrays are padded to the longer side and mutually inverse.
    #[test]
    fn alignment_is_consistent(a in arb_word(), b in arb_word()) {
        let lang = diasim_tests::sample();
        let (x, y) = (parse(&lang, &a), parse(&lang, &b));
        let outcome = FeatureEditDistance::default().compute(&x, &y).unwrap();
        let alignment = outcome.alignment;
        prop_assert_eq!(alignment.len(), x.phone_count().max(y.phone_count()));
        for (i, j) in alignment.pairs() {
            prop_assert_eq!(alignment.right_to_left()[j], Some(i));
        }
    }
}
