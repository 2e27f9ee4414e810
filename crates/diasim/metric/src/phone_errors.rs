use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use diasim_types::Lexicon;

use crate::evaluation::{EtymonScore, EvaluationReport};

/// How the words containing one phone fared against their references.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneErrorStats {
    /// Comparable words containing the phone.
    pub words: usize,
    /// Of those, words that miss their reference.
    pub missed_words: usize,
    /// Occurrences of the phone across those words.
    pub occurrences: usize,
    phone_distance_total: f64,
    feature_distance_total: f64,
}

impl PhoneErrorStats {
    /// Share of words with the phone that miss their reference.
    pub fn miss_likelihood(&self) -> Option<f64> {
        (self.words > 0).then(|| self.missed_words as f64 / self.words as f64)
    }

    /// Normalised phone edit distance of the containing words, counted once
    /// per occurrence of the phone.
    pub fn mean_phone_distance(&self) -> Option<f64> {
        (self.occurrences > 0).then(|| self.phone_distance_total / self.occurrences as f64)
    }

    /// Feature edit distance of the containing words, counted once per
    /// occurrence of the phone.
    pub fn mean_feature_distance(&self) -> Option<f64> {
        (self.occurrences > 0).then(|| self.feature_distance_total / self.occurrences as f64)
    }
}

/// Error statistics keyed by phone symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneErrorProfile {
    phones: BTreeMap<String, PhoneErrorStats>,
}

impl PhoneErrorProfile {
    pub fn get(&self, symbol: &str) -> Option<&PhoneErrorStats> {
        self.phones.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhoneErrorStats)> {
        self.phones.iter().map(|(symbol, stats)| (symbol.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    /// Phones from most to least likely to sit in a missed word; ties by
    /// symbol.
    pub fn by_miss_likelihood(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .iter()
            .filter_map(|(symbol, stats)| Some((symbol, stats.miss_likelihood()?)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Group the scores of `report` by the phones each etymon has in `lexicon`.
///
/// `lexicon` is usually the reference or the input of the scored stage.
/// Etyma without a comparable score are skipped.
pub fn phone_error_profile(lexicon: &Lexicon, report: &EvaluationReport) -> PhoneErrorProfile {
    let mut phones: BTreeMap<String, PhoneErrorStats> = BTreeMap::new();
    for (id, score) in report.scores() {
        let EtymonScore::Compared {
            phone_distance,
            feature_distance,
            reference_phones,
        } = score
        else {
            continue;
        };
        let Some(form) = lexicon.get(*id) else {
            continue;
        };
        let normalised = *phone_distance as f64 / (*reference_phones).max(1) as f64;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for phone in form.phones() {
            *counts.entry(phone.symbol()).or_default() += 1;
        }
        for (symbol, count) in counts {
            let stats = phones.entry(symbol.to_string()).or_default();
            stats.words += 1;
            stats.occurrences += count;
            if *phone_distance > 0 {
                stats.missed_words += 1;
            }
            stats.phone_distance_total += normalised * count as f64;
            stats.feature_distance_total += feature_distance * count as f64;
        }
    }
    tracing::debug!(phones = phones.len(), "Phone error profile built");
    PhoneErrorProfile { phones }
}
