use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::form::{Boundary, Phone, PhonologicalForm, Segment};
use crate::lexicon::Lexicon;

/// Tri-valued phonological feature.
///
/// The integer values (0, 1, 2) are the ones the distance metric works over,
/// so `Unspecified` sits halfway between the two specified poles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum FeatureValue {
    Negative = 0,
    Unspecified = 1,
    Positive = 2,
}

impl FeatureValue {
    pub fn as_int(self) -> u8 {
        self as u8
    }

    pub fn is_specified(self) -> bool {
        self != Self::Unspecified
    }

    /// Parse a single `+`, `-` or `0` mark.
    pub fn from_mark(mark: char) -> Result<Self, TypesError> {
        match mark {
            '+' => Ok(Self::Positive),
            '-' => Ok(Self::Negative),
            '0' => Ok(Self::Unspecified),
            other => Err(TypesError::InvalidFeatureMark(other)),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self {
            Self::Negative => '-',
            Self::Unspecified => '0',
            Self::Positive => '+',
        };
        write!(f, "{}", mark)
    }
}

/// A partial feature specification such as `[+syl, -cons]`.
///
/// Used both as a match pattern (every listed feature must agree) and as a
/// change set (listed features are overwritten).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    constraints: Vec<(usize, FeatureValue)>,
}

impl FeatureMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: usize, value: FeatureValue) -> Self {
        self.constraints.retain(|(i, _)| *i != feature);
        self.constraints.push((feature, value));
        self
    }

    /// Fully specified matrix matching exactly the given phone's features.
    pub fn of_phone(phone: &Phone) -> Self {
        Self {
            constraints: phone.features().iter().copied().enumerate().collect(),
        }
    }

    pub fn constraints(&self) -> &[(usize, FeatureValue)] {
        &self.constraints
    }

    pub fn matches(&self, phone: &Phone) -> bool {
        self.constraints
            .iter()
            .all(|(i, v)| phone.features().get(*i) == Some(v))
    }

    /// Features of `features` overwritten by this matrix.
    pub fn apply_to(&self, features: &[FeatureValue]) -> Vec<FeatureValue> {
        let mut out = features.to_vec();
        for (i, v) in &self.constraints {
            if let Some(slot) = out.get_mut(*i) {
                *slot = *v;
            }
        }
        out
    }
}

/// The phone symbol table: feature names plus the feature vector of every symbol.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeatureInventory {
    feature_names: Vec<String>,
    symbols: BTreeMap<String, Vec<FeatureValue>>,
}

impl FeatureInventory {
    pub fn new<I, S>(feature_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feature_names: feature_names.into_iter().map(Into::into).collect(),
            symbols: BTreeMap::new(),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    pub fn feature_index(&self, name: &str) -> Result<usize, TypesError> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| TypesError::UnknownFeature(name.to_string()))
    }

    /// Define a symbol from a mark string with one `+`/`-`/`0` per feature.
    pub fn define(&mut self, symbol: impl Into<String>, marks: &str) -> Result<(), TypesError> {
        let symbol = symbol.into();
        let features = marks
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(FeatureValue::from_mark)
            .collect::<Result<Vec<_>, _>>()?;
        if features.len() != self.feature_count() {
            return Err(TypesError::FeatureCountMismatch {
                symbol,
                expected: self.feature_count(),
                found: features.len(),
            });
        }
        self.symbols.insert(symbol, features);
        Ok(())
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>, marks: &str) -> Result<Self, TypesError> {
        self.define(symbol, marks)?;
        Ok(self)
    }

    pub fn phone(&self, symbol: &str) -> Result<Phone, TypesError> {
        self.symbols
            .get(symbol)
            .map(|features| Phone::new(symbol, features.clone()))
            .ok_or_else(|| TypesError::UnknownSymbol(symbol.to_string()))
    }

    /// Reverse lookup: the symbol whose feature vector is exactly `features`.
    pub fn phone_with_features(&self, features: &[FeatureValue]) -> Option<Phone> {
        self.symbols
            .iter()
            .find(|(_, f)| f.as_slice() == features)
            .map(|(s, f)| Phone::new(s.clone(), f.clone()))
    }

    /// Parse a comma separated matrix such as `+syl,-cons`.
    pub fn matrix(&self, spec: &str) -> Result<FeatureMatrix, TypesError> {
        let mut matrix = FeatureMatrix::new();
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let mut chars = item.chars();
            let mark = chars
                .next()
                .ok_or_else(|| TypesError::MalformedMatrix(spec.to_string()))?;
            let value = FeatureValue::from_mark(mark)?;
            let index = self.feature_index(chars.as_str())?;
            matrix = matrix.with(index, value);
        }
        if matrix.constraints().is_empty() {
            return Err(TypesError::MalformedMatrix(spec.to_string()));
        }
        Ok(matrix)
    }

    /// Parse a whitespace separated form: `# b u t ə #`.
    ///
    /// `#` is a word boundary, `+` a morpheme boundary and `...` the absent form.
    pub fn parse_form(&self, text: &str) -> Result<PhonologicalForm, TypesError> {
        let text = text.trim();
        if text == PhonologicalForm::ABSENT_MARK {
            return Ok(PhonologicalForm::Absent);
        }
        let segments = text
            .split_whitespace()
            .map(|token| match token {
                "#" => Ok(Segment::Boundary(Boundary::Word)),
                "+" => Ok(Segment::Boundary(Boundary::Morpheme)),
                symbol => self.phone(symbol).map(Segment::Phone),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PhonologicalForm::new(segments))
    }

    pub fn parse_lexicon<'a, I>(&self, lines: I) -> Result<Lexicon, TypesError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().map(|l| self.parse_form(l)).collect()
    }
}
