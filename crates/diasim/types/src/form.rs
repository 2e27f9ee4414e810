use std::fmt;

use serde::{Deserialize, Serialize};

use crate::feature::FeatureValue;

/// A phone: printable symbol plus its fixed-length feature vector.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone {
    symbol: String,
    features: Vec<FeatureValue>,
}

impl Phone {
    pub fn new(symbol: impl Into<String>, features: Vec<FeatureValue>) -> Self {
        Self {
            symbol: symbol.into(),
            features,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn features(&self) -> &[FeatureValue] {
        &self.features
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Boundary {
    Word,
    Morpheme,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word => f.write_str("#"),
            Self::Morpheme => f.write_str("+"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Phone(Phone),
    Boundary(Boundary),
}

impl Segment {
    pub fn as_phone(&self) -> Option<&Phone> {
        match self {
            Self::Phone(p) => Some(p),
            Self::Boundary(_) => None,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phone(p) => p.fmt(f),
            Self::Boundary(b) => b.fmt(f),
        }
    }
}

/// A word form at some point in its history.
///
/// `Absent` marks an etymon with no attested form; every rule skips it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhonologicalForm {
    Present(Vec<Segment>),
    Absent,
}

impl PhonologicalForm {
    pub const ABSENT_MARK: &'static str = "...";

    pub fn new(segments: Vec<Segment>) -> Self {
        Self::Present(segments)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Segments of a present form; empty for the absent form.
    pub fn segments(&self) -> &[Segment] {
        match self {
            Self::Present(segments) => segments,
            Self::Absent => &[],
        }
    }

    pub fn phones(&self) -> impl Iterator<Item = &Phone> {
        self.segments().iter().filter_map(Segment::as_phone)
    }

    pub fn phone_count(&self) -> usize {
        self.phones().count()
    }

    /// Whether `sequence` occurs contiguously, boundaries included. Never
    /// true for an empty sequence.
    pub fn contains_sequence(&self, sequence: &[Segment]) -> bool {
        !sequence.is_empty()
            && self
                .segments()
                .windows(sequence.len())
                .any(|window| window == sequence)
    }

    /// Phone symbols only, boundaries dropped.
    pub fn phone_string(&self) -> String {
        match self {
            Self::Absent => Self::ABSENT_MARK.to_string(),
            Self::Present(_) => self.phones().map(Phone::symbol).collect(),
        }
    }
}

impl fmt::Display for PhonologicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str(Self::ABSENT_MARK),
            Self::Present(segments) => segments.iter().try_for_each(|s| s.fmt(f)),
        }
    }
}
