use std::fmt;

use serde::{Deserialize, Serialize};

use crate::form::PhonologicalForm;

/// Stable etymon identifier: the insertion index in the input lexicon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EtymonId(pub usize);

impl EtymonId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EtymonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Forms indexed by etymon id, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    forms: Vec<PhonologicalForm>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, form: PhonologicalForm) -> EtymonId {
        self.forms.push(form);
        EtymonId(self.forms.len() - 1)
    }

    pub fn get(&self, id: EtymonId) -> Option<&PhonologicalForm> {
        self.forms.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EtymonId> {
        (0..self.forms.len()).map(EtymonId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EtymonId, &PhonologicalForm)> {
        self.forms.iter().enumerate().map(|(i, f)| (EtymonId(i), f))
    }

    pub fn forms(&self) -> &[PhonologicalForm] {
        &self.forms
    }

    /// Every etymon currently carrying exactly `form`.
    pub fn find(&self, form: &PhonologicalForm) -> Vec<EtymonId> {
        self.iter()
            .filter(|(_, f)| *f == form)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn absent_count(&self) -> usize {
        self.forms.iter().filter(|f| f.is_absent()).count()
    }
}

impl From<Vec<PhonologicalForm>> for Lexicon {
    fn from(forms: Vec<PhonologicalForm>) -> Self {
        Self { forms }
    }
}

impl FromIterator<PhonologicalForm> for Lexicon {
    fn from_iter<I: IntoIterator<Item = PhonologicalForm>>(iter: I) -> Self {
        Self {
            forms: iter.into_iter().collect(),
        }
    }
}
