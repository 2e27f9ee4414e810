use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::lexicon::Lexicon;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    /// Checkpoint with a reference lexicon.
    Gold,
    /// Checkpoint without one.
    Black,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gold => f.write_str("Gold"),
            Self::Black => f.write_str("Black"),
        }
    }
}

/// A named cut through the cascade, taken once `position` rules have applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    name: String,
    kind: StageKind,
    position: usize,
    reference: Option<Lexicon>,
}

impl Stage {
    pub fn gold(name: impl Into<String>, position: usize, reference: Lexicon) -> Self {
        Self {
            name: name.into(),
            kind: StageKind::Gold,
            position,
            reference: Some(reference),
        }
    }

    pub fn black(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            kind: StageKind::Black,
            position,
            reference: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reference(&self) -> Option<&Lexicon> {
        self.reference.as_ref()
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

/// Stage declarations in non-decreasing position order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stages {
    stages: Vec<Stage>,
}

impl Stages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the next stage, returning its index.
    pub fn declare(&mut self, stage: Stage) -> Result<usize, TypesError> {
        if let Some(previous) = self.stages.last() {
            if stage.position < previous.position {
                return Err(TypesError::StageOrder {
                    name: stage.name,
                    position: stage.position,
                    previous: previous.position,
                });
            }
        }
        self.stages.push(stage);
        Ok(self.stages.len() - 1)
    }

    pub fn with_stage(mut self, stage: Stage) -> Result<Self, TypesError> {
        self.declare(stage)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.stages.iter().map(Stage::position).collect()
    }

    /// The same stages re-declared at new positions.
    pub fn with_positions(&self, positions: &[usize]) -> Result<Stages, TypesError> {
        if positions.len() != self.stages.len() {
            return Err(TypesError::StageCount {
                expected: self.stages.len(),
                found: positions.len(),
            });
        }
        self.stages
            .iter()
            .zip(positions)
            .try_fold(Stages::new(), |acc, (stage, &p)| {
                acc.with_stage(stage.clone().with_position(p))
            })
    }

    /// Check positions against a cascade and references against the input size.
    pub fn validate(&self, cascade_len: usize, lexicon_len: usize) -> Result<(), TypesError> {
        for stage in &self.stages {
            if stage.position > cascade_len {
                return Err(TypesError::StagePosition {
                    name: stage.name.clone(),
                    position: stage.position,
                    cascade_len,
                });
            }
            if let Some(reference) = &stage.reference {
                if reference.len() != lexicon_len {
                    return Err(TypesError::ReferenceSize {
                        name: stage.name.clone(),
                        expected: lexicon_len,
                        found: reference.len(),
                    });
                }
            }
        }
        Ok(())
    }
}
