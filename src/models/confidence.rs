use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Self-assessed mastery level of a dot point.
///
/// Variants are declared in progression order, so the derived `Ord` is the
/// lattice order: `Unseen < Learning < Memorised < ExamReady`.
///
/// The serialized form is the exact display label (`"Exam-ready"` keeps its hyphen).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Confidence {
    #[default]
    Unseen,
    Learning,
    Memorised,
    #[serde(rename = "Exam-ready")]
    ExamReady,
}

/// Error returned when parsing a label that is not one of the four levels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown confidence level: {0:?}")]
pub struct UnknownConfidence(pub String);

impl Confidence {
    /// All levels in progression order
    pub const ALL: [Confidence; 4] = [
        Confidence::Unseen,
        Confidence::Learning,
        Confidence::Memorised,
        Confidence::ExamReady,
    ];

    /// Weak items are the ones still worth suggesting for study
    pub fn is_weak(self) -> bool {
        matches!(self, Confidence::Unseen | Confidence::Learning)
    }

    /// Mastered items count toward subject progress
    pub fn is_mastered(self) -> bool {
        !self.is_weak()
    }

    /// Relative draw weight in the recommendation pool.
    ///
    /// Zero means the level never enters the pool.
    pub fn selection_weight(self) -> u32 {
        match self {
            Confidence::Unseen => 2,
            Confidence::Learning => 1,
            Confidence::Memorised | Confidence::ExamReady => 0,
        }
    }

    /// Wire/display label
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Unseen => "Unseen",
            Confidence::Learning => "Learning",
            Confidence::Memorised => "Memorised",
            Confidence::ExamReady => "Exam-ready",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = UnknownConfidence;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Confidence::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownConfidence(s.to_string()))
    }
}
