use super::confidence::Confidence;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name substituted when a subject is renamed to the empty string
pub const DEFAULT_SUBJECT_NAME: &str = "Subject";

/// Subject count used when no snapshot exists yet
pub const DEFAULT_SUBJECT_COUNT: usize = 6;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier (e.g. one read back from a snapshot)
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Fresh identifier: millisecond timestamp plus random bits (UUID v7)
            pub fn generate() -> Self {
                Self(Uuid::now_v7().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Opaque subject identifier, unique within a store
    SubjectId
);
string_id!(
    /// Opaque dot point identifier, unique within its subject
    DotPointId
);

/// A single syllabus item being tracked for mastery.
///
/// Text is fixed at creation; only `confidence` changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotPoint {
    pub id: DotPointId,
    pub text: String,
    pub confidence: Confidence,
}

impl DotPoint {
    /// New dot point at `Unseen` with a generated id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: DotPointId::generate(),
            text: text.into(),
            confidence: Confidence::Unseen,
        }
    }
}

/// A subject column: a display name plus its dot points in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub dot_points: Vec<DotPoint>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubjectId::generate(),
            name: name.into(),
            dot_points: Vec::new(),
        }
    }

    pub fn dot_point(&self, dot_point_id: &DotPointId) -> Option<&DotPoint> {
        self.dot_points.iter().find(|dp| &dp.id == dot_point_id)
    }

    fn dot_point_mut(&mut self, dot_point_id: &DotPointId) -> Option<&mut DotPoint> {
        self.dot_points.iter_mut().find(|dp| &dp.id == dot_point_id)
    }

    /// Number of dot points at a mastered level
    pub fn mastered_count(&self) -> usize {
        self.dot_points
            .iter()
            .filter(|dp| dp.confidence.is_mastered())
            .count()
    }
}

/// Root aggregate for one learner session.
///
/// The serialized form is the persistence snapshot:
///
/// ```text
/// { "subjects": [{ "id", "name", "dotPoints": [{ "id", "text", "confidence" }] }],
///   "highlightMode" }
/// ```
///
/// Every mutation here is a plain in-memory change that reports whether anything
/// happened. Saving after a mutation is the job of
/// [`StoreManager`](crate::state::StoreManager).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub subjects: Vec<Subject>,

    /// UI-only flag; persisted, never read by progress or suggestions
    #[serde(default)]
    pub highlight_mode: bool,
}

impl Store {
    /// Store with `n` empty subjects named `Subject 1` .. `Subject n`
    pub fn initialize_default(n: usize) -> Self {
        Self {
            subjects: (1..=n)
                .map(|i| Subject::new(format!("{DEFAULT_SUBJECT_NAME} {i}")))
                .collect(),
            highlight_mode: false,
        }
    }

    pub fn subject(&self, subject_id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == subject_id)
    }

    pub fn subject_mut(&mut self, subject_id: &SubjectId) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| &s.id == subject_id)
    }

    pub fn dot_point(
        &self,
        subject_id: &SubjectId,
        dot_point_id: &DotPointId,
    ) -> Option<&DotPoint> {
        self.subject(subject_id)?.dot_point(dot_point_id)
    }

    /// Total dot points across all subjects
    pub fn dot_point_count(&self) -> usize {
        self.subjects.iter().map(|s| s.dot_points.len()).sum()
    }

    /// Every weak dot point with its owning subject, in store order
    pub fn weak_dot_points(&self) -> impl Iterator<Item = (&Subject, &DotPoint)> {
        self.subjects.iter().flat_map(|subject| {
            subject
                .dot_points
                .iter()
                .filter(|dp| dp.confidence.is_weak())
                .map(move |dp| (subject, dp))
        })
    }

    /// Append a new `Unseen` dot point to a subject.
    ///
    /// Returns `None` (and changes nothing) when the text is empty or
    /// whitespace-only, or when the subject does not exist. The text is stored
    /// as given; trimming is up to the caller.
    pub fn add_dot_point(&mut self, subject_id: &SubjectId, text: &str) -> Option<DotPointId> {
        if text.trim().is_empty() {
            return None;
        }

        let subject = self.subject_mut(subject_id)?;
        let dot_point = DotPoint::new(text);
        let id = dot_point.id.clone();
        subject.dot_points.push(dot_point);
        Some(id)
    }

    /// Remove a dot point, keeping the relative order of the rest
    pub fn remove_dot_point(
        &mut self,
        subject_id: &SubjectId,
        dot_point_id: &DotPointId,
    ) -> Option<DotPoint> {
        let subject = self.subject_mut(subject_id)?;
        let index = subject
            .dot_points
            .iter()
            .position(|dp| &dp.id == dot_point_id)?;
        Some(subject.dot_points.remove(index))
    }

    /// Overwrite a dot point's confidence, returning the previous level
    pub fn set_confidence(
        &mut self,
        subject_id: &SubjectId,
        dot_point_id: &DotPointId,
        level: Confidence,
    ) -> Option<Confidence> {
        let dot_point = self.subject_mut(subject_id)?.dot_point_mut(dot_point_id)?;
        Some(std::mem::replace(&mut dot_point.confidence, level))
    }

    /// Rename a subject; the empty string becomes [`DEFAULT_SUBJECT_NAME`].
    ///
    /// Returns `false` if the subject does not exist.
    pub fn rename_subject(&mut self, subject_id: &SubjectId, name: &str) -> bool {
        let Some(subject) = self.subject_mut(subject_id) else {
            return false;
        };

        subject.name = if name.is_empty() {
            DEFAULT_SUBJECT_NAME.to_string()
        } else {
            name.to_string()
        };
        true
    }

    /// Set the highlight flag, returning whether it changed
    pub fn set_highlight_mode(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.highlight_mode, enabled) != enabled
    }

    /// Flip the highlight flag, returning the new value
    pub fn toggle_highlight_mode(&mut self) -> bool {
        self.highlight_mode = !self.highlight_mode;
        self.highlight_mode
    }
}
