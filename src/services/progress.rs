//! Mastery percentage derived from confidence levels.
//!
//! Values are recomputed on every call and never stored.

use crate::models::{Store, Subject, SubjectId};
use indexmap::IndexMap;

/// Percentage (0..=100) of a subject's dot points at a mastered level.
///
/// A subject with no dot points is 0%. Ties round half up, so 1 of 8
/// (12.5%) reports 13.
pub fn progress(subject: &Subject) -> u8 {
    percent(subject.mastered_count(), subject.dot_points.len())
}

/// Progress of every subject, keyed by id in store order
pub fn progress_by_subject(store: &Store) -> IndexMap<SubjectId, u8> {
    store
        .subjects
        .iter()
        .map(|subject| (subject.id.clone(), progress(subject)))
        .collect()
}

/// Progress across all dot points of all subjects
pub fn overall_progress(store: &Store) -> u8 {
    let mastered = store.subjects.iter().map(Subject::mastered_count).sum();
    percent(mastered, store.dot_point_count())
}

fn percent(mastered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // round(100 * m / t) with ties up == floor((200m + t) / 2t)
    let rounded = (200 * mastered as u128 + total as u128) / (2 * total as u128);
    rounded.min(100) as u8
}
