//! "Today's focus": weighted random picks from the weak dot points.
//!
//! Every `Unseen` or `Learning` dot point across all subjects enters the pool
//! with its [`selection_weight`](crate::models::Confidence::selection_weight)
//! (2 for `Unseen`, 1 for `Learning`). Each draw picks from the pool with
//! probability proportional to weight, then removes the pick, so a single
//! call never suggests the same dot point twice.
//!
//! Draws go through [`RandomSource`] so callers can supply a seeded RNG or a
//! scripted sequence.

use crate::models::{DotPoint, Store, Subject, SubjectId};
use rand::Rng;
use rand::rngs::ThreadRng;
use std::collections::VecDeque;

/// Suggestion count used by the focus panel
pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

/// Source of uniform draws for the selection algorithm
pub trait RandomSource {
    /// Uniform index in `0..upper`. Callers always pass `upper > 0`.
    fn next_index(&mut self, upper: usize) -> usize;
}

/// Adapter from any [`rand::Rng`]
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<ThreadRng> {
    /// Non-deterministic source backed by the thread-local RNG
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, upper: usize) -> usize {
        self.0.gen_range(0..upper)
    }
}

/// Replays a fixed sequence of draws.
///
/// Each value is reduced modulo the requested range; once the script runs out
/// every draw is 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<usize>,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedSource {
    fn next_index(&mut self, upper: usize) -> usize {
        self.draws.pop_front().map_or(0, |draw| draw % upper)
    }
}

/// One suggested dot point with the subject it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub dot_point: DotPoint,
}

struct Candidate<'a> {
    subject: &'a Subject,
    dot_point: &'a DotPoint,
    weight: usize,
}

/// Pick up to `k` weak dot points, weighted toward `Unseen`, without replacement.
///
/// Results are in draw order. An empty result means there is nothing weak to
/// study. The index drawn on each round selects from the pool as if every
/// candidate were repeated `weight` times in store order.
pub fn suggest<R>(store: &Store, k: usize, rng: &mut R) -> Vec<Suggestion>
where
    R: RandomSource + ?Sized,
{
    let mut pool: Vec<Candidate<'_>> = store
        .weak_dot_points()
        .map(|(subject, dot_point)| Candidate {
            subject,
            dot_point,
            weight: dot_point.confidence.selection_weight() as usize,
        })
        .collect();

    let draws = k.min(pool.len());
    let mut picks = Vec::with_capacity(draws);

    for _ in 0..draws {
        let total: usize = pool.iter().map(|c| c.weight).sum();
        let mut remaining = rng.next_index(total).min(total - 1);

        let index = pool
            .iter()
            .position(|candidate| {
                if remaining < candidate.weight {
                    true
                } else {
                    remaining -= candidate.weight;
                    false
                }
            })
            .unwrap_or(pool.len() - 1);

        let chosen = pool.remove(index);
        picks.push(Suggestion {
            subject_id: chosen.subject.id.clone(),
            subject_name: chosen.subject.name.clone(),
            dot_point: chosen.dot_point.clone(),
        });
    }

    tracing::debug!(
        "Suggested {} of {} requested dot points ({} weak remaining)",
        picks.len(),
        k,
        pool.len()
    );

    picks
}
