//! Services module - read-only computations over a [`Store`](crate::models::Store).
//!
//! # Components
//!
//! - [`progress`]: mastery percentage per subject (and overall)
//! - [`recommend`]: weighted selection without replacement of weak dot points
//!   for "today's focus"
//!
//! Both are pure with respect to the store: they never mutate it and never
//! cache results, so they can be called after any mutation without
//! invalidation. Randomness in [`recommend::suggest`] comes from the caller via
//! [`RandomSource`].
//!
//! # Usage Example
//!
//! ```ignore
//! use dotpoint_tracker::services::{progress, suggest, RngSource};
//!
//! for subject in &store.subjects {
//!     println!("{}: {}%", subject.name, progress(subject));
//! }
//!
//! let focus = suggest(&store, 3, &mut RngSource::thread());
//! ```

pub mod progress;
pub mod recommend;

pub use progress::{overall_progress, progress, progress_by_subject};
pub use recommend::{
    DEFAULT_SUGGESTION_COUNT, RandomSource, RngSource, ScriptedSource, Suggestion, suggest,
};
