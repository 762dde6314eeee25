//! Data models for the dot-point tracker.
//!
//! - [`Confidence`]: the four ordered mastery levels and the weak/mastered split
//! - [`Store`]: subjects and their dot points; its serde form is the persistence snapshot
//! - [`TrackerSettings`]: user settings loaded from `tracker.yaml`
//!
//! The store is a plain owned value. Shared access, saving and change events
//! live in [`StoreManager`](crate::state::StoreManager).

pub mod confidence;
pub mod settings;
pub mod store;

pub use confidence::{Confidence, UnknownConfidence};
pub use settings::TrackerSettings;
pub use store::{
    DEFAULT_SUBJECT_COUNT, DEFAULT_SUBJECT_NAME, DotPoint, DotPointId, Store, Subject, SubjectId,
};
