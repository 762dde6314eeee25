// Dot-Point Tracker - syllabus mastery tracking with weighted study suggestions
//
// This is the library crate containing the mastery model, progress metric,
// recommendation engine and persistence contract. The binary crate (main.rs)
// is a thin launcher that prints progress and today's focus.

pub mod config;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{Confidence, DotPoint, DotPointId, Store, Subject, SubjectId, TrackerSettings};
pub use persistence::{JsonFileGateway, PersistenceError, SnapshotGateway};
pub use services::{RandomSource, Suggestion, progress, suggest};
pub use state::{Mutation, SaveStatus, StoreChange, StoreManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
