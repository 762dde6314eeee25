use super::store::DEFAULT_SUBJECT_COUNT;
use crate::services::recommend::DEFAULT_SUGGESTION_COUNT;
use serde::{Deserialize, Serialize};

/// Tracker settings from `tracker.yaml`
///
/// Every field has a default, so a partial or empty file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Snapshot file, relative paths resolve against the config directory
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Subjects created when no snapshot exists yet
    #[serde(default = "default_subject_count")]
    pub default_subject_count: usize,

    /// How many dot points "today's focus" suggests
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default = "default_console_output")]
    pub console_output: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            default_subject_count: default_subject_count(),
            suggestion_count: default_suggestion_count(),
            log_dir: default_log_dir(),
            debug_mode: false,
            console_output: default_console_output(),
        }
    }
}

fn default_snapshot_path() -> String {
    "dotpoints.json".to_string()
}

fn default_subject_count() -> usize {
    DEFAULT_SUBJECT_COUNT
}

fn default_suggestion_count() -> usize {
    DEFAULT_SUGGESTION_COUNT
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_console_output() -> bool {
    true
}
