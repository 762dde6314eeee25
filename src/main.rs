//! Dot-Point Tracker - command-line launcher.
//!
//! Loads settings from the config directory (first argument, default
//! `Tracker Data`), restores the saved store (or creates the default subjects),
//! then prints each subject's progress and today's focus list.
//!
//! # Execution Flow
//!
//! 1. Load `tracker.yaml` (defaults if missing)
//! 2. Initialize logging → `<config dir>/<log_dir>/dotpoint-tracker.<date>`
//! 3. Open the store through the JSON snapshot file
//! 4. Print progress per subject and the weighted suggestions

use anyhow::Result;
use clap::Parser;
use dotpoint_tracker::persistence::JsonFileGateway;
use dotpoint_tracker::{APP_NAME, ConfigManager, SaveStatus, StoreManager, VERSION, progress};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dotpoint-tracker")]
#[command(about = "Track dot-point confidence and suggest what to revise")]
#[command(version)]
struct Cli {
    /// Directory holding tracker.yaml, the snapshot and logs
    #[arg(default_value = "Tracker Data")]
    config_dir: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_manager = ConfigManager::new(cli.config_dir.as_str())?;
    let settings = config_manager.load_settings()?;

    let log_dir = config_manager.resolve(&settings.log_dir);
    let _guard = dotpoint_tracker::logging::setup_logging(
        &log_dir,
        APP_NAME,
        settings.debug_mode,
        settings.console_output,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let gateway = Arc::new(JsonFileGateway::new(config_manager.snapshot_path(&settings)));
    let (manager, status) = StoreManager::open(gateway, settings.default_subject_count);
    if let SaveStatus::Failed { reason } = &status {
        tracing::warn!("Default store could not be saved: {}", reason);
    }

    let store = manager.snapshot();
    println!("Progress");
    for subject in &store.subjects {
        println!("  {:<24} {:>3}%", subject.name, progress(subject));
    }

    let focus = manager.suggest_today(settings.suggestion_count);
    println!();
    println!("Today's focus");
    if focus.is_empty() {
        println!("  Great work! You have no weak dot points to revise!");
    }
    for suggestion in &focus {
        println!(
            "  [{}] {} ({})",
            suggestion.subject_name, suggestion.dot_point.text, suggestion.dot_point.confidence
        );
    }

    tracing::info!("Suggested {} dot points, shutting down", focus.len());
    Ok(())
}
