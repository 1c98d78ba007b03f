//! CLI command implementations

pub mod achievements;
pub mod challenges;
pub mod checkin;
pub mod init;
pub mod leaderboard;
pub mod record;
pub mod reset;
pub mod status;

use std::path::Path;

use anyhow::Result;

use khata_engage::engage::events::EngagementEvent;
use khata_engage::{Config, EngagementManager};

/// Load the config and open the engagement database it names
pub(crate) fn open_manager(config_path: Option<&Path>) -> Result<(Config, EngagementManager)> {
    let config = Config::load(config_path)?;
    let manager = EngagementManager::open(&config)?;
    Ok((config, manager))
}

/// Print one line per event, or nothing when there are none
pub(crate) fn print_events(events: &[EngagementEvent]) {
    for event in events {
        println!("  * {}", event.describe());
    }
}

/// Fixed-width text progress bar
pub(crate) fn progress_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
