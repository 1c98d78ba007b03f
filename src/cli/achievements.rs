//! Achievements command implementation

use anyhow::Result;
use std::path::Path;

use khata_engage::engage::achievements::AchievementCategory;

use super::{open_manager, progress_bar};

/// List achievements grouped by category
pub async fn achievements_command(config_path: Option<&Path>, unlocked_only: bool) -> Result<()> {
    let (_config, manager) = open_manager(config_path)?;
    let snapshot = manager.snapshot()?;

    println!(
        "Achievements ({}/{} unlocked, {} pts):",
        snapshot.unlocked_achievements,
        snapshot.total_achievements(),
        snapshot.points()
    );

    for category in AchievementCategory::all() {
        let records: Vec<_> = snapshot
            .achievements
            .iter()
            .filter(|a| a.category == *category)
            .filter(|a| !unlocked_only || a.unlocked)
            .collect();
        if records.is_empty() {
            continue;
        }

        println!("\n{}", category.label());
        for record in records {
            let mark = if record.unlocked { "x" } else { " " };
            println!(
                "  [{}] {} (+{} pts) - {}",
                mark, record.title, record.points, record.description
            );
            if let (Some(target), false) = (record.target, record.unlocked) {
                println!(
                    "      {} {}/{}",
                    progress_bar(record.progress_fraction(), 20),
                    record.progress.unwrap_or(0).min(target),
                    target
                );
            }
            if let Some(at) = record.unlocked_at {
                println!("      Unlocked {}", at.format("%Y-%m-%d %H:%M"));
            }
        }
    }

    Ok(())
}
