//! Status command implementation

use anyhow::Result;
use std::path::Path;

use khata_engage::EngagementInput;

use super::{open_manager, print_events, progress_bar};

/// Show level, points, streak and today's challenges
pub async fn status_command(config_path: Option<&Path>) -> Result<()> {
    let (config, manager) = open_manager(config_path)?;

    // Make sure today's set exists before showing it
    let events = manager.apply_event(EngagementInput::RefreshChallenges)?;
    let snapshot = manager.snapshot()?;
    let level = &snapshot.level;

    println!("{} ({})\n", config.profile.store_name, config.profile.city);
    println!("  Level {} - {}", level.level, level.title);
    println!(
        "  {} {} / {} pts to next level",
        progress_bar(level.fraction(), 20),
        level.points_in_level,
        level.points_in_level + level.points_to_next
    );
    println!(
        "  Points: {} (achievements) + {} (bonus)",
        snapshot.points(),
        snapshot.bonus_points
    );
    println!(
        "  Achievements: {}/{}",
        snapshot.unlocked_achievements,
        snapshot.total_achievements()
    );
    println!(
        "  Streak: {} day(s), longest {}",
        snapshot.streak.current, snapshot.streak.longest
    );
    if let Some(next) = snapshot.streak.next_milestone() {
        println!("  Next milestone: {} days", next);
    }

    let done = snapshot.challenges.iter().filter(|c| c.completed).count();
    println!(
        "  Challenges today: {}/{} complete",
        done,
        snapshot.challenges.len()
    );

    if !events.is_empty() {
        println!();
        print_events(&events);
    }

    Ok(())
}
