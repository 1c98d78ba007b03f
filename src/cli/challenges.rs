//! Challenges command implementation

use anyhow::Result;
use std::path::Path;

use khata_engage::EngagementInput;

use super::{open_manager, print_events, progress_bar};

/// Show today's daily challenges
pub async fn challenges_command(config_path: Option<&Path>) -> Result<()> {
    let (_config, manager) = open_manager(config_path)?;

    let events = manager.apply_event(EngagementInput::RefreshChallenges)?;
    let snapshot = manager.snapshot()?;

    if snapshot.challenges.is_empty() {
        println!("No challenges today.");
        return Ok(());
    }

    println!(
        "Daily challenges ({}):\n",
        snapshot.challenges_date.as_deref().unwrap_or("today")
    );
    for challenge in &snapshot.challenges {
        let mark = if challenge.completed { "x" } else { " " };
        println!(
            "  [{}] {} (+{} pts) [{}]",
            mark,
            challenge.title,
            challenge.points,
            challenge.kind.label()
        );
        println!("      {}", challenge.description);
        println!(
            "      {} {}/{}",
            progress_bar(challenge.progress_percent(), 20),
            challenge.progress.min(challenge.target),
            challenge.target
        );
    }
    if let Some(first) = snapshot.challenges.first() {
        println!("\n  Resets at {}", first.expires_at.format("%Y-%m-%d %H:%M"));
    }

    print_events(&events);
    Ok(())
}
