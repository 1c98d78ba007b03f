//! Leaderboard command implementation

use anyhow::{Context, Result};
use std::path::Path;

use khata_engage::engage::leaderboard::{LeaderboardEntry, LeaderboardScope, SyntheticPeers};

use super::open_manager;

/// Show a ranked leaderboard for `scope`
pub async fn leaderboard_command(config_path: Option<&Path>, scope: &str) -> Result<()> {
    let scope = scope.parse::<LeaderboardScope>().context("Invalid --scope")?;
    let (config, manager) = open_manager(config_path)?;

    let peers = SyntheticPeers::for_installation(
        &config.engagement.installation_id,
        config.engagement.synthetic_peers,
        config.profile.city.clone(),
    );
    let view = manager.leaderboard(
        scope,
        config.user_profile(),
        &peers,
        &config.friend_set(),
        config.engagement.leaderboard_size,
    )?;

    println!("Leaderboard ({}, {} ranked):\n", view.scope, view.total_ranked);
    for entry in &view.entries {
        print_entry(entry);
    }
    if let Some(position) = &view.user_position {
        if position.hidden_above > 0 {
            println!("   ... {} more", position.hidden_above);
        }
        print_entry(&position.entry);
    }

    Ok(())
}

fn print_entry(entry: &LeaderboardEntry) {
    let you = if entry.is_current_user { " (you)" } else { "" };
    println!(
        "  {:>3}. {:<20} {:<16} {:>6} pts  L{:<3} {:>3}d{}",
        entry.rank, entry.store_name, entry.city, entry.points, entry.level, entry.streak, you
    );
}
