//! Check-in command implementation

use anyhow::Result;
use std::path::Path;

use khata_engage::EngagementInput;

use super::{open_manager, print_events};

/// Record today's app open and report the streak
pub async fn check_in_command(config_path: Option<&Path>) -> Result<()> {
    let (_config, manager) = open_manager(config_path)?;

    let before = manager.snapshot()?.streak;
    let events = manager.apply_event(EngagementInput::CheckIn)?;
    let streak = manager.snapshot()?.streak;

    if streak.last_check_in == before.last_check_in {
        println!("Already checked in today. Streak: {} day(s)", streak.current);
    } else if streak.current > 1 {
        println!("Streak extended: {} day(s)", streak.current);
    } else {
        println!("Streak started. Come back tomorrow to keep it going.");
    }

    print_events(&events);
    Ok(())
}
