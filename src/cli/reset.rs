//! Reset command implementation

use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use super::open_manager;

/// Delete all engagement progress. Requires `--yes`.
pub async fn reset_command(config_path: Option<&Path>, yes: bool) -> Result<()> {
    if !yes {
        bail!("This deletes all achievements, streaks and challenges.\nUse --yes to confirm.");
    }

    let (config, manager) = open_manager(config_path)?;
    manager.reset()?;
    info!(db = %config.database_path().display(), "Engagement state reset");
    println!("All engagement progress deleted.");
    Ok(())
}
