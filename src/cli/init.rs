//! Init command implementation

use anyhow::{bail, Result};
use std::path::Path;

use khata_engage::{Config, EngagementManager};

/// Create the config file (with a fresh installation id) and seed the
/// engagement database. Defaults to ~/.khata/config.toml.
pub async fn init_command(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let mut config = Config::default();
    config.ensure_generated();
    config.save_to_file(&config_path)?;
    println!("Created: {}", config_path.display());

    let manager = EngagementManager::open(&config)?;
    let snapshot = manager.snapshot()?;
    println!(
        "Engagement database ready: {} ({} achievements)",
        config.database_path().display(),
        snapshot.total_achievements()
    );

    Ok(())
}

