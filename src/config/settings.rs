//! Profile and engine settings sections

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `[profile]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Stable id of this shop on leaderboards
    pub user_id: String,
    pub name: String,
    pub store_name: String,
    pub city: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            user_id: "local-shop".to_string(),
            name: "Shop Owner".to_string(),
            store_name: "My Store".to_string(),
            city: "Mumbai".to_string(),
        }
    }
}

/// `[engagement]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementSettings {
    /// Seeds daily challenge selection. Generated by `init`.
    pub installation_id: String,

    /// Rows shown before the "your position" entry
    pub leaderboard_size: usize,

    /// Bonus for completing every challenge of the day
    pub all_challenges_bonus: u32,

    /// Size of the locally generated peer pool
    pub synthetic_peers: usize,

    /// Override for the database location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self {
            installation_id: String::new(),
            leaderboard_size: 10,
            all_challenges_bonus: 50,
            synthetic_peers: 9,
            database_path: None,
        }
    }
}
