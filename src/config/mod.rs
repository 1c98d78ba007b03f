//! Configuration loading and management

mod io;
mod settings;

pub use settings::{EngagementSettings, ProfileConfig};

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engage::leaderboard::UserProfile;

/// Invalid configuration values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("leaderboard_size must be at least 1")]
    InvalidLeaderboardSize,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Friend id '{0}' is the local user id")]
    SelfFriend(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Peer ids forming the friends relation for the friends leaderboard
    #[serde(default)]
    pub friends: Vec<String>,

    /// Identity of this shop on leaderboards
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Engine settings
    #[serde(default)]
    pub engagement: EngagementSettings,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engagement.leaderboard_size == 0 {
            return Err(ConfigError::InvalidLeaderboardSize);
        }
        if self.profile.user_id.trim().is_empty() {
            return Err(ConfigError::MissingField("profile.user_id".to_string()));
        }
        if let Some(me) = self.friends.iter().find(|f| **f == self.profile.user_id) {
            return Err(ConfigError::SelfFriend(me.clone()));
        }
        Ok(())
    }

    /// Profile as used by the leaderboard
    pub fn user_profile(&self) -> UserProfile {
        UserProfile {
            id: self.profile.user_id.clone(),
            name: self.profile.name.clone(),
            store_name: self.profile.store_name.clone(),
            city: self.profile.city.clone(),
        }
    }

    pub fn friend_set(&self) -> HashSet<String> {
        self.friends.iter().cloned().collect()
    }

    /// Database path, honoring the override
    pub fn database_path(&self) -> PathBuf {
        self.engagement
            .database_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("engage.db"))
    }
}
