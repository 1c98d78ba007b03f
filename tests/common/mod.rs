//! Shared test utilities for engagement integration tests

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use khata_engage::config::EngagementSettings;
use khata_engage::engage::challenges::{ChallengeSelector, ChallengeTemplate};
use khata_engage::engage::leaderboard::PeerProfile;
use khata_engage::engage::EngageDb;
use khata_engage::{Config, EngagementManager};

/// Always picks the same templates, whatever the date
pub struct FixedSelector(pub Vec<&'static str>);

impl ChallengeSelector for FixedSelector {
    fn select(&self, _date: NaiveDate) -> Vec<&'static ChallengeTemplate> {
        self.0
            .iter()
            .map(|id| ChallengeTemplate::get(id).expect("unknown template id"))
            .collect()
    }
}

/// Config pointing at a database inside a fresh temp dir
pub fn temp_config() -> (TempDir, Config) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.engagement.installation_id = "integration-test".to_string();
    config.engagement.database_path = Some(dir.path().join("engage.db"));
    (dir, config)
}

/// Manager over `config`'s database with a bills + customers + products
/// challenge set
pub fn open_manager(config: &Config) -> EngagementManager {
    let db = EngageDb::open(&config.database_path()).expect("Failed to open db");
    let manager = EngagementManager::new(db, &config.engagement)
        .with_selector(FixedSelector(vec![
            "daily-bills-5",
            "daily-customers-3",
            "daily-products-5",
        ]));
    manager.initialize().expect("Failed to seed db");
    manager
}

pub fn in_memory_manager() -> EngagementManager {
    let db = EngageDb::open_in_memory().expect("Failed to open db");
    let settings = EngagementSettings {
        installation_id: "integration-test".to_string(),
        ..Default::default()
    };
    let manager = EngagementManager::new(db, &settings);
    manager.initialize().expect("Failed to seed db");
    manager
}

pub fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, day, hour, minute, 0).unwrap()
}

pub fn peer(id: &str, city: &str, points: u32) -> PeerProfile {
    PeerProfile {
        id: id.to_string(),
        name: format!("Owner {}", id),
        store_name: format!("Store {}", id),
        city: city.to_string(),
        points,
        level: points / 100 + 1,
        achievements_count: 0,
        streak: 0,
    }
}
