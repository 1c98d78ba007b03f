//! Achievement State Tracker
//!
//! Owns the unlock/progress state of every catalog entry. State is merged
//! with its definition into one persisted [`AchievementRecord`] per entry.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::definitions::{
    Achievement, AchievementCategory, AchievementId, Badge, IconTag, ACHIEVEMENTS,
};
use super::levels::{level_for_points, LevelProgress};
use crate::engage::events::EngagementEvent;

/// Persisted achievement: definition merged with unlock state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: IconTag,
    pub points: u32,
    pub badge: Badge,
    pub category: AchievementCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub progress: Option<u64>,
}

impl AchievementRecord {
    /// Fresh locked record for a definition
    pub fn seed(def: &Achievement) -> Self {
        Self {
            id: def.id.as_str().to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            icon: def.icon,
            points: def.points,
            badge: def.badge,
            category: def.category,
            target: def.target,
            unlocked: false,
            unlocked_at: None,
            progress: Some(0),
        }
    }

    /// Copy the unlock state of `stored` onto this (catalog-fresh) record
    fn adopt_state(&mut self, stored: &StoredState) {
        self.unlocked = stored.unlocked;
        self.unlocked_at = stored.unlocked_at;
        self.progress = stored.progress.or(self.progress);
        // A record persisted as unlocked without a stamp keeps the invariant
        // by losing the unlock rather than inventing a time.
        if self.unlocked && self.unlocked_at.is_none() {
            self.unlocked = false;
        }
    }

    /// Progress fraction toward the target (0.0 - 1.0)
    pub fn progress_fraction(&self) -> f32 {
        if self.unlocked {
            return 1.0;
        }
        match (self.target, self.progress) {
            (Some(target), Some(progress)) if target > 0 => {
                (progress as f32 / target as f32).min(1.0)
            }
            _ => 0.0,
        }
    }
}

/// The unlock state read back from a stored entry. Presentation fields
/// come from the catalog, so a retired icon or badge cannot break loading.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    id: String,
    #[serde(default)]
    unlocked: bool,
    #[serde(default)]
    unlocked_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    progress: Option<u64>,
}

/// One persisted entry of the `achievements` array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredAchievement {
    Record(AchievementRecord),
    /// An entry unknown to the catalog, written back exactly as read
    Orphan(Value),
}

/// In-memory achievement state, loaded from and saved to the store
#[derive(Debug, Clone)]
pub struct AchievementTracker {
    records: Vec<AchievementRecord>,
    /// Persisted entries whose id is no longer in the catalog, or that
    /// could not be read. Kept as-is.
    orphans: Vec<Value>,
}

impl Default for AchievementTracker {
    fn default() -> Self {
        Self::initialize(None)
    }
}

impl AchievementTracker {
    /// Build tracker state from the persisted array, seeding every catalog
    /// entry that has no stored state. Each entry is read on its own, so
    /// one unreadable entry never costs the others their state.
    /// Idempotent: initializing from the output of [`Self::into_stored`]
    /// yields the same state.
    pub fn initialize(persisted: Option<Vec<Value>>) -> Self {
        let stored = persisted.unwrap_or_default();
        let mut records: Vec<AchievementRecord> =
            ACHIEVEMENTS.iter().map(AchievementRecord::seed).collect();

        let mut orphans = Vec::new();
        for entry in stored {
            let state = match serde_json::from_value::<StoredState>(entry.clone()) {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Unreadable achievement entry, keeping it untouched");
                    orphans.push(entry);
                    continue;
                }
            };
            match records.iter_mut().find(|r| r.id == state.id) {
                Some(fresh) => fresh.adopt_state(&state),
                None => orphans.push(entry),
            }
        }
        if !orphans.is_empty() {
            debug!(count = orphans.len(), "Keeping achievement records unknown to the catalog");
        }

        Self { records, orphans }
    }

    /// Record progress for, or unlock, an achievement.
    ///
    /// Returns the unlock event when this call performed the locked to
    /// unlocked transition, `None` otherwise.
    pub fn unlock<Tz: TimeZone>(
        &mut self,
        id: AchievementId,
        progress: Option<u64>,
        now: &DateTime<Tz>,
    ) -> Option<EngagementEvent> {
        let def = Achievement::get(id)?;
        let record = self.records.iter_mut().find(|r| r.id == id.as_str())?;

        match def.target {
            Some(target) => {
                let Some(progress) = progress else {
                    debug!(%id, "Progressive achievement needs a progress value, ignoring");
                    return None;
                };
                // Progress keeps tracking the latest metric, even after unlock
                record.progress = Some(progress);
                if progress < target || record.unlocked {
                    return None;
                }
            }
            None => {
                if record.unlocked {
                    return None;
                }
            }
        }

        record.unlocked = true;
        record.unlocked_at = Some(now.fixed_offset());
        info!(%id, points = def.points, "Achievement unlocked");

        Some(EngagementEvent::AchievementUnlocked {
            id,
            title: def.title,
            points: def.points,
        })
    }

    /// String-keyed variant of [`Self::unlock`]. Unknown ids are a no-op.
    pub fn unlock_key<Tz: TimeZone>(
        &mut self,
        key: &str,
        progress: Option<u64>,
        now: &DateTime<Tz>,
    ) -> Option<EngagementEvent> {
        let Some(id) = AchievementId::from_str(key) else {
            debug!(key, "Ignoring unlock for unknown achievement");
            return None;
        };
        self.unlock(id, progress, now)
    }

    /// Sum of points over unlocked entries
    pub fn total_points(&self) -> u32 {
        self.records
            .iter()
            .filter(|r| r.unlocked)
            .map(|r| r.points)
            .sum()
    }

    pub fn level(&self) -> u32 {
        level_for_points(self.total_points())
    }

    pub fn level_progress(&self) -> LevelProgress {
        LevelProgress::new(self.total_points())
    }

    pub fn unlocked_count(&self) -> usize {
        self.records.iter().filter(|r| r.unlocked).count()
    }

    pub fn get(&self, id: AchievementId) -> Option<&AchievementRecord> {
        self.records.iter().find(|r| r.id == id.as_str())
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.get(id).is_some_and(|r| r.unlocked)
    }

    /// Catalog records in catalog order
    pub fn records(&self) -> &[AchievementRecord] {
        &self.records
    }

    /// All entries for persistence, orphans included
    pub fn into_stored(self) -> Vec<StoredAchievement> {
        self.records
            .into_iter()
            .map(StoredAchievement::Record)
            .chain(self.orphans.into_iter().map(StoredAchievement::Orphan))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_initialize_seeds_everything_locked() {
        let tracker = AchievementTracker::initialize(None);
        assert_eq!(tracker.records().len(), ACHIEVEMENTS.len());
        assert!(tracker.records().iter().all(|r| !r.unlocked));
        assert!(tracker.records().iter().all(|r| r.progress == Some(0)));
        assert_eq!(tracker.total_points(), 0);
        assert_eq!(tracker.level(), 1);
    }

    fn stored_values(tracker: AchievementTracker) -> Vec<Value> {
        match serde_json::to_value(tracker.into_stored()).unwrap() {
            Value::Array(entries) => entries,
            other => panic!("expected an array, got {other}"),
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut tracker = AchievementTracker::initialize(None);
        tracker.unlock(AchievementId::DarkMode, None, &at(9));
        let saved = stored_values(tracker);

        let reloaded = AchievementTracker::initialize(Some(saved.clone()));
        assert!(reloaded.is_unlocked(AchievementId::DarkMode));
        assert_eq!(stored_values(reloaded), saved);
    }

    #[test]
    fn test_progressive_unlock_sequence() {
        let mut tracker = AchievementTracker::default();

        assert!(tracker.unlock(AchievementId::Sales10, Some(5), &at(9)).is_none());
        let record = tracker.get(AchievementId::Sales10).unwrap();
        assert!(!record.unlocked);
        assert_eq!(record.progress, Some(5));

        let event = tracker.unlock(AchievementId::Sales10, Some(10), &at(10));
        assert_eq!(
            event,
            Some(EngagementEvent::AchievementUnlocked {
                id: AchievementId::Sales10,
                title: "Getting Busy",
                points: 50,
            })
        );
        let stamped = tracker.get(AchievementId::Sales10).unwrap().unlocked_at;
        assert_eq!(stamped, Some(at(10).fixed_offset()));

        assert!(tracker.unlock(AchievementId::Sales10, Some(20), &at(11)).is_none());
        let record = tracker.get(AchievementId::Sales10).unwrap();
        assert!(record.unlocked);
        assert_eq!(record.progress, Some(20));
        assert_eq!(record.unlocked_at, stamped);
    }

    #[test]
    fn test_binary_unlock_is_idempotent() {
        let mut tracker = AchievementTracker::default();
        assert!(tracker.unlock(AchievementId::DarkMode, None, &at(9)).is_some());
        let first = tracker.get(AchievementId::DarkMode).unwrap().unlocked_at;

        assert!(tracker
            .unlock(AchievementId::DarkMode, None, &(at(9) + Duration::hours(5)))
            .is_none());
        assert_eq!(tracker.get(AchievementId::DarkMode).unwrap().unlocked_at, first);
    }

    #[test]
    fn test_progressive_without_progress_is_ignored() {
        let mut tracker = AchievementTracker::default();
        assert!(tracker.unlock(AchievementId::Sales10, None, &at(9)).is_none());
        assert!(!tracker.is_unlocked(AchievementId::Sales10));
    }

    #[test]
    fn test_unknown_key_is_noop() {
        let mut tracker = AchievementTracker::default();
        assert!(tracker.unlock_key("sales-9000", Some(9000), &at(9)).is_none());
        assert!(tracker.unlock_key("dark-mode", None, &at(9)).is_some());
    }

    #[test]
    fn test_total_points_matches_unlocked_sum() {
        let mut tracker = AchievementTracker::default();
        tracker.unlock(AchievementId::FirstBill, Some(1), &at(9));
        tracker.unlock(AchievementId::Sales10, Some(12), &at(9));
        tracker.unlock(AchievementId::DarkMode, None, &at(9));
        tracker.unlock(AchievementId::DarkMode, None, &at(10));

        let expected: u32 = tracker
            .records()
            .iter()
            .filter(|r| r.unlocked)
            .map(|r| r.points)
            .sum();
        assert_eq!(tracker.total_points(), expected);
        assert_eq!(tracker.total_points(), 10 + 50 + 5);
        assert_eq!(tracker.unlocked_count(), 3);
    }

    #[test]
    fn test_orphans_survive_reload() {
        let mut orphan = AchievementRecord::seed(&ACHIEVEMENTS[0]);
        orphan.id = "retired-badge".to_string();
        orphan.unlocked = true;
        orphan.unlocked_at = Some(at(1).fixed_offset());
        let orphan = serde_json::to_value(&orphan).unwrap();

        let tracker = AchievementTracker::initialize(Some(vec![orphan.clone()]));
        assert_eq!(tracker.total_points(), 0);
        assert!(stored_values(tracker).contains(&orphan));
    }

    #[test]
    fn test_retired_enum_values_do_not_wipe_unlocks() {
        let mut tracker = AchievementTracker::default();
        tracker.unlock(AchievementId::DarkMode, None, &at(9));
        tracker.unlock(AchievementId::FirstBill, Some(1), &at(9));
        let mut saved = stored_values(tracker);

        let retired = serde_json::json!({
            "id": "retired-x",
            "title": "Gone",
            "icon": "rocket",
            "badge": "mythril",
            "category": "seasonal",
            "points": 99,
            "unlocked": true,
        });
        saved.push(retired.clone());
        // A catalog entry whose stored icon no longer exists keeps its state
        if let Some(entry) = saved
            .iter_mut()
            .find(|e| e["id"] == "dark-mode")
        {
            entry["icon"] = Value::from("lantern");
        }

        let reloaded = AchievementTracker::initialize(Some(saved));
        assert_eq!(reloaded.unlocked_count(), 2);
        assert_eq!(reloaded.total_points(), 5 + 10);
        assert!(stored_values(reloaded).contains(&retired));
    }

    #[test]
    fn test_unreadable_entry_is_kept_verbatim() {
        let junk = Value::from("not a record");
        let tracker = AchievementTracker::initialize(Some(vec![junk.clone()]));
        assert_eq!(tracker.unlocked_count(), 0);
        assert!(stored_values(tracker).contains(&junk));
    }

    #[test]
    fn test_unlocked_without_stamp_is_relocked() {
        let mut stored = AchievementRecord::seed(Achievement::get(AchievementId::DarkMode).unwrap());
        stored.unlocked = true;

        let stored = serde_json::to_value(&stored).unwrap();
        let tracker = AchievementTracker::initialize(Some(vec![stored]));
        assert!(!tracker.is_unlocked(AchievementId::DarkMode));
    }
}
