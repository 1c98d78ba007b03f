//! Achievements: catalog, unlock state, levels and metric triggers

mod definitions;
mod levels;
mod tracker;
mod triggers;

pub use definitions::{
    Achievement, AchievementCategory, AchievementId, Badge, IconTag, ACHIEVEMENTS,
};
pub use levels::{level_for_points, title_for_level, LevelProgress, POINTS_PER_LEVEL};
pub use tracker::{AchievementRecord, AchievementTracker, StoredAchievement};
pub use triggers::{evaluate_all, evaluate_metric, evaluate_metrics, triggers_for, Trigger, TRIGGERS};
