//! Outputs of the engagement engine
//!
//! These are the only externally observable effects of engine operations.
//! Presentation (toasts, confetti) is a downstream consumer.

use serde::Serialize;

use super::achievements::AchievementId;

/// An event produced by an engine operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngagementEvent {
    /// An achievement transitioned from locked to unlocked
    AchievementUnlocked {
        id: AchievementId,
        title: &'static str,
        points: u32,
    },
    /// A daily challenge transitioned to completed
    ChallengeCompleted { id: String, points: u32 },
    /// The login streak hit a milestone for the first time
    MilestoneReached { days: u32, bonus_points: u32 },
    /// Every challenge of today's set is complete (fires once per set)
    AllChallengesCompleted { bonus_points: u32 },
}

impl EngagementEvent {
    /// Bonus points carried by this event, excluding achievement points
    /// (those are derived from the achievement records).
    pub fn bonus_points(&self) -> u32 {
        match self {
            Self::AchievementUnlocked { .. } => 0,
            Self::ChallengeCompleted { points, .. } => *points,
            Self::MilestoneReached { bonus_points, .. } => *bonus_points,
            Self::AllChallengesCompleted { bonus_points } => *bonus_points,
        }
    }

    /// One-line human readable description
    pub fn describe(&self) -> String {
        match self {
            Self::AchievementUnlocked { title, points, .. } => {
                format!("Achievement unlocked: {} (+{} pts)", title, points)
            }
            Self::ChallengeCompleted { id, points } => {
                format!("Challenge completed: {} (+{} pts)", id, points)
            }
            Self::MilestoneReached { days, bonus_points } => {
                format!("{}-day streak milestone! (+{} pts)", days, bonus_points)
            }
            Self::AllChallengesCompleted { bonus_points } => {
                format!("All daily challenges completed! (+{} pts)", bonus_points)
            }
        }
    }
}
