//! Engagement engine for the shop app
//!
//! Achievements, login streaks, daily challenges and leaderboards, stored
//! in a SQLite key-value database (`~/.khata/engage.db`).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐
//! │ Billing / Stock │   │   Customers     │   │  App check-in   │
//! │   (metrics)     │   │   (metrics)     │   │                 │
//! └────────┬────────┘   └────────┬────────┘   └────────┬────────┘
//!          └──────────────┬──────┴─────────────────────┘
//!                         ▼
//!              EngagementManager::apply_event
//!          (one transaction, one writer at a time)
//!                         ▼
//!                ~/.khata/engage.db
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engage = EngagementManager::open(&config)?;
//!
//! let events = engage.apply_event(EngagementInput::Metrics(metrics))?;
//! let events = engage.apply_event(EngagementInput::CheckIn)?;
//! let snapshot = engage.snapshot()?;
//! ```

pub mod achievements;
pub mod calendar;
pub mod challenges;
mod db;
pub mod events;
pub mod leaderboard;
pub mod metrics;
pub mod streaks;

pub use db::{keys, EngageDb};

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use rusqlite::Connection;
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, EngagementSettings};
use achievements::{evaluate_all, evaluate_metrics, AchievementRecord, AchievementTracker, LevelProgress};
use challenges::{ChallengeSelector, DailyChallenge, DailyChallenges, SeededSelector};
use db::{get_json, put_json};
use events::EngagementEvent;
use leaderboard::{build_view, CurrentUserSnapshot, LeaderboardScope, LeaderboardView, PeerDataSource, UserProfile};
use metrics::{AppMetrics, Metric};
use streaks::StreakData;

/// Something that happened in the app
#[derive(Debug, Clone, PartialEq)]
pub enum EngagementInput {
    /// One or more app metrics have new values
    Metrics(AppMetrics),
    /// The user opened the app
    CheckIn,
    /// A view showing today's challenges opened
    RefreshChallenges,
}

/// Read-only view over all engagement state
#[derive(Debug, Clone)]
pub struct EngagementSnapshot {
    pub level: LevelProgress,
    pub achievements: Vec<AchievementRecord>,
    pub unlocked_achievements: usize,
    pub streak: StreakData,
    pub challenges_date: Option<String>,
    pub challenges: Vec<DailyChallenge>,
    /// Milestone and challenge bonuses, on top of achievement points
    pub bonus_points: u32,
}

impl EngagementSnapshot {
    /// Achievement points
    pub fn points(&self) -> u32 {
        self.level.total_points
    }

    pub fn total_achievements(&self) -> usize {
        self.achievements.len()
    }
}

/// Single entry point for every engagement read and write
pub struct EngagementManager {
    db: EngageDb,
    selector: Box<dyn ChallengeSelector + Send + Sync>,
    all_challenges_bonus: u32,
}

impl EngagementManager {
    pub fn new(db: EngageDb, settings: &EngagementSettings) -> Self {
        Self {
            db,
            selector: Box::new(SeededSelector::new(settings.installation_id.clone())),
            all_challenges_bonus: settings.all_challenges_bonus,
        }
    }

    /// Open the database named by the config
    pub fn open(config: &Config) -> Result<Self> {
        let db = EngageDb::open(&config.database_path())?;
        let manager = Self::new(db, &config.engagement);
        manager.initialize()?;
        Ok(manager)
    }

    /// Replace the daily challenge selector
    pub fn with_selector(mut self, selector: impl ChallengeSelector + Send + Sync + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Seed achievement records if none exist. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        self.db.write(|tx| {
            if get_json::<Vec<Value>>(tx, keys::ACHIEVEMENTS)?.is_none() {
                debug!("Seeding achievement records");
                let tracker = AchievementTracker::initialize(None);
                put_json(tx, keys::ACHIEVEMENTS, &tracker.into_stored())?;
            }
            Ok(())
        })
    }

    /// Apply an input at the current local time
    pub fn apply_event(&self, input: EngagementInput) -> Result<Vec<EngagementEvent>> {
        self.apply_event_at(input, &Local::now())
    }

    /// Apply an input at `now`. All reads and writes happen in one
    /// transaction.
    pub fn apply_event_at<Tz: TimeZone>(
        &self,
        input: EngagementInput,
        now: &DateTime<Tz>,
    ) -> Result<Vec<EngagementEvent>> {
        self.db.write(|tx| {
            let mut state = State::load(tx)?;
            let events = match input {
                EngagementInput::Metrics(metrics) => state.on_metrics(metrics, now, self),
                EngagementInput::CheckIn => state.on_check_in(now, self),
                EngagementInput::RefreshChallenges => state.on_refresh(now, self),
            };
            state.bonus_points += events.iter().map(EngagementEvent::bonus_points).sum::<u32>();
            state.save(tx)?;
            Ok(events)
        })
    }

    /// Current state without changing anything
    pub fn snapshot(&self) -> Result<EngagementSnapshot> {
        self.db.read(|conn| {
            let state = State::load(conn)?;
            let level = state.tracker.level_progress();
            let unlocked_achievements = state.tracker.unlocked_count();
            let (challenges_date, challenges) = state.challenges.into_parts();
            Ok(EngagementSnapshot {
                level,
                achievements: state.tracker.records().to_vec(),
                unlocked_achievements,
                streak: state.streak,
                challenges_date,
                challenges,
                bonus_points: state.bonus_points,
            })
        })
    }

    /// Metrics from the last `Metrics` input, if any
    pub fn last_metrics(&self) -> Result<Option<AppMetrics>> {
        self.db.read(|conn| get_json(conn, keys::LAST_METRICS))
    }

    /// Rank the current user, using tracker values read at call time
    pub fn leaderboard(
        &self,
        scope: LeaderboardScope,
        profile: UserProfile,
        source: &dyn PeerDataSource,
        friends: &HashSet<String>,
        top_n: usize,
    ) -> Result<LeaderboardView> {
        let snapshot = self.snapshot()?;
        let user = CurrentUserSnapshot {
            profile,
            points: snapshot.points(),
            level: snapshot.level.level,
            achievements_count: snapshot.unlocked_achievements as u32,
            streak: snapshot.streak.current,
        };
        Ok(build_view(scope, &user, source, friends, top_n))
    }

    /// Delete all engagement state
    pub fn reset(&self) -> Result<()> {
        self.db.reset()?;
        self.initialize()
    }
}

/// Everything one operation reads and writes
struct State {
    tracker: AchievementTracker,
    streak: StreakData,
    challenges: DailyChallenges,
    last_metrics: Option<AppMetrics>,
    bonus_points: u32,
}

impl State {
    fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            tracker: AchievementTracker::initialize(get_json(conn, keys::ACHIEVEMENTS)?),
            streak: get_json::<StreakData>(conn, keys::LOGIN_STREAK)?
                .unwrap_or_default()
                .normalized(),
            challenges: DailyChallenges::from_parts(
                get_json(conn, keys::DAILY_CHALLENGES_DATE)?,
                get_json(conn, keys::DAILY_CHALLENGES)?,
            ),
            last_metrics: get_json(conn, keys::LAST_METRICS)?,
            bonus_points: get_json::<u32>(conn, keys::BONUS_POINTS)?.unwrap_or(0),
        })
    }

    fn save(self, conn: &Connection) -> Result<()> {
        put_json(conn, keys::ACHIEVEMENTS, &self.tracker.into_stored())?;
        put_json(conn, keys::LOGIN_STREAK, &self.streak)?;
        let (date, challenges) = self.challenges.into_parts();
        if let Some(date) = date {
            put_json(conn, keys::DAILY_CHALLENGES_DATE, &date)?;
            put_json(conn, keys::DAILY_CHALLENGES, &challenges)?;
        }
        if let Some(metrics) = &self.last_metrics {
            put_json(conn, keys::LAST_METRICS, metrics)?;
        }
        put_json(conn, keys::BONUS_POINTS, &self.bonus_points)
    }

    /// Reported metrics with the streak counter folded in
    fn effective(&self, metrics: &AppMetrics) -> AppMetrics {
        AppMetrics {
            consecutive_days: metrics.consecutive_days.max(u64::from(self.streak.current)),
            ..metrics.clone()
        }
    }

    fn on_metrics<Tz: TimeZone>(
        &mut self,
        metrics: AppMetrics,
        now: &DateTime<Tz>,
        manager: &EngagementManager,
    ) -> Vec<EngagementEvent> {
        // Check every threshold, not just changed metrics: a re-seeded or
        // newly added achievement has to catch up with settled values.
        let current = self.effective(&metrics);
        let mut events = evaluate_all(&mut self.tracker, &current, now);
        self.challenges.ensure_todays_set(now, manager.selector.as_ref());
        events.extend(
            self.challenges
                .update_progress(&current, manager.all_challenges_bonus),
        );
        self.last_metrics = Some(metrics);
        events
    }

    fn on_check_in<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        manager: &EngagementManager,
    ) -> Vec<EngagementEvent> {
        let check_in = self.streak.check_in(now);
        let mut events = check_in.events;

        // The streak length can unlock achievements and streak challenges
        let current = self.effective(&self.last_metrics.clone().unwrap_or_default());
        events.extend(evaluate_metrics(
            &mut self.tracker,
            &current,
            &[Metric::ConsecutiveDays],
            now,
        ));
        self.challenges.ensure_todays_set(now, manager.selector.as_ref());
        events.extend(
            self.challenges
                .update_progress(&current, manager.all_challenges_bonus),
        );
        events
    }

    fn on_refresh<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        manager: &EngagementManager,
    ) -> Vec<EngagementEvent> {
        if !self.challenges.ensure_todays_set(now, manager.selector.as_ref()) {
            return Vec::new();
        }
        // A fresh set may already be satisfied by the last known metrics
        match &self.last_metrics {
            Some(metrics) => {
                let current = self.effective(metrics);
                self.challenges
                    .update_progress(&current, manager.all_challenges_bonus)
            }
            None => Vec::new(),
        }
    }
}
