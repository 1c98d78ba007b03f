//! Login streak tracking
//!
//! One persisted [`StreakData`] record, advanced at most once per calendar
//! day with one-time bonuses at fixed milestones.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::calendar::{calendar_date, stored_calendar_date, yesterday};
use super::events::EngagementEvent;

/// Streak lengths that grant a one-time bonus
pub const STREAK_MILESTONES: [u32; 5] = [7, 14, 30, 60, 100];

/// Bonus points per milestone day
pub const MILESTONE_POINTS_PER_DAY: u32 = 10;

/// Persisted streak record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakData {
    pub current: u32,
    pub longest: u32,
    /// RFC 3339 timestamp of the last successful check-in
    pub last_check_in: Option<String>,
    /// Milestone values already rewarded
    pub milestones: BTreeSet<u32>,
}

/// What a check-in did to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInStatus {
    /// Already checked in today, nothing changed
    AlreadyCheckedIn,
    /// Yesterday was a check-in day, streak grew by one
    Extended,
    /// First check-in ever, or a gap broke the streak
    Started,
}

/// Outcome of [`StreakData::check_in`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub status: CheckInStatus,
    pub current: u32,
    pub events: Vec<EngagementEvent>,
}

impl CheckIn {
    /// Sum of milestone bonuses awarded by this check-in
    pub fn bonus_points(&self) -> u32 {
        self.events.iter().map(EngagementEvent::bonus_points).sum()
    }
}

/// Bonus for reaching a milestone
pub fn milestone_bonus(days: u32) -> u32 {
    days * MILESTONE_POINTS_PER_DAY
}

impl StreakData {
    /// Restore invariants on a record loaded from storage
    pub fn normalized(mut self) -> Self {
        self.longest = self.longest.max(self.current);
        self
    }

    /// Record a check-in at `now`
    pub fn check_in<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> CheckIn {
        let today = calendar_date(now);
        // Unparseable stamps count as "never checked in"
        let last_day = self
            .last_check_in
            .as_deref()
            .and_then(|stored| stored_calendar_date(stored, now));

        if last_day == Some(today) {
            return CheckIn {
                status: CheckInStatus::AlreadyCheckedIn,
                current: self.current,
                events: Vec::new(),
            };
        }

        let status = if last_day.is_some() && last_day == yesterday(today) {
            self.current += 1;
            CheckInStatus::Extended
        } else {
            if self.current > 0 {
                debug!(previous = self.current, "Streak broken, starting over");
            }
            self.current = 1;
            CheckInStatus::Started
        };

        self.last_check_in = Some(now.fixed_offset().to_rfc3339());
        self.longest = self.longest.max(self.current);

        let mut events = Vec::new();
        for milestone in STREAK_MILESTONES {
            if self.current == milestone && self.milestones.insert(milestone) {
                let bonus_points = milestone_bonus(milestone);
                info!(days = milestone, bonus_points, "Streak milestone reached");
                events.push(EngagementEvent::MilestoneReached {
                    days: milestone,
                    bonus_points,
                });
            }
        }

        CheckIn {
            status,
            current: self.current,
            events,
        }
    }

    /// Next milestone not yet rewarded, if any
    pub fn next_milestone(&self) -> Option<u32> {
        STREAK_MILESTONES
            .into_iter()
            .find(|m| *m > self.current && !self.milestones.contains(m))
    }

    /// Whether the streak survives a check-in on `now`'s day
    pub fn is_active<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let today = calendar_date(now);
        match self
            .last_check_in
            .as_deref()
            .and_then(|stored| stored_calendar_date(stored, now))
        {
            Some(last) => last == today || Some(last) == yesterday(today),
            None => false,
        }
    }
}
