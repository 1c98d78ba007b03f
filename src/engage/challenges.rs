//! Daily Challenge System
//!
//! Every calendar day a fresh set of 3-4 challenges is drawn from a fixed
//! template catalog, one per challenge type. Unfinished challenges are not
//! carried over; the whole set is replaced at day rollover.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::calendar::{calendar_date, day_tag, next_midnight, parse_day_tag};
use super::events::EngagementEvent;
use super::metrics::{AppMetrics, Metric};

/// Smallest and largest daily set size
pub const MIN_DAILY_CHALLENGES: usize = 3;
pub const MAX_DAILY_CHALLENGES: usize = 4;

/// What a challenge measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeType {
    Sales,
    Inventory,
    Customers,
    Features,
    Streak,
}

impl ChallengeType {
    pub fn all() -> &'static [ChallengeType] {
        &[
            Self::Sales,
            Self::Inventory,
            Self::Customers,
            Self::Features,
            Self::Streak,
        ]
    }

    /// Metric whose value becomes the challenge progress
    pub fn metric(&self) -> Metric {
        match self {
            Self::Sales => Metric::BillCount,
            Self::Inventory => Metric::ProductCount,
            Self::Customers => Metric::CustomerCount,
            Self::Features => Metric::FeaturesUsed,
            Self::Streak => Metric::ConsecutiveDays,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Inventory => "Inventory",
            Self::Customers => "Customers",
            Self::Features => "Features",
            Self::Streak => "Streak",
        }
    }
}

/// Template a daily challenge is instantiated from
#[derive(Debug, Clone)]
pub struct ChallengeTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub target: u64,
    pub kind: ChallengeType,
}

/// All challenge templates
pub static CHALLENGE_TEMPLATES: &[ChallengeTemplate] = &[
    // === SALES ===
    ChallengeTemplate {
        id: "daily-bills-5",
        title: "Busy Counter",
        description: "Create 5 bills",
        points: 20,
        target: 5,
        kind: ChallengeType::Sales,
    },
    ChallengeTemplate {
        id: "daily-bills-10",
        title: "Rush Hour",
        description: "Create 10 bills",
        points: 35,
        target: 10,
        kind: ChallengeType::Sales,
    },
    ChallengeTemplate {
        id: "daily-bills-20",
        title: "Festival Day",
        description: "Create 20 bills",
        points: 60,
        target: 20,
        kind: ChallengeType::Sales,
    },
    // === INVENTORY ===
    ChallengeTemplate {
        id: "daily-products-5",
        title: "Restock",
        description: "Add 5 products",
        points: 20,
        target: 5,
        kind: ChallengeType::Inventory,
    },
    ChallengeTemplate {
        id: "daily-products-15",
        title: "New Arrivals",
        description: "Add 15 products",
        points: 45,
        target: 15,
        kind: ChallengeType::Inventory,
    },
    // === CUSTOMERS ===
    ChallengeTemplate {
        id: "daily-customers-3",
        title: "Friendly Face",
        description: "Add 3 customers",
        points: 20,
        target: 3,
        kind: ChallengeType::Customers,
    },
    ChallengeTemplate {
        id: "daily-customers-10",
        title: "Word of Mouth",
        description: "Add 10 customers",
        points: 50,
        target: 10,
        kind: ChallengeType::Customers,
    },
    // === FEATURES ===
    ChallengeTemplate {
        id: "daily-features-3",
        title: "Curious Keeper",
        description: "Use 3 different features",
        points: 15,
        target: 3,
        kind: ChallengeType::Features,
    },
    ChallengeTemplate {
        id: "daily-features-8",
        title: "Power Tour",
        description: "Use 8 different features",
        points: 40,
        target: 8,
        kind: ChallengeType::Features,
    },
    // === STREAK ===
    ChallengeTemplate {
        id: "daily-streak-2",
        title: "Come Back Tomorrow",
        description: "Keep a 2-day login streak",
        points: 15,
        target: 2,
        kind: ChallengeType::Streak,
    },
    ChallengeTemplate {
        id: "daily-streak-5",
        title: "Regular Hours",
        description: "Keep a 5-day login streak",
        points: 40,
        target: 5,
        kind: ChallengeType::Streak,
    },
];

impl ChallengeTemplate {
    pub fn get(id: &str) -> Option<&'static ChallengeTemplate> {
        CHALLENGE_TEMPLATES.iter().find(|t| t.id == id)
    }

    pub fn by_type(kind: ChallengeType) -> Vec<&'static ChallengeTemplate> {
        CHALLENGE_TEMPLATES.iter().filter(|t| t.kind == kind).collect()
    }

    /// Fresh challenge instance expiring at `expires_at`
    pub fn instantiate(&self, expires_at: DateTime<FixedOffset>) -> DailyChallenge {
        DailyChallenge {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            points: self.points,
            target: self.target,
            progress: 0,
            completed: false,
            kind: self.kind,
            expires_at,
        }
    }
}

/// Persisted daily challenge instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: u32,
    pub target: u64,
    pub progress: u64,
    pub completed: bool,
    #[serde(rename = "type")]
    pub kind: ChallengeType,
    pub expires_at: DateTime<FixedOffset>,
}

impl DailyChallenge {
    /// Progress percentage (0.0 - 1.0)
    pub fn progress_percent(&self) -> f32 {
        if self.completed || self.target == 0 {
            1.0
        } else {
            (self.progress as f32 / self.target as f32).min(1.0)
        }
    }
}

/// Picks the templates for a calendar day
pub trait ChallengeSelector {
    fn select(&self, date: NaiveDate) -> Vec<&'static ChallengeTemplate>;
}

/// Reproducible selection seeded by date and installation id.
///
/// Draws 3 or 4 distinct challenge types, then one template per type.
#[derive(Debug, Clone)]
pub struct SeededSelector {
    installation_id: String,
}

impl SeededSelector {
    pub fn new(installation_id: impl Into<String>) -> Self {
        Self {
            installation_id: installation_id.into(),
        }
    }

    fn seed_for(&self, date: NaiveDate) -> u64 {
        fnv1a64(format!("{}:{}", day_tag(date), self.installation_id).as_bytes())
    }
}

impl ChallengeSelector for SeededSelector {
    fn select(&self, date: NaiveDate) -> Vec<&'static ChallengeTemplate> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed_for(date));
        let count = rng.gen_range(MIN_DAILY_CHALLENGES..=MAX_DAILY_CHALLENGES);

        let mut kinds = ChallengeType::all().to_vec();
        kinds.shuffle(&mut rng);

        kinds
            .into_iter()
            .filter_map(|kind| ChallengeTemplate::by_type(kind).choose(&mut rng).copied())
            .take(count)
            .collect()
    }
}

/// 64-bit FNV-1a, stable across platforms and releases
pub(crate) fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

/// Today's challenge set plus its date tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyChallenges {
    date: Option<String>,
    challenges: Vec<DailyChallenge>,
}

impl DailyChallenges {
    /// Rebuild from the two persisted keys. A malformed date tag discards
    /// the stored set, so the next access regenerates it.
    pub fn from_parts(date: Option<String>, challenges: Option<Vec<DailyChallenge>>) -> Self {
        if let Some(tag) = date.as_deref().filter(|tag| parse_day_tag(tag).is_none()) {
            warn!(tag, "Malformed daily challenge date, discarding stored set");
            return Self::default();
        }
        Self {
            date,
            challenges: challenges.unwrap_or_default(),
        }
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn challenges(&self) -> &[DailyChallenge] {
        &self.challenges
    }

    /// Generate a new set unless one already exists for `now`'s calendar day.
    ///
    /// Returns `true` when a new set was generated.
    pub fn ensure_todays_set<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        selector: &dyn ChallengeSelector,
    ) -> bool {
        let today = calendar_date(now);
        let tag = day_tag(today);
        if self.date.as_deref() == Some(tag.as_str()) && !self.challenges.is_empty() {
            return false;
        }

        let expires_at = next_midnight(now);
        self.challenges = selector
            .select(today)
            .into_iter()
            .map(|template| template.instantiate(expires_at))
            .collect();
        info!(
            date = %tag,
            count = self.challenges.len(),
            previous = ?self.date,
            "Generated daily challenges"
        );
        self.date = Some(tag);
        true
    }

    /// Apply live metrics to every active challenge.
    ///
    /// Emits one `ChallengeCompleted` per false to true transition and a
    /// single `AllChallengesCompleted` when the completed count newly
    /// reaches the total.
    pub fn update_progress(
        &mut self,
        metrics: &AppMetrics,
        all_complete_bonus: u32,
    ) -> Vec<EngagementEvent> {
        let previously_completed = self.completed_count();
        let mut events = Vec::new();

        for challenge in &mut self.challenges {
            let value = metrics.value(challenge.kind.metric()).floor() as u64;
            challenge.progress = value;
            if value >= challenge.target && !challenge.completed {
                challenge.completed = true;
                debug!(id = %challenge.id, "Daily challenge completed");
                events.push(EngagementEvent::ChallengeCompleted {
                    id: challenge.id.clone(),
                    points: challenge.points,
                });
            }
        }

        let total = self.challenges.len();
        let completed = self.completed_count();
        if total > 0 && completed == total && previously_completed < total {
            info!(total, "All daily challenges completed");
            events.push(EngagementEvent::AllChallengesCompleted {
                bonus_points: all_complete_bonus,
            });
        }

        events
    }

    pub fn completed_count(&self) -> usize {
        self.challenges.iter().filter(|c| c.completed).count()
    }

    pub fn all_completed(&self) -> bool {
        !self.challenges.is_empty() && self.completed_count() == self.challenges.len()
    }

    /// Split into the persisted date tag and challenge list
    pub fn into_parts(self) -> (Option<String>, Vec<DailyChallenge>) {
        (self.date, self.challenges)
    }
}
