//! Leaderboard ranking
//!
//! Merges the live current-user snapshot into a peer pool, filters by
//! scope, and assigns gap-free ranks. Peers come from a pluggable
//! [`PeerDataSource`]; the bundled [`SyntheticPeers`] stands in for a real
//! ranking service.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::achievements::{level_for_points, ACHIEVEMENTS};
use super::challenges::fnv1a64;

/// Default number of entries shown
pub const DEFAULT_TOP_N: usize = 10;

/// Which partition of the peer set is ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardScope {
    #[default]
    Global,
    City,
    Friends,
}

impl LeaderboardScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::City => "city",
            Self::Friends => "friends",
        }
    }
}

impl fmt::Display for LeaderboardScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown scope names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown leaderboard scope '{0}' (expected global, city or friends)")]
pub struct ParseScopeError(pub String);

impl FromStr for LeaderboardScope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "city" => Ok(Self::City),
            "friends" => Ok(Self::Friends),
            other => Err(ParseScopeError(other.to_string())),
        }
    }
}

/// Identity of the local shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub store_name: String,
    pub city: String,
}

/// A ranked participant as reported by a peer source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerProfile {
    pub id: String,
    pub name: String,
    pub store_name: String,
    pub city: String,
    pub points: u32,
    pub level: u32,
    pub achievements_count: u32,
    pub streak: u32,
}

/// Live numbers for the current user, taken from the trackers at call time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUserSnapshot {
    pub profile: UserProfile,
    pub points: u32,
    pub level: u32,
    pub achievements_count: u32,
    pub streak: u32,
}

impl CurrentUserSnapshot {
    fn as_peer(&self) -> PeerProfile {
        PeerProfile {
            id: self.profile.id.clone(),
            name: self.profile.name.clone(),
            store_name: self.profile.store_name.clone(),
            city: self.profile.city.clone(),
            points: self.points,
            level: self.level,
            achievements_count: self.achievements_count,
            streak: self.streak,
        }
    }
}

/// One row of a ranked view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub store_name: String,
    pub city: String,
    pub points: u32,
    pub level: u32,
    pub achievements_count: u32,
    pub streak: u32,
    /// 1-based
    pub rank: usize,
    pub is_current_user: bool,
}

/// The current user's row when it falls outside the top N
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPosition {
    pub entry: LeaderboardEntry,
    /// Entries ranked between the last shown row and the user
    pub hidden_above: usize,
}

/// Result of [`build_view`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardView {
    pub scope: LeaderboardScope,
    pub entries: Vec<LeaderboardEntry>,
    pub user_position: Option<UserPosition>,
    /// Size of the ranked set, current user included
    pub total_ranked: usize,
}

impl LeaderboardView {
    /// The current user's entry, wherever it is shown
    pub fn current_user(&self) -> Option<&LeaderboardEntry> {
        self.entries
            .iter()
            .find(|e| e.is_current_user)
            .or(self.user_position.as_ref().map(|p| &p.entry))
    }
}

/// Supplies the peer pool for ranking
pub trait PeerDataSource {
    fn fetch_peers(&self) -> Result<Vec<PeerProfile>>;
}

/// Fixed peer list
#[derive(Debug, Clone, Default)]
pub struct StaticPeers(pub Vec<PeerProfile>);

impl PeerDataSource for StaticPeers {
    fn fetch_peers(&self) -> Result<Vec<PeerProfile>> {
        Ok(self.0.clone())
    }
}

const PEER_NAMES: &[(&str, &str)] = &[
    ("Ramesh Gupta", "Gupta General Store"),
    ("Sunita Sharma", "Sharma Kirana"),
    ("Abdul Rahman", "Rahman Provisions"),
    ("Priya Nair", "Nair Fresh Mart"),
    ("Harpreet Singh", "Singh Traders"),
    ("Lakshmi Iyer", "Iyer Stores"),
    ("Vikram Patel", "Patel Supermart"),
    ("Meena Das", "Das Daily Needs"),
    ("Joseph Mathew", "Mathew Mini Mart"),
    ("Kavita Joshi", "Joshi Kirana"),
    ("Arjun Reddy", "Reddy Bazaar"),
    ("Farah Khan", "Khan Brothers"),
];

const PEER_CITIES: &[&str] = &[
    "Mumbai",
    "Delhi",
    "Bengaluru",
    "Pune",
    "Jaipur",
    "Kochi",
    "Lucknow",
    "Indore",
];

/// Deterministic synthetic peers for local use and tests.
///
/// Every third peer is placed in `home_city` so city views are populated.
#[derive(Debug, Clone)]
pub struct SyntheticPeers {
    pub seed: u64,
    pub count: usize,
    pub home_city: String,
    /// Points are drawn from `0..=points_ceiling`
    pub points_ceiling: u32,
}

impl SyntheticPeers {
    pub fn new(seed: u64, count: usize, home_city: impl Into<String>) -> Self {
        Self {
            seed,
            count,
            home_city: home_city.into(),
            points_ceiling: 2_000,
        }
    }

    /// Peer pool seeded from an installation id, stable across runs
    pub fn for_installation(installation_id: &str, count: usize, home_city: impl Into<String>) -> Self {
        Self::new(fnv1a64(installation_id.as_bytes()), count, home_city)
    }
}

impl PeerDataSource for SyntheticPeers {
    fn fetch_peers(&self) -> Result<Vec<PeerProfile>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let max_achievements = ACHIEVEMENTS.len() as u32;

        let peers = (0..self.count)
            .map(|i| {
                let (name, store_name) = PEER_NAMES[i % PEER_NAMES.len()];
                let city = if i % 3 == 0 {
                    self.home_city.clone()
                } else {
                    PEER_CITIES
                        .choose(&mut rng)
                        .copied()
                        .unwrap_or("Mumbai")
                        .to_string()
                };
                let points = rng.gen_range(0..=self.points_ceiling);
                PeerProfile {
                    id: format!("peer-{:03}", i + 1),
                    name: name.to_string(),
                    store_name: store_name.to_string(),
                    city,
                    points,
                    level: level_for_points(points),
                    achievements_count: rng.gen_range(0..=max_achievements),
                    streak: rng.gen_range(0..=45),
                }
            })
            .collect();
        Ok(peers)
    }
}

/// Rank the current user against peers from `source`.
///
/// Ordering is by points descending; equal points are ordered by ascending
/// id so ranks never depend on the order the source returned.
pub fn build_view(
    scope: LeaderboardScope,
    user: &CurrentUserSnapshot,
    source: &dyn PeerDataSource,
    friends: &HashSet<String>,
    top_n: usize,
) -> LeaderboardView {
    let pool = source.fetch_peers().unwrap_or_else(|e| {
        warn!(error = %e, %scope, "Peer source failed, ranking current user alone");
        Vec::new()
    });

    let mut ranked: Vec<PeerProfile> = pool
        .into_iter()
        // The live snapshot supersedes any stale copy of ourselves
        .filter(|peer| peer.id != user.profile.id)
        .filter(|peer| match scope {
            LeaderboardScope::Global => true,
            LeaderboardScope::City => peer.city == user.profile.city,
            LeaderboardScope::Friends => friends.contains(&peer.id),
        })
        .collect();
    ranked.push(user.as_peer());
    ranked.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.id.cmp(&b.id)));

    let total_ranked = ranked.len();
    let mut entries: Vec<LeaderboardEntry> = ranked
        .into_iter()
        .enumerate()
        .map(|(index, peer)| {
            let is_current_user = peer.id == user.profile.id;
            LeaderboardEntry {
                id: peer.id,
                name: peer.name,
                store_name: peer.store_name,
                city: peer.city,
                points: peer.points,
                level: peer.level,
                achievements_count: peer.achievements_count,
                streak: peer.streak,
                rank: index + 1,
                is_current_user,
            }
        })
        .collect();

    let user_rank = entries
        .iter()
        .position(|e| e.is_current_user)
        .map(|i| i + 1)
        .unwrap_or(total_ranked);

    let user_position = if user_rank > top_n {
        Some(UserPosition {
            entry: entries[user_rank - 1].clone(),
            hidden_above: user_rank - 1 - top_n,
        })
    } else {
        None
    };
    entries.truncate(top_n);

    LeaderboardView {
        scope,
        entries,
        user_position,
        total_ranked,
    }
}
