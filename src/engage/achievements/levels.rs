//! Points and level system
//!
//! Levels are linear: every 100 points is one level, starting at level 1.

/// Points needed per level
pub const POINTS_PER_LEVEL: u32 = 100;

/// Title band, active from `min_level` upwards
#[derive(Debug, Clone)]
pub struct LevelTitle {
    pub min_level: u32,
    pub title: &'static str,
}

/// Title bands (must be sorted by level)
pub static LEVEL_TITLES: &[LevelTitle] = &[
    LevelTitle {
        min_level: 1,
        title: "Newcomer",
    },
    LevelTitle {
        min_level: 3,
        title: "Shopkeeper",
    },
    LevelTitle {
        min_level: 6,
        title: "Merchant",
    },
    LevelTitle {
        min_level: 11,
        title: "Trader",
    },
    LevelTitle {
        min_level: 21,
        title: "Tycoon",
    },
];

/// Level for a points total: `floor(points / 100) + 1`
pub fn level_for_points(points: u32) -> u32 {
    points / POINTS_PER_LEVEL + 1
}

/// Title for a level
pub fn title_for_level(level: u32) -> &'static str {
    LEVEL_TITLES
        .iter()
        .rev()
        .find(|t| level >= t.min_level)
        .map(|t| t.title)
        .unwrap_or(LEVEL_TITLES[0].title)
}

/// Level standing derived from a points total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelProgress {
    pub total_points: u32,
    pub level: u32,
    pub title: &'static str,
    /// Points earned inside the current level
    pub points_in_level: u32,
    /// Points still needed to reach the next level
    pub points_to_next: u32,
}

impl LevelProgress {
    pub fn new(total_points: u32) -> Self {
        let level = level_for_points(total_points);
        let points_in_level = total_points % POINTS_PER_LEVEL;
        Self {
            total_points,
            level,
            title: title_for_level(level),
            points_in_level,
            points_to_next: POINTS_PER_LEVEL - points_in_level,
        }
    }

    /// Progress to next level (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        self.points_in_level as f32 / POINTS_PER_LEVEL as f32
    }
}
