//! Khata Engage - engagement engine for the shop app
//!
//! Turns everyday shop activity (bills, stock, customers, feature use) into
//! achievements, login streaks, daily challenges and leaderboard standing.
//!
//! ## Entry points
//!
//! 1. **Library**: [`engage::EngagementManager`] applies app events and
//!    returns what changed as [`engage::events::EngagementEvent`]s.
//!
//! 2. **CLI**: the `khata-engage` binary drives the same manager for
//!    scripting and local inspection.

pub mod config;
pub mod engage;

pub use config::Config;
pub use engage::{EngagementInput, EngagementManager, EngagementSnapshot};
