//! Trigger adapter: app metrics to achievement unlocks
//!
//! A fixed table maps each metric to the achievements it drives. Every
//! metric change re-evaluates the whole row for that metric; the tracker's
//! idempotence makes repeated evaluation free of duplicate effects.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;

use super::definitions::AchievementId;
use super::tracker::AchievementTracker;
use crate::engage::events::EngagementEvent;
use crate::engage::metrics::{AppMetrics, Metric};

/// One row of the trigger table
#[derive(Debug, Clone)]
pub struct Trigger {
    pub metric: Metric,
    pub achievement: AchievementId,
    pub threshold: u64,
    /// Progressive triggers forward the metric value as progress
    pub progressive: bool,
}

const fn progressive(metric: Metric, achievement: AchievementId, threshold: u64) -> Trigger {
    Trigger {
        metric,
        achievement,
        threshold,
        progressive: true,
    }
}

const fn flag(metric: Metric, achievement: AchievementId) -> Trigger {
    Trigger {
        metric,
        achievement,
        threshold: 1,
        progressive: false,
    }
}

/// The trigger table
pub static TRIGGERS: &[Trigger] = &[
    // Inventory
    progressive(Metric::ProductCount, AchievementId::FirstProduct, 1),
    progressive(Metric::ProductCount, AchievementId::Products10, 10),
    progressive(Metric::ProductCount, AchievementId::Products50, 50),
    progressive(Metric::ProductCount, AchievementId::Products200, 200),
    progressive(Metric::ProductCount, AchievementId::InventoryMaster, 500),
    // Sales
    progressive(Metric::BillCount, AchievementId::FirstBill, 1),
    progressive(Metric::BillCount, AchievementId::Sales10, 10),
    progressive(Metric::BillCount, AchievementId::Sales50, 50),
    progressive(Metric::BillCount, AchievementId::Sales100, 100),
    progressive(Metric::BillCount, AchievementId::Sales500, 500),
    progressive(Metric::BillCount, AchievementId::ShopMaster, 1000),
    progressive(Metric::TotalRevenue, AchievementId::Revenue10k, 10_000),
    progressive(Metric::TotalRevenue, AchievementId::Revenue100k, 100_000),
    progressive(Metric::TotalRevenue, AchievementId::Revenue1m, 1_000_000),
    // Customers
    progressive(Metric::CustomerCount, AchievementId::FirstCustomer, 1),
    progressive(Metric::CustomerCount, AchievementId::Customers10, 10),
    progressive(Metric::CustomerCount, AchievementId::Customers50, 50),
    progressive(Metric::CustomerCount, AchievementId::Customers100, 100),
    progressive(Metric::CustomerCount, AchievementId::CommunityPillar, 500),
    // Usage flags
    flag(Metric::VoiceBillingUsed, AchievementId::VoiceBilling),
    flag(Metric::VoiceSearchUsed, AchievementId::VoiceSearch),
    flag(Metric::DarkModeEnabled, AchievementId::DarkMode),
    flag(Metric::AdminUnlocked, AchievementId::AdminUnlocked),
    flag(Metric::BulkImportUsed, AchievementId::BulkImport),
    flag(Metric::LoyaltyActivated, AchievementId::LoyaltyProgram),
    flag(Metric::LowStockAlertSet, AchievementId::LowStockAlert),
    flag(Metric::ExportUsed, AchievementId::DataExport),
    // Usage counters
    progressive(Metric::KeyboardShortcutsUsed, AchievementId::ShortcutPro, 5),
    progressive(Metric::ConsecutiveDays, AchievementId::Consistent7, 7),
    progressive(Metric::FeaturesUsed, AchievementId::FeatureExplorer, 20),
];

static TRIGGERS_BY_METRIC: Lazy<HashMap<Metric, Vec<&'static Trigger>>> = Lazy::new(|| {
    let mut map: HashMap<Metric, Vec<&'static Trigger>> = HashMap::new();
    for trigger in TRIGGERS {
        map.entry(trigger.metric).or_default().push(trigger);
    }
    map
});

/// Triggers tied to one metric
pub fn triggers_for(metric: Metric) -> &'static [&'static Trigger] {
    TRIGGERS_BY_METRIC
        .get(&metric)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Re-evaluate every threshold tied to `metric` against its current value
pub fn evaluate_metric<Tz: TimeZone>(
    tracker: &mut AchievementTracker,
    metrics: &AppMetrics,
    metric: Metric,
    now: &DateTime<Tz>,
) -> Vec<EngagementEvent> {
    // Negative or NaN values saturate to 0
    let value = metrics.value(metric).floor() as u64;

    triggers_for(metric)
        .iter()
        .filter_map(|trigger| {
            if trigger.progressive {
                tracker.unlock(trigger.achievement, Some(value), now)
            } else if value >= trigger.threshold {
                tracker.unlock(trigger.achievement, None, now)
            } else {
                None
            }
        })
        .collect()
}

/// Re-evaluate the given metrics
pub fn evaluate_metrics<Tz: TimeZone>(
    tracker: &mut AchievementTracker,
    metrics: &AppMetrics,
    changed: &[Metric],
    now: &DateTime<Tz>,
) -> Vec<EngagementEvent> {
    changed
        .iter()
        .flat_map(|metric| evaluate_metric(tracker, metrics, *metric, now))
        .collect()
}

/// Re-evaluate every metric
pub fn evaluate_all<Tz: TimeZone>(
    tracker: &mut AchievementTracker,
    metrics: &AppMetrics,
    now: &DateTime<Tz>,
) -> Vec<EngagementEvent> {
    evaluate_metrics(tracker, metrics, Metric::all(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engage::achievements::definitions::Achievement;
    use chrono::Utc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_progressive_thresholds_match_targets() {
        for trigger in TRIGGERS.iter().filter(|t| t.progressive) {
            let def = Achievement::get(trigger.achievement).unwrap();
            assert_eq!(def.target, Some(trigger.threshold), "{}", trigger.achievement);
        }
        for trigger in TRIGGERS.iter().filter(|t| !t.progressive) {
            let def = Achievement::get(trigger.achievement).unwrap();
            assert_eq!(def.target, None, "{}", trigger.achievement);
        }
    }

    #[test]
    fn test_every_achievement_has_a_trigger() {
        for id in AchievementId::all() {
            assert!(TRIGGERS.iter().any(|t| t.achievement == *id), "{} has no trigger", id);
        }
    }

    #[test]
    fn test_one_metric_crossing_several_thresholds() {
        let mut tracker = AchievementTracker::default();
        let metrics = AppMetrics {
            bill_count: 12,
            ..Default::default()
        };
        let events = evaluate_metric(&mut tracker, &metrics, Metric::BillCount, &now());
        assert_eq!(events.len(), 2);
        assert!(tracker.is_unlocked(AchievementId::FirstBill));
        assert!(tracker.is_unlocked(AchievementId::Sales10));
        assert_eq!(tracker.get(AchievementId::Sales50).unwrap().progress, Some(12));
    }

    #[test]
    fn test_reevaluation_has_no_duplicate_effects() {
        let mut tracker = AchievementTracker::default();
        let metrics = AppMetrics {
            dark_mode_enabled: true,
            keyboard_shortcuts_used: 6,
            ..Default::default()
        };
        let first = evaluate_all(&mut tracker, &metrics, &now());
        let second = evaluate_all(&mut tracker, &metrics, &now());
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[test]
    fn test_flag_off_does_not_unlock() {
        let mut tracker = AchievementTracker::default();
        let events = evaluate_all(&mut tracker, &AppMetrics::default(), &now());
        assert!(events.is_empty());
        assert_eq!(tracker.unlocked_count(), 0);
    }

    #[test]
    fn test_revenue_uses_floor() {
        let mut tracker = AchievementTracker::default();
        let metrics = AppMetrics {
            total_revenue: 9_999.99,
            ..Default::default()
        };
        assert!(evaluate_metric(&mut tracker, &metrics, Metric::TotalRevenue, &now()).is_empty());
        assert_eq!(tracker.get(AchievementId::Revenue10k).unwrap().progress, Some(9_999));
    }
}
