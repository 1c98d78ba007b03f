//! Input signals from the shop-management screens
//!
//! The billing, inventory and customer subsystems push these counters and
//! usage flags into the engine. Their own storage is out of scope here.

use serde::{Deserialize, Serialize};

/// Snapshot of every app metric the engine reacts to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetrics {
    pub product_count: u64,
    pub bill_count: u64,
    pub customer_count: u64,
    pub total_revenue: f64,
    pub voice_billing_used: bool,
    pub voice_search_used: bool,
    pub dark_mode_enabled: bool,
    pub admin_unlocked: bool,
    pub bulk_import_used: bool,
    pub loyalty_activated: bool,
    pub low_stock_alert_set: bool,
    pub export_used: bool,
    pub keyboard_shortcuts_used: u64,
    pub consecutive_days: u64,
    pub features_used: u64,
}

/// Name of a single metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ProductCount,
    BillCount,
    CustomerCount,
    TotalRevenue,
    VoiceBillingUsed,
    VoiceSearchUsed,
    DarkModeEnabled,
    AdminUnlocked,
    BulkImportUsed,
    LoyaltyActivated,
    LowStockAlertSet,
    ExportUsed,
    KeyboardShortcutsUsed,
    ConsecutiveDays,
    FeaturesUsed,
}

impl Metric {
    pub fn all() -> &'static [Metric] {
        &[
            Self::ProductCount,
            Self::BillCount,
            Self::CustomerCount,
            Self::TotalRevenue,
            Self::VoiceBillingUsed,
            Self::VoiceSearchUsed,
            Self::DarkModeEnabled,
            Self::AdminUnlocked,
            Self::BulkImportUsed,
            Self::LoyaltyActivated,
            Self::LowStockAlertSet,
            Self::ExportUsed,
            Self::KeyboardShortcutsUsed,
            Self::ConsecutiveDays,
            Self::FeaturesUsed,
        ]
    }
}

impl AppMetrics {
    /// Numeric value of a metric. Flags read as 0 or 1.
    pub fn value(&self, metric: Metric) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match metric {
            Metric::ProductCount => self.product_count as f64,
            Metric::BillCount => self.bill_count as f64,
            Metric::CustomerCount => self.customer_count as f64,
            Metric::TotalRevenue => self.total_revenue,
            Metric::VoiceBillingUsed => flag(self.voice_billing_used),
            Metric::VoiceSearchUsed => flag(self.voice_search_used),
            Metric::DarkModeEnabled => flag(self.dark_mode_enabled),
            Metric::AdminUnlocked => flag(self.admin_unlocked),
            Metric::BulkImportUsed => flag(self.bulk_import_used),
            Metric::LoyaltyActivated => flag(self.loyalty_activated),
            Metric::LowStockAlertSet => flag(self.low_stock_alert_set),
            Metric::ExportUsed => flag(self.export_used),
            Metric::KeyboardShortcutsUsed => self.keyboard_shortcuts_used as f64,
            Metric::ConsecutiveDays => self.consecutive_days as f64,
            Metric::FeaturesUsed => self.features_used as f64,
        }
    }
}
