//! Record command implementation

use anyhow::Result;
use clap::Args;
use std::path::Path;

use khata_engage::engage::metrics::AppMetrics;
use khata_engage::EngagementInput;

use super::{open_manager, print_events};

/// Current values of the app metrics. Omitted counters keep their last
/// recorded value.
#[derive(Debug, Args)]
pub struct RecordArgs {
    #[arg(long)]
    pub products: Option<u64>,
    #[arg(long)]
    pub bills: Option<u64>,
    #[arg(long)]
    pub customers: Option<u64>,
    /// Lifetime revenue
    #[arg(long)]
    pub revenue: Option<f64>,
    #[arg(long)]
    pub shortcuts: Option<u64>,
    /// Distinct features used
    #[arg(long)]
    pub features: Option<u64>,
    #[arg(long)]
    pub consecutive_days: Option<u64>,

    #[arg(long)]
    pub voice_billing: bool,
    #[arg(long)]
    pub voice_search: bool,
    #[arg(long)]
    pub dark_mode: bool,
    #[arg(long)]
    pub admin_unlocked: bool,
    #[arg(long)]
    pub bulk_import: bool,
    #[arg(long)]
    pub loyalty: bool,
    #[arg(long)]
    pub low_stock_alert: bool,
    #[arg(long)]
    pub export: bool,

    /// Print the resulting events as JSON
    #[arg(long)]
    pub json: bool,
}

impl RecordArgs {
    /// Overlay the given values on `base`. Flags only ever turn on.
    pub fn apply_to(&self, base: AppMetrics) -> AppMetrics {
        AppMetrics {
            product_count: self.products.unwrap_or(base.product_count),
            bill_count: self.bills.unwrap_or(base.bill_count),
            customer_count: self.customers.unwrap_or(base.customer_count),
            total_revenue: self.revenue.unwrap_or(base.total_revenue),
            keyboard_shortcuts_used: self.shortcuts.unwrap_or(base.keyboard_shortcuts_used),
            features_used: self.features.unwrap_or(base.features_used),
            consecutive_days: self.consecutive_days.unwrap_or(base.consecutive_days),
            voice_billing_used: base.voice_billing_used || self.voice_billing,
            voice_search_used: base.voice_search_used || self.voice_search,
            dark_mode_enabled: base.dark_mode_enabled || self.dark_mode,
            admin_unlocked: base.admin_unlocked || self.admin_unlocked,
            bulk_import_used: base.bulk_import_used || self.bulk_import,
            loyalty_activated: base.loyalty_activated || self.loyalty,
            low_stock_alert_set: base.low_stock_alert_set || self.low_stock_alert,
            export_used: base.export_used || self.export,
        }
    }
}

/// Feed new metric values to the engine
pub async fn record_command(config_path: Option<&Path>, args: RecordArgs) -> Result<()> {
    let (_config, manager) = open_manager(config_path)?;

    let metrics = args.apply_to(manager.last_metrics()?.unwrap_or_default());
    let events = manager.apply_event(EngagementInput::Metrics(metrics))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("Recorded. Nothing new unlocked.");
    } else {
        println!("Recorded:");
        print_events(&events);
    }
    Ok(())
}
