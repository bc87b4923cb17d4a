//! Batch command implementation
//!
//! Pivots one market and fuel category into wide comparison rows and runs
//! carrier-batch inflection detection over them.

use serde::Serialize;
use surcharge_core::analytics::{group_curves, CarrierCurve};
use surcharge_core::pivot::{carriers, comparable_view, complete_view};
use surcharge_core::types::{ComparisonRow, SurchargeRow};
use tracing::{debug, info};

use crate::config::RefuelConfig;
use crate::input::{load_filtered, RowFilter};
use crate::output::{emit, fmt_opt, Tabular};
use crate::{CliError, Result};

/// Which wide table the detector reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Each carrier's published intervals, unsplit
    #[default]
    Complete,
    /// Intervals where at least `min_carriers` carriers overlap
    Comparable,
}

/// One carrier's batch result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    pub carrier: String,
    pub inflection: Option<f64>,
    pub skipped: bool,
}

impl Tabular for BatchRecord {
    fn headers() -> &'static [&'static str] {
        &["Carrier", "Inflection", "Skipped"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.carrier.clone(),
            fmt_opt(self.inflection),
            if self.skipped { "yes" } else { "" }.to_string(),
        ]
    }
}

/// Detect inflections for all carriers of one market and fuel category.
pub fn detect(
    rows: &[SurchargeRow],
    market: &str,
    fuel_category: &str,
    view: View,
    min_carriers: usize,
    config: &RefuelConfig,
) -> Vec<BatchRecord> {
    let curves: Vec<CarrierCurve> = group_curves(rows)
        .into_values()
        .filter(|c| c.key().market == market && c.key().fuel_category == fuel_category)
        .collect();
    let names = carriers(&curves);

    let wide: Vec<ComparisonRow> = match view {
        View::Complete => complete_view(&curves),
        View::Comparable => comparable_view(&curves, min_carriers),
    };
    debug!(rows = wide.len(), carriers = names.len(), ?view, "pivoted comparison rows");

    let skip = config.skip_list.skip_set(market, fuel_category, &names);
    let found = config.detector().find_for_carriers(&wide, &names, &skip);

    names
        .into_iter()
        .map(|carrier| BatchRecord {
            inflection: found.get(&carrier).copied(),
            skipped: skip.contains(&carrier),
            carrier,
        })
        .collect()
}

/// Run the batch command
pub fn run(
    input: &str,
    market: &str,
    fuel_category: &str,
    view: View,
    min_carriers: usize,
    config: &RefuelConfig,
) -> Result<()> {
    info!("Running batch detection...");
    info!("  Input: {}", input);
    info!("  Market: {}, category: {}", market, fuel_category);

    if min_carriers == 0 {
        return Err(CliError::InvalidArgument(
            "--min-carriers must be at least 1".to_string(),
        ));
    }

    let filter = RowFilter {
        market: Some(market.to_string()),
        fuel_category: Some(fuel_category.to_string()),
        carrier: None,
    };
    let rows = load_filtered(input, &filter)?;
    let records = detect(&rows, market, fuel_category, view, min_carriers, config);

    info!(carriers = records.len(), "Batch detection complete");
    emit(&records, config.output_format)
}
