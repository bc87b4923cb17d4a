//! Skip-list command implementation
//!
//! Prints the effective skip list after file, env and CLI layering.

use serde::Serialize;
use surcharge_core::policy::{SkipEntry, SkipList};
use tracing::info;

use crate::config::RefuelConfig;
use crate::output::{emit, Tabular};
use crate::{CliError, Result};

/// One skip entry in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
    pub market: String,
    pub carrier: String,
    pub fuel_category: String,
}

impl From<&SkipEntry> for SkipRecord {
    fn from(entry: &SkipEntry) -> Self {
        Self {
            market: entry.market.clone(),
            carrier: entry.carrier.clone(),
            fuel_category: entry.fuel_category.clone(),
        }
    }
}

impl Tabular for SkipRecord {
    fn headers() -> &'static [&'static str] {
        &["Market", "Carrier", "Category"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.market.clone(),
            self.carrier.clone(),
            self.fuel_category.clone(),
        ]
    }
}

/// Entries of `list`, or the carriers it skips in one market and category.
pub fn list(list: &SkipList, scope: Option<(&str, &str)>) -> Vec<SkipRecord> {
    match scope {
        None => list.entries().iter().map(SkipRecord::from).collect(),
        Some((market, fuel_category)) => {
            let mut names: Vec<String> = list.carriers_for(market, fuel_category).into_iter().collect();
            names.sort();
            names
                .into_iter()
                .map(|carrier| SkipRecord {
                    market: market.to_string(),
                    carrier,
                    fuel_category: fuel_category.to_string(),
                })
                .collect()
        }
    }
}

/// Run the skip-list command
pub fn run(
    market: Option<&str>,
    fuel_category: Option<&str>,
    config: &RefuelConfig,
) -> Result<()> {
    let scope = match (market, fuel_category) {
        (Some(m), Some(f)) => Some((m, f)),
        (None, None) => None,
        _ => {
            return Err(CliError::InvalidArgument(
                "--market and --fuel-category must be given together".to_string(),
            ))
        }
    };

    let records = list(&config.skip_list, scope);
    info!(entries = records.len(), "Effective skip list");
    emit(&records, config.output_format)
}
