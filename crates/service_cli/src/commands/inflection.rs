//! Inflection command implementation
//!
//! Detects the pricing regime change of every curve in the input.

use serde::Serialize;
use surcharge_core::analytics::group_curves;
use surcharge_core::policy::SkipPolicy;
use surcharge_core::types::SurchargeRow;
use tracing::info;

use crate::config::RefuelConfig;
use crate::input::{load_filtered, RowFilter};
use crate::output::{emit, fmt_opt, Tabular};
use crate::Result;

/// One curve's detection result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflectionRecord {
    pub market: String,
    pub fuel_category: String,
    pub carrier: String,
    pub bands: usize,
    pub inflection: Option<f64>,
    pub skipped: bool,
}

impl Tabular for InflectionRecord {
    fn headers() -> &'static [&'static str] {
        &["Market", "Category", "Carrier", "Bands", "Inflection", "Skipped"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.market.clone(),
            self.fuel_category.clone(),
            self.carrier.clone(),
            self.bands.to_string(),
            fmt_opt(self.inflection),
            if self.skipped { "yes" } else { "" }.to_string(),
        ]
    }
}

/// Detect inflections for every curve in `rows`.
pub fn detect(rows: &[SurchargeRow], config: &RefuelConfig) -> Vec<InflectionRecord> {
    let detector = config.detector();

    group_curves(rows)
        .into_values()
        .map(|curve| {
            let key = curve.key();
            let skipped = config
                .skip_list
                .skips(&key.market, &key.carrier, &key.fuel_category);
            let inflection = if skipped {
                None
            } else {
                detector.find(curve.bands())
            };
            InflectionRecord {
                market: key.market.clone(),
                fuel_category: key.fuel_category.clone(),
                carrier: key.carrier.clone(),
                bands: curve.bands().len(),
                inflection,
                skipped,
            }
        })
        .collect()
}

/// Run the inflection command
pub fn run(input: &str, filter: &RowFilter, config: &RefuelConfig) -> Result<()> {
    info!("Detecting inflections...");
    info!("  Input: {}", input);

    let rows = load_filtered(input, filter)?;
    let records = detect(&rows, config);

    info!(
        curves = records.len(),
        detected = records.iter().filter(|r| r.inflection.is_some()).count(),
        "Inflection detection complete"
    );
    emit(&records, config.output_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surcharge_core::policy::SkipEntry;

    fn rows(carrier: &str, widths: &[f64]) -> Vec<SurchargeRow> {
        let mut lo = 2.0;
        widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let row = SurchargeRow {
                    carrier: carrier.to_string(),
                    market: "US".to_string(),
                    fuel_category: "ground".to_string(),
                    session_id: None,
                    scraped_at: None,
                    at_least_usd: lo,
                    but_less_than_usd: lo + w,
                    surcharge_pct: Some(15.0 + 0.5 * i as f64),
                };
                lo += w;
                row
            })
            .collect()
    }

    #[test]
    fn test_detect_per_curve() {
        let mut input = rows("UPS", &[0.1, 0.1, 0.05, 0.05, 0.05]);
        input.extend(rows("FedEx", &[0.1; 6]));

        let records = detect(&input, &RefuelConfig::default());
        assert_eq!(records.len(), 2);

        // curves come out in key order
        assert_eq!(records[0].carrier, "FedEx");
        assert_eq!(records[0].inflection, None);
        assert_eq!(records[1].carrier, "UPS");
        assert_relative_eq!(records[1].inflection.unwrap(), 2.2, epsilon = 1e-9);
        assert_eq!(records[1].bands, 5);
    }

    #[test]
    fn test_detect_respects_skip_list() {
        let input = rows("DHL", &[0.1, 0.1, 0.05, 0.05, 0.05]);
        let mut config = RefuelConfig::default();
        config.skip_list.push(SkipEntry::new("US", "DHL", "ground"));

        let records = detect(&input, &config);
        assert_eq!(records.len(), 1);
        assert!(records[0].skipped);
        assert_eq!(records[0].inflection, None);
    }

    #[test]
    fn test_detect_uses_configured_thresholds() {
        // 0.1 -> 0.08 is not narrow at 0.7 but is at 0.9
        let input = rows("UPS", &[0.1, 0.1, 0.08, 0.08, 0.08]);
        let mut config = RefuelConfig::default();
        assert_eq!(detect(&input, &config)[0].inflection, None);

        config.inflection.narrow_factor = 0.9;
        assert!(detect(&input, &config)[0].inflection.is_some());
    }
}
