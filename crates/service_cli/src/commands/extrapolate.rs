//! Extrapolate command implementation
//!
//! Generates synthetic bands around each curve's published range.

use serde::Serialize;
use surcharge_core::analytics::group_curves;
use surcharge_core::types::{Band, CurveKey, ExtrapolatedBand, ExtrapolationDirection, SurchargeRow};
use tracing::info;

use crate::config::RefuelConfig;
use crate::input::{load_filtered, RowFilter};
use crate::output::{emit, Tabular};
use crate::Result;

/// One band in the output, published or synthetic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandRecord {
    pub market: String,
    pub fuel_category: String,
    pub carrier: String,
    pub at_least_usd: f64,
    pub but_less_than_usd: f64,
    pub surcharge_pct: f64,
    pub is_extrapolated: bool,
    /// `real`, `backward` or `forward`
    pub kind: &'static str,
}

impl BandRecord {
    fn real(key: &CurveKey, band: &Band) -> Self {
        Self::build(key, band, false, "real")
    }

    fn synthetic(key: &CurveKey, band: &ExtrapolatedBand) -> Self {
        let kind = match band.direction {
            ExtrapolationDirection::Backward => "backward",
            ExtrapolationDirection::Forward => "forward",
        };
        Self::build(key, &band.band, band.is_extrapolated, kind)
    }

    fn build(key: &CurveKey, band: &Band, is_extrapolated: bool, kind: &'static str) -> Self {
        Self {
            market: key.market.clone(),
            fuel_category: key.fuel_category.clone(),
            carrier: key.carrier.clone(),
            at_least_usd: band.at_least,
            but_less_than_usd: band.but_less_than,
            surcharge_pct: band.surcharge_pct,
            is_extrapolated,
            kind,
        }
    }
}

impl Tabular for BandRecord {
    fn headers() -> &'static [&'static str] {
        &["Carrier", "Price Range", "Surcharge %", "Kind"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{}/{}/{}", self.market, self.fuel_category, self.carrier),
            surcharge_core::types::price_range_label(self.at_least_usd, self.but_less_than_usd),
            format!("{:.2}", self.surcharge_pct),
            self.kind.to_string(),
        ]
    }
}

/// Synthetic bands for every curve in `rows`, price-ascending per curve.
///
/// With `include_real` the published bands are placed between the
/// backward and forward bands.
pub fn generate(rows: &[SurchargeRow], config: &RefuelConfig, include_real: bool) -> Vec<BandRecord> {
    let extrapolator = config.extrapolator();
    let mut records = Vec::new();

    for curve in group_curves(rows).into_values() {
        let key = curve.key();
        let synthetic = curve.extrapolate_with(&extrapolator, &config.skip_list);
        let (backward, forward): (Vec<_>, Vec<_>) = synthetic
            .iter()
            .partition(|b| b.direction == ExtrapolationDirection::Backward);

        records.extend(backward.into_iter().map(|b| BandRecord::synthetic(key, b)));
        if include_real {
            records.extend(curve.bands().iter().map(|b| BandRecord::real(key, b)));
        }
        records.extend(forward.into_iter().map(|b| BandRecord::synthetic(key, b)));
    }

    records
}

/// Run the extrapolate command
pub fn run(input: &str, filter: &RowFilter, include_real: bool, config: &RefuelConfig) -> Result<()> {
    info!("Extrapolating bands...");
    info!("  Input: {}", input);

    let rows = load_filtered(input, filter)?;
    let records = generate(&rows, config, include_real);

    info!(
        generated = records.iter().filter(|r| r.is_extrapolated).count(),
        "Extrapolation complete"
    );
    emit(&records, config.output_format)
}
