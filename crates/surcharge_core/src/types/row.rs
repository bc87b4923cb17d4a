//! Upstream row shapes: raw per-carrier rows and wide comparison rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::band::price_range_label;
use super::{Band, BandError};

/// Identifies one carrier curve: a carrier's table for a market and fuel
/// category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurveKey {
    /// Market code (e.g. `US`, `DE`)
    pub market: String,
    /// Fuel category / service (e.g. `ground_domestic`)
    pub fuel_category: String,
    /// Carrier name
    pub carrier: String,
}

impl CurveKey {
    /// Build a key from borrowed parts.
    pub fn new(
        market: impl Into<String>,
        fuel_category: impl Into<String>,
        carrier: impl Into<String>,
    ) -> Self {
        Self {
            market: market.into(),
            fuel_category: fuel_category.into(),
            carrier: carrier.into(),
        }
    }
}

impl fmt::Display for CurveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.market, self.fuel_category, self.carrier)
    }
}

/// One row of a carrier's published surcharge table, as delivered by the
/// data-fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeRow {
    /// Carrier name
    pub carrier: String,
    /// Market code
    pub market: String,
    /// Fuel category / service
    pub fuel_category: String,
    /// Scrape session the row belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
    /// When the row was scraped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
    /// Inclusive lower price edge
    #[serde(alias = "at_least")]
    pub at_least_usd: f64,
    /// Exclusive upper price edge
    #[serde(alias = "but_less_than")]
    pub but_less_than_usd: f64,
    /// Surcharge percent, null when the carrier publishes no value
    #[serde(default)]
    pub surcharge_pct: Option<f64>,
}

impl SurchargeRow {
    /// The curve this row belongs to.
    pub fn key(&self) -> CurveKey {
        CurveKey::new(&self.market, &self.fuel_category, &self.carrier)
    }

    /// Convert into a validated band.
    ///
    /// # Errors
    ///
    /// * `BandError::MissingSurcharge` - the surcharge column is null
    /// * any error from [`Band::new`]
    pub fn to_band(&self) -> Result<Band, BandError> {
        let pct = self.surcharge_pct.ok_or_else(|| BandError::MissingSurcharge {
            carrier: self.carrier.clone(),
            at_least: self.at_least_usd,
        })?;
        Band::new(self.at_least_usd, self.but_less_than_usd, pct)
    }
}

/// A wide comparison row: one price interval with an optional surcharge
/// column per carrier.
///
/// # Example
///
/// ```
/// use surcharge_core::types::ComparisonRow;
///
/// let row = ComparisonRow::new(2.0, 2.1)
///     .with_surcharge("UPS", Some(18.0))
///     .with_surcharge("FedEx", None);
/// assert_eq!(row.price_range, "$2.00-$2.10");
/// assert_eq!(row.surcharge("UPS"), Some(18.0));
/// assert_eq!(row.surcharge("FedEx"), None);
/// assert_eq!(row.surcharge("DHL"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Display label, e.g. `$2.00-$2.10`
    pub price_range: String,
    /// Inclusive lower price edge
    pub at_least_usd: f64,
    /// Exclusive upper price edge
    pub but_less_than_usd: f64,
    /// Surcharge column per carrier; `None` where the carrier has no value
    pub surcharges: BTreeMap<String, Option<f64>>,
}

impl ComparisonRow {
    /// Row with no carrier columns yet.
    pub fn new(at_least_usd: f64, but_less_than_usd: f64) -> Self {
        Self {
            price_range: price_range_label(at_least_usd, but_less_than_usd),
            at_least_usd,
            but_less_than_usd,
            surcharges: BTreeMap::new(),
        }
    }

    /// Builder-style column setter.
    pub fn with_surcharge(mut self, carrier: impl Into<String>, pct: Option<f64>) -> Self {
        self.surcharges.insert(carrier.into(), pct);
        self
    }

    /// Non-null surcharge for `carrier`, if any.
    pub fn surcharge(&self, carrier: &str) -> Option<f64> {
        self.surcharges.get(carrier).copied().flatten()
    }

    /// Number of carriers with a non-null value in this row.
    pub fn populated(&self) -> usize {
        self.surcharges.values().filter(|v| v.is_some()).count()
    }

    /// The band for `carrier` in this row, if its column is non-null.
    pub fn band_for(&self, carrier: &str) -> Option<Band> {
        self.surcharge(carrier)
            .map(|pct| Band::from_raw(self.at_least_usd, self.but_less_than_usd, pct))
    }
}
