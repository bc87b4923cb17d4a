//! Per-carrier orchestration used by chart and table consumers.
//!
//! A [`CarrierCurve`] is built once per filter change from raw upstream
//! rows and then queried for its inflection marker and synthetic bands.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::extrapolation::BandExtrapolator;
use super::inflection::InflectionDetector;
use crate::policy::SkipPolicy;
use crate::types::{sorted_bands, Band, CurveKey, ExtrapolatedBand, SurchargeRow};

/// One carrier's published bands for a market and fuel category.
///
/// Bands are sorted ascending and never change after construction.
///
/// # Example
///
/// ```
/// use surcharge_core::analytics::CarrierCurve;
/// use surcharge_core::types::{Band, CurveKey};
///
/// let curve = CarrierCurve::new(
///     CurveKey::new("US", "ground", "UPS"),
///     vec![
///         Band::from_raw(2.20, 2.30, 6.0),
///         Band::from_raw(2.00, 2.10, 5.0),
///         Band::from_raw(2.10, 2.20, 5.5),
///     ],
/// );
/// assert_eq!(curve.price_range(), Some((2.00, 2.30)));
/// assert_eq!(curve.inflection(), None);
/// assert!(!curve.extrapolate(&()).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierCurve {
    key: CurveKey,
    bands: Vec<Band>,
    scraped_at: Option<DateTime<Utc>>,
}

impl CarrierCurve {
    /// Curve from already-built bands.
    pub fn new(key: CurveKey, bands: Vec<Band>) -> Self {
        Self {
            key,
            bands: sorted_bands(&bands),
            scraped_at: None,
        }
    }

    /// Curve for `key` from raw rows.
    ///
    /// Rows for other curves are ignored. Rows with a null surcharge or an
    /// invalid interval are dropped with a warning; they never reach the
    /// detector.
    pub fn from_rows(key: CurveKey, rows: &[SurchargeRow]) -> Self {
        let mut bands = Vec::new();
        let mut scraped_at: Option<DateTime<Utc>> = None;

        for row in rows.iter().filter(|r| row_matches(r, &key)) {
            if row.surcharge_pct.is_none() {
                continue;
            }
            match row.to_band() {
                Ok(band) => {
                    bands.push(band);
                    scraped_at = scraped_at.max(row.scraped_at);
                }
                Err(err) => warn!(curve = %key, error = %err, "dropping invalid row"),
            }
        }

        Self {
            key,
            bands: sorted_bands(&bands),
            scraped_at,
        }
    }

    /// Curve identity.
    #[inline]
    pub fn key(&self) -> &CurveKey {
        &self.key
    }

    /// Published bands, ascending.
    #[inline]
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Latest scrape time among the rows this curve was built from.
    #[inline]
    pub fn scraped_at(&self) -> Option<DateTime<Utc>> {
        self.scraped_at
    }

    /// Whether the curve has no bands.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// `(first.at_least, last.but_less_than)` of the published bands.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let first = self.bands.first()?;
        let last = self.bands.last()?;
        Some((first.at_least, last.but_less_than))
    }

    /// Published band containing `price`.
    pub fn band_at(&self, price: f64) -> Option<&Band> {
        self.bands.iter().find(|b| b.contains(price))
    }

    /// Inflection price with default thresholds.
    pub fn inflection(&self) -> Option<f64> {
        InflectionDetector::default().find(&self.bands)
    }

    /// Synthetic bands with default constants.
    pub fn extrapolate<P: SkipPolicy + ?Sized>(&self, policy: &P) -> Vec<ExtrapolatedBand> {
        self.extrapolate_with(&BandExtrapolator::default(), policy)
    }

    /// Synthetic bands with a configured extrapolator.
    pub fn extrapolate_with<P: SkipPolicy + ?Sized>(
        &self,
        extrapolator: &BandExtrapolator,
        policy: &P,
    ) -> Vec<ExtrapolatedBand> {
        extrapolator.extrapolate(
            &self.bands,
            &self.key.carrier,
            &self.key.market,
            &self.key.fuel_category,
            policy,
        )
    }

    /// Everything a chart needs for this curve, with default settings.
    pub fn overlay<P: SkipPolicy + ?Sized>(&self, policy: &P) -> CurveOverlay {
        self.overlay_with(
            &InflectionDetector::default(),
            &BandExtrapolator::default(),
            policy,
        )
    }

    /// Everything a chart needs for this curve.
    ///
    /// A skipped curve gets neither an inflection marker nor synthetic
    /// bands. Detection only ever sees the published bands.
    pub fn overlay_with<P: SkipPolicy + ?Sized>(
        &self,
        detector: &InflectionDetector,
        extrapolator: &BandExtrapolator,
        policy: &P,
    ) -> CurveOverlay {
        let key = &self.key;
        let skipped = policy.skips(&key.market, &key.carrier, &key.fuel_category);
        let inflection = if skipped {
            None
        } else {
            detector.find(&self.bands)
        };
        let extrapolated = self.extrapolate_with(extrapolator, policy);

        debug!(
            curve = %key,
            bands = self.bands.len(),
            extrapolated = extrapolated.len(),
            ?inflection,
            skipped,
            "curve overlay built"
        );

        CurveOverlay {
            key: key.clone(),
            bands: self.bands.clone(),
            extrapolated,
            inflection,
            skipped,
        }
    }
}

fn row_matches(row: &SurchargeRow, key: &CurveKey) -> bool {
    row.carrier == key.carrier && row.market == key.market && row.fuel_category == key.fuel_category
}

/// Render-ready view of one curve.
///
/// Published and synthetic bands are kept in separate fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveOverlay {
    /// Curve identity
    pub key: CurveKey,
    /// Published bands, ascending
    pub bands: Vec<Band>,
    /// Synthetic bands, ascending
    pub extrapolated: Vec<ExtrapolatedBand>,
    /// Inflection marker price
    pub inflection: Option<f64>,
    /// Whether the skip policy excluded this curve
    pub skipped: bool,
}

/// Group raw rows into one curve per `(market, fuel_category, carrier)`.
///
/// Curves whose rows all carry null surcharges are left out.
pub fn group_curves(rows: &[SurchargeRow]) -> BTreeMap<CurveKey, CarrierCurve> {
    let mut by_key: BTreeMap<CurveKey, Vec<SurchargeRow>> = BTreeMap::new();
    for row in rows {
        by_key.entry(row.key()).or_default().push(row.clone());
    }

    by_key
        .into_iter()
        .map(|(key, rows)| {
            let curve = CarrierCurve::from_rows(key.clone(), &rows);
            (key, curve)
        })
        .filter(|(_, curve)| !curve.is_empty())
        .collect()
}
