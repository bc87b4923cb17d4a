//! Inflection detection on a carrier's band table.
//!
//! An inflection is the price where a carrier switches the width of its
//! price buckets for good, e.g. from $0.09 steps to $0.04 steps. The
//! detector works only on step widths; surcharge values are ignored.
//!
//! # Algorithm
//!
//! 1. Sort a copy of the bands and compute each step width.
//! 2. If the first two widths already differ by more than 2x and the
//!    third width stays close to the second, the new regime starts at
//!    band 1.
//! 3. Otherwise the mean of the first two widths is the baseline. Scan
//!    forward from band 2 for a run of at least two bands narrower than
//!    `0.7 x baseline`; failing that, a run wider than `1.3 x baseline`.
//!
//! # Example
//!
//! ```
//! use surcharge_core::analytics::find_inflection;
//! use surcharge_core::types::Band;
//!
//! let bands = [
//!     Band::from_raw(2.00, 2.10, 18.00),
//!     Band::from_raw(2.10, 2.20, 18.25),
//!     Band::from_raw(2.20, 2.22, 18.50),
//!     Band::from_raw(2.22, 2.24, 18.75),
//! ];
//! assert_eq!(find_inflection(&bands), Some(2.20));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

use crate::types::{sorted_bands, Band, ComparisonRow};

/// Minimum number of bands before detection is attempted.
pub const MIN_BANDS: usize = 4;
/// Width ratio below which band 1 is a candidate immediate inflection.
pub const IMMEDIATE_RATIO_LOW: f64 = 0.5;
/// Width ratio above which band 1 is a candidate immediate inflection.
pub const IMMEDIATE_RATIO_HIGH: f64 = 2.0;
/// Fraction of the baseline width that counts as "narrower".
pub const NARROW_FACTOR: f64 = 0.7;
/// Multiple of the baseline width that counts as "wider".
pub const WIDE_FACTOR: f64 = 1.3;
/// Consecutive qualifying bands needed to confirm a regime change.
pub const MIN_CONSECUTIVE: usize = 2;
/// Maximum bands inspected per candidate index.
pub const LOOKAHEAD: usize = 4;

/// Tunable thresholds for [`InflectionDetector`].
///
/// `Default` reproduces the production constants above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InflectionConfig {
    /// Minimum number of bands (fewer yields no inflection)
    pub min_bands: usize,
    /// Lower bound of the "same regime" width ratio
    pub immediate_ratio_low: f64,
    /// Upper bound of the "same regime" width ratio
    pub immediate_ratio_high: f64,
    /// Narrow threshold as a fraction of the baseline width
    pub narrow_factor: f64,
    /// Wide threshold as a multiple of the baseline width
    pub wide_factor: f64,
    /// Consecutive bands required past a threshold
    pub min_consecutive: usize,
    /// Bands inspected per candidate index
    pub lookahead: usize,
}

impl Default for InflectionConfig {
    fn default() -> Self {
        Self {
            min_bands: MIN_BANDS,
            immediate_ratio_low: IMMEDIATE_RATIO_LOW,
            immediate_ratio_high: IMMEDIATE_RATIO_HIGH,
            narrow_factor: NARROW_FACTOR,
            wide_factor: WIDE_FACTOR,
            min_consecutive: MIN_CONSECUTIVE,
            lookahead: LOOKAHEAD,
        }
    }
}

/// Step-width inflection detector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InflectionDetector {
    config: InflectionConfig,
}

impl InflectionDetector {
    /// Detector with custom thresholds.
    pub fn new(config: InflectionConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    #[inline]
    pub fn config(&self) -> &InflectionConfig {
        &self.config
    }

    /// Price where the new step-width regime begins, if any.
    ///
    /// Input may be in any order and is not modified. Fewer than
    /// `min_bands` bands, or no sustained change, yields `None`.
    pub fn find(&self, bands: &[Band]) -> Option<f64> {
        let cfg = &self.config;
        if bands.len() < cfg.min_bands.max(3) {
            return None;
        }

        let sorted = sorted_bands(bands);
        let steps: Vec<f64> = sorted.iter().map(Band::width).collect();

        if let Some(price) = self.immediate_inflection(&sorted, &steps) {
            debug!(price, "immediate inflection at band 1");
            return Some(price);
        }

        let baseline = (steps[0] + steps[1]) / 2.0;
        let narrow = baseline * cfg.narrow_factor;
        let wide = baseline * cfg.wide_factor;
        trace!(baseline, narrow, wide, "scanning for sustained width change");

        self.scan(&steps, |w| w < narrow)
            .or_else(|| self.scan(&steps, |w| w > wide))
            .map(|i| sorted[i].at_least)
    }

    /// Band 1 starts a new regime when its width jumps against band 0 and
    /// band 2 confirms the new width.
    fn immediate_inflection(&self, sorted: &[Band], steps: &[f64]) -> Option<f64> {
        let cfg = &self.config;
        let jump = steps[1] / steps[0];
        if !(jump < cfg.immediate_ratio_low || jump > cfg.immediate_ratio_high) {
            return None;
        }
        let follow = steps[2] / steps[1];
        let sustained = follow > cfg.immediate_ratio_low && follow < cfg.immediate_ratio_high;
        sustained.then(|| sorted[1].at_least)
    }

    /// First index from 2 that opens a run of `min_consecutive` widths
    /// satisfying `qualifies`.
    fn scan(&self, steps: &[f64], qualifies: impl Fn(f64) -> bool) -> Option<usize> {
        let cfg = &self.config;
        let need = cfg.min_consecutive.max(1);
        if steps.len() < need {
            return None;
        }
        let last_start = steps.len() - need;

        (2..=last_start).find(|&i| {
            let end = steps.len().min(i + cfg.lookahead);
            let run = steps[i..end].iter().take_while(|&&w| qualifies(w)).count();
            run >= need
        })
    }
}

/// Detect an inflection with the default thresholds.
///
/// See [`InflectionDetector::find`].
pub fn find_inflection(bands: &[Band]) -> Option<f64> {
    InflectionDetector::default().find(bands)
}

/// Run detection for every carrier column of a set of wide rows.
///
/// For each carrier not in `skip`, bands are built from the rows where
/// that carrier's column is non-null. Carriers with fewer than four bands,
/// skipped carriers and carriers without an inflection are absent from
/// the result.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use surcharge_core::analytics::find_carrier_inflections;
/// use surcharge_core::types::ComparisonRow;
///
/// let edges = [(2.00, 2.10), (2.10, 2.20), (2.20, 2.22), (2.22, 2.24)];
/// let rows: Vec<ComparisonRow> = edges
///     .iter()
///     .map(|&(lo, hi)| {
///         ComparisonRow::new(lo, hi)
///             .with_surcharge("UPS", Some(18.0))
///             .with_surcharge("FedEx", Some(17.0))
///     })
///     .collect();
///
/// let skip: HashSet<String> = ["FedEx".to_string()].into();
/// let found = find_carrier_inflections(&rows, &["UPS", "FedEx"], &skip);
/// assert_eq!(found.get("UPS"), Some(&2.20));
/// assert!(!found.contains_key("FedEx"));
/// ```
pub fn find_carrier_inflections<S: AsRef<str>>(
    rows: &[ComparisonRow],
    carriers: &[S],
    skip: &HashSet<String>,
) -> BTreeMap<String, f64> {
    InflectionDetector::default().find_for_carriers(rows, carriers, skip)
}

impl InflectionDetector {
    /// [`find_carrier_inflections`] with this detector's thresholds.
    pub fn find_for_carriers<S: AsRef<str>>(
        &self,
        rows: &[ComparisonRow],
        carriers: &[S],
        skip: &HashSet<String>,
    ) -> BTreeMap<String, f64> {
        let mut found = BTreeMap::new();

        for carrier in carriers.iter().map(AsRef::as_ref) {
            if skip.contains(carrier) {
                trace!(carrier, "carrier in skip set");
                continue;
            }
            let bands: Vec<Band> = rows.iter().filter_map(|r| r.band_for(carrier)).collect();
            if bands.len() < self.config.min_bands {
                trace!(carrier, bands = bands.len(), "too few bands for detection");
                continue;
            }
            if let Some(price) = self.find(&bands) {
                debug!(carrier, price, "inflection detected");
                found.insert(carrier.to_string(), price);
            }
        }

        found
    }
}
