//! Synthetic bands outside a carrier's published price range.
//!
//! The extrapolator projects the nearest pricing regime linearly for a
//! fixed distance below the lowest and above the highest published price.
//! It is a visual fade for charts, not a forecast.
//!
//! The band list is split at the detected inflection (see
//! [`InflectionDetector`]): the backward run uses the regime before the
//! inflection, the forward run the regime after it. Without an inflection
//! both runs use the whole table.
//!
//! # Example
//!
//! ```
//! use surcharge_core::analytics::extrapolate_bands;
//! use surcharge_core::types::Band;
//!
//! let bands = [
//!     Band::from_raw(2.00, 2.10, 5.0),
//!     Band::from_raw(2.10, 2.20, 5.5),
//!     Band::from_raw(2.20, 2.30, 6.0),
//! ];
//! let synthetic = extrapolate_bands(&bands, "UPS", "US", "ground", &());
//! assert!(synthetic.iter().all(|b| b.is_extrapolated));
//! assert!(synthetic.iter().all(|b| (0.0..=100.0).contains(&b.band.surcharge_pct)));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::inflection::InflectionDetector;
use crate::math::{clamp, mean, mean_slope};
use crate::policy::SkipPolicy;
use crate::types::{sorted_bands, Band, ExtrapolatedBand, ExtrapolationDirection};

/// Price distance covered on each side of the published range.
pub const EXTENSION_DISTANCE: f64 = 1.0;
/// Smallest step width used for generated bands.
pub const MIN_STEP_WIDTH: f64 = 0.01;
/// Bands taken from each regime edge as the trend sample.
pub const SAMPLE_SIZE: usize = 3;
/// Real bands required before anything is generated.
pub const MIN_REAL_BANDS: usize = 3;
/// Bands a regime needs to be projected.
pub const MIN_REGIME_BANDS: usize = 2;
/// Lowest generated price.
pub const PRICE_FLOOR: f64 = 0.0;
/// Surcharge clamp bounds, in percent.
pub const SURCHARGE_MIN: f64 = 0.0;
/// Surcharge clamp bounds, in percent.
pub const SURCHARGE_MAX: f64 = 100.0;

/// Tolerance for comparing generated band edges against targets.
const EDGE_EPSILON: f64 = 1e-9;

/// Tunable constants for [`BandExtrapolator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationConfig {
    /// Distance extended below and above the published range
    pub extension_distance: f64,
    /// Floor applied to the sampled step width
    pub min_step_width: f64,
    /// Maximum bands in each trend sample
    pub sample_size: usize,
    /// Minimum real bands before extrapolating
    pub min_real_bands: usize,
    /// Lowest price a generated band may start at
    pub price_floor: f64,
    /// Lower surcharge clamp
    pub surcharge_min: f64,
    /// Upper surcharge clamp
    pub surcharge_max: f64,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            extension_distance: EXTENSION_DISTANCE,
            min_step_width: MIN_STEP_WIDTH,
            sample_size: SAMPLE_SIZE,
            min_real_bands: MIN_REAL_BANDS,
            price_floor: PRICE_FLOOR,
            surcharge_min: SURCHARGE_MIN,
            surcharge_max: SURCHARGE_MAX,
        }
    }
}

/// Local linear trend of a regime edge.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Trend {
    /// Mean sample width, floored
    step: f64,
    /// Mean surcharge change per price unit
    slope: f64,
    /// Band the projection is anchored on
    anchor: Band,
}

impl Trend {
    fn surcharge_at(&self, midpoint: f64, cfg: &ExtrapolationConfig) -> f64 {
        let raw = self.anchor.surcharge_pct + self.slope * (midpoint - self.anchor.midpoint());
        clamp(raw, cfg.surcharge_min, cfg.surcharge_max)
    }
}

/// Linear band extrapolator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandExtrapolator {
    config: ExtrapolationConfig,
    detector: InflectionDetector,
}

impl BandExtrapolator {
    /// Extrapolator with custom constants and default inflection thresholds.
    pub fn new(config: ExtrapolationConfig) -> Self {
        Self {
            config,
            detector: InflectionDetector::default(),
        }
    }

    /// Replace the detector used to split regimes.
    pub fn with_detector(mut self, detector: InflectionDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Constants in use.
    #[inline]
    pub fn config(&self) -> &ExtrapolationConfig {
        &self.config
    }

    /// Generate synthetic bands around `bands`.
    ///
    /// Returns only synthetic bands, price-ascending, backward ones first.
    /// Empty when `policy` skips the curve or fewer than
    /// `min_real_bands` bands are supplied. `bands` is not modified.
    pub fn extrapolate<P>(
        &self,
        bands: &[Band],
        carrier: &str,
        market: &str,
        fuel_category: &str,
        policy: &P,
    ) -> Vec<ExtrapolatedBand>
    where
        P: SkipPolicy + ?Sized,
    {
        if policy.skips(market, carrier, fuel_category) {
            debug!(carrier, market, fuel_category, "extrapolation skipped by policy");
            return Vec::new();
        }
        if bands.len() < self.config.min_real_bands.max(1) {
            trace!(carrier, bands = bands.len(), "too few bands to extrapolate");
            return Vec::new();
        }

        let sorted = sorted_bands(bands);
        let (pre, post) = self.split_regimes(&sorted);

        let mut out = self.backward(&sorted, pre);
        out.extend(self.forward(&sorted, post));

        debug!(carrier, market, fuel_category, generated = out.len(), "extrapolated bands");
        out
    }

    /// Split sorted bands at the inflection into (pre, post) regimes.
    ///
    /// Without an inflection both regimes are the whole table.
    fn split_regimes<'a>(&self, sorted: &'a [Band]) -> (&'a [Band], &'a [Band]) {
        match self.detector.find(sorted) {
            Some(price) => {
                let split = sorted.partition_point(|b| b.at_least < price);
                trace!(price, split, "splitting regimes at inflection");
                (&sorted[..split], &sorted[split..])
            }
            None => (sorted, sorted),
        }
    }

    fn trend(&self, sample: &[Band], anchor: Band) -> Trend {
        let widths: Vec<f64> = sample.iter().map(Band::width).collect();
        let mut step = mean(&widths)
            .filter(|w| w.is_finite())
            .unwrap_or(0.0)
            .max(self.config.min_step_width);
        if step.is_nan() || step <= 0.0 {
            step = MIN_STEP_WIDTH;
        }
        let points: Vec<(f64, f64)> = sample
            .iter()
            .map(|b| (b.midpoint(), b.surcharge_pct))
            .collect();
        Trend {
            step,
            slope: mean_slope(&points),
            anchor,
        }
    }

    /// Bands below the published range, from the first bands of `pre`.
    fn backward(&self, sorted: &[Band], pre: &[Band]) -> Vec<ExtrapolatedBand> {
        let cfg = &self.config;
        if pre.len() < MIN_REGIME_BANDS {
            return Vec::new();
        }
        let real_min = sorted[0].at_least;
        let target = (real_min - cfg.extension_distance).max(cfg.price_floor);
        if !real_min.is_finite() || !target.is_finite() {
            return Vec::new();
        }

        let take = cfg.sample_size.max(MIN_REGIME_BANDS);
        let sample = &pre[..pre.len().min(take)];
        let trend = self.trend(sample, sample[0]);

        let mut out = Vec::new();
        for k in 1..=step_limit(real_min - target, trend.step) {
            let lower = real_min - k as f64 * trend.step;
            if lower < target - EDGE_EPSILON {
                break;
            }
            let lower = lower.max(cfg.price_floor);
            let upper = real_min - (k - 1) as f64 * trend.step;
            if upper <= lower {
                trace!(lower, upper, "step below edge resolution");
                break;
            }
            let midpoint = (lower + upper) / 2.0;
            let band = Band::from_raw(lower, upper, trend.surcharge_at(midpoint, cfg));
            out.push(ExtrapolatedBand::new(band, ExtrapolationDirection::Backward));
        }
        out.reverse();
        out
    }

    /// Bands above the published range, from the last bands of `post`.
    fn forward(&self, sorted: &[Band], post: &[Band]) -> Vec<ExtrapolatedBand> {
        let cfg = &self.config;
        if post.len() < MIN_REGIME_BANDS {
            return Vec::new();
        }
        let real_max = sorted[sorted.len() - 1].but_less_than;
        let target = real_max + cfg.extension_distance;
        if !real_max.is_finite() || !target.is_finite() {
            return Vec::new();
        }

        let take = cfg.sample_size.max(MIN_REGIME_BANDS);
        let sample = &post[post.len().saturating_sub(take)..];
        let trend = self.trend(sample, sample[sample.len() - 1]);

        let mut out = Vec::new();
        for k in 0..step_limit(target - real_max, trend.step) {
            let lower = real_max + k as f64 * trend.step;
            if lower >= target - EDGE_EPSILON {
                break;
            }
            let upper = real_max + (k + 1) as f64 * trend.step;
            if upper <= lower {
                trace!(lower, upper, "step below edge resolution");
                break;
            }
            let midpoint = (lower + upper) / 2.0;
            let band = Band::from_raw(lower, upper, trend.surcharge_at(midpoint, cfg));
            out.push(ExtrapolatedBand::new(band, ExtrapolationDirection::Forward));
        }
        out
    }
}

/// Extrapolate with the default constants.
///
/// Upper bound on the steps needed to cover `distance`, one more than the
/// exact count so the edge comparison decides the last band.
fn step_limit(distance: f64, step: f64) -> usize {
    let steps = ((distance + EDGE_EPSILON) / step).ceil();
    if steps.is_finite() && steps > 0.0 {
        (steps as usize).saturating_add(1)
    } else {
        0
    }
}

/// See [`BandExtrapolator::extrapolate`].
pub fn extrapolate_bands<P>(
    bands: &[Band],
    carrier: &str,
    market: &str,
    fuel_category: &str,
    policy: &P,
) -> Vec<ExtrapolatedBand>
where
    P: SkipPolicy + ?Sized,
{
    BandExtrapolator::default().extrapolate(bands, carrier, market, fuel_category, policy)
}
