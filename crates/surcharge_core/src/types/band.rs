//! Price bands and their synthetic counterparts.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::BandError;

/// A half-open price interval `[at_least, but_less_than)` and the surcharge
/// percentage that applies to shipments priced inside it.
///
/// Prices are in the market's fuel price unit (e.g. USD per gallon).
/// On the wire the edges are named `at_least_usd` / `but_less_than_usd`,
/// matching the upstream surcharge tables.
///
/// # Example
///
/// ```
/// use surcharge_core::types::Band;
///
/// let band = Band::new(2.00, 2.10, 18.5).unwrap();
/// assert!((band.width() - 0.10).abs() < 1e-12);
/// assert!((band.midpoint() - 2.05).abs() < 1e-12);
/// assert!(band.contains(2.00));
/// assert!(!band.contains(2.10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Inclusive lower price edge
    #[serde(rename = "at_least_usd", alias = "at_least")]
    pub at_least: f64,
    /// Exclusive upper price edge
    #[serde(rename = "but_less_than_usd", alias = "but_less_than")]
    pub but_less_than: f64,
    /// Surcharge rate in percent
    pub surcharge_pct: f64,
}

impl Band {
    /// Construct a validated band.
    ///
    /// # Errors
    ///
    /// * `BandError::NonFinite` - any field is NaN or infinite
    /// * `BandError::InvalidInterval` - `at_least >= but_less_than`
    pub fn new(at_least: f64, but_less_than: f64, surcharge_pct: f64) -> Result<Self, BandError> {
        for (field, value) in [
            ("at_least", at_least),
            ("but_less_than", but_less_than),
            ("surcharge_pct", surcharge_pct),
        ] {
            if !value.is_finite() {
                return Err(BandError::NonFinite { field, value });
            }
        }
        if at_least >= but_less_than {
            return Err(BandError::InvalidInterval {
                at_least,
                but_less_than,
            });
        }
        Ok(Self::from_raw(at_least, but_less_than, surcharge_pct))
    }

    /// Construct without validation.
    ///
    /// The engine functions accept degenerate bands (zero or negative
    /// width), so tests and internal generators use this directly.
    #[inline]
    pub const fn from_raw(at_least: f64, but_less_than: f64, surcharge_pct: f64) -> Self {
        Self {
            at_least,
            but_less_than,
            surcharge_pct,
        }
    }

    /// Step width of the band (`but_less_than - at_least`).
    #[inline]
    pub fn width(&self) -> f64 {
        self.but_less_than - self.at_least
    }

    /// Centre of the price interval.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.at_least + self.but_less_than) / 2.0
    }

    /// Whether `price` falls inside the half-open interval.
    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        self.at_least <= price && price < self.but_less_than
    }

    /// Whether this band overlaps the half-open interval `[lo, hi)`.
    #[inline]
    pub fn overlaps(&self, lo: f64, hi: f64) -> bool {
        self.at_least < hi && self.but_less_than > lo
    }

    /// Display label used by comparison tables, e.g. `$2.00-$2.10`.
    pub fn price_range_label(&self) -> String {
        price_range_label(self.at_least, self.but_less_than)
    }
}

/// Format a price interval as `$lo-$hi` with two decimals.
pub fn price_range_label(at_least: f64, but_less_than: f64) -> String {
    format!("${:.2}-${:.2}", at_least, but_less_than)
}

/// Return an ascending copy of `bands`, ordered by `at_least`.
///
/// Uses a total order on `f64` so NaN edges cannot panic the sort. The
/// caller's slice is left untouched.
pub fn sorted_bands(bands: &[Band]) -> Vec<Band> {
    let mut sorted = bands.to_vec();
    sorted.sort_by(compare_at_least);
    sorted
}

pub(crate) fn compare_at_least(a: &Band, b: &Band) -> Ordering {
    a.at_least.total_cmp(&b.at_least)
}

/// Side of the published range a synthetic band was generated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationDirection {
    /// Below the lowest published price.
    Backward,
    /// Above the highest published price.
    Forward,
}

/// A synthetic band produced by extrapolation.
///
/// Kept as a separate type from [`Band`] so that downstream code can never
/// feed synthetic values back into inflection detection by accident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrapolatedBand {
    /// The generated interval and surcharge
    #[serde(flatten)]
    pub band: Band,
    /// Synthetic-data marker, always `true` for generated bands
    pub is_extrapolated: bool,
    /// Which side of the published range this band extends
    pub direction: ExtrapolationDirection,
}

impl ExtrapolatedBand {
    pub(crate) fn new(band: Band, direction: ExtrapolationDirection) -> Self {
        Self {
            band,
            is_extrapolated: true,
            direction,
        }
    }
}
