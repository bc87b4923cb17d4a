//! Pivot carrier curves into wide comparison rows.
//!
//! Wide rows are the input of
//! [`find_carrier_inflections`](crate::analytics::find_carrier_inflections).
//! Only the two shapes detection consumes are provided here.

use std::collections::BTreeSet;

use crate::analytics::CarrierCurve;
use crate::types::{Band, ComparisonRow};

/// Default minimum populated columns for [`comparable_view`].
pub const MIN_COMPARABLE_CARRIERS: usize = 2;

/// Total-ordered `f64` for use as a set key.
#[derive(Debug, Clone, Copy)]
struct Edge(f64);

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for Edge {}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One row per distinct published interval across all curves.
///
/// A carrier's column is filled only where it publishes exactly that
/// interval; every carrier gets a column, `None` where absent.
///
/// # Example
///
/// ```
/// use surcharge_core::analytics::CarrierCurve;
/// use surcharge_core::pivot::complete_view;
/// use surcharge_core::types::{Band, CurveKey};
///
/// let ups = CarrierCurve::new(
///     CurveKey::new("US", "ground", "UPS"),
///     vec![Band::from_raw(2.0, 2.1, 18.0), Band::from_raw(2.1, 2.2, 18.25)],
/// );
/// let fedex = CarrierCurve::new(
///     CurveKey::new("US", "ground", "FedEx"),
///     vec![Band::from_raw(2.0, 2.1, 17.0)],
/// );
/// let rows = complete_view(&[ups, fedex]);
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].surcharge("UPS"), Some(18.25));
/// assert_eq!(rows[1].surcharge("FedEx"), None);
/// ```
pub fn complete_view(curves: &[CarrierCurve]) -> Vec<ComparisonRow> {
    let intervals: BTreeSet<(Edge, Edge)> = curves
        .iter()
        .flat_map(|c| c.bands())
        .map(|b| (Edge(b.at_least), Edge(b.but_less_than)))
        .collect();

    intervals
        .into_iter()
        .map(|(lo, hi)| {
            curves.iter().fold(ComparisonRow::new(lo.0, hi.0), |row, curve| {
                let pct = curve
                    .bands()
                    .iter()
                    .find(|b| Edge(b.at_least) == lo && Edge(b.but_less_than) == hi)
                    .map(|b| b.surcharge_pct);
                row.with_surcharge(curve.key().carrier.clone(), pct)
            })
        })
        .collect()
}

/// Elementary intervals between all distinct band edges, keeping those
/// where at least `min_carriers` carriers have an overlapping band.
///
/// Each carrier column takes the surcharge of the first of its bands that
/// overlaps the interval.
///
/// # Example
///
/// ```
/// use surcharge_core::analytics::CarrierCurve;
/// use surcharge_core::pivot::comparable_view;
/// use surcharge_core::types::{Band, CurveKey};
///
/// let ups = CarrierCurve::new(
///     CurveKey::new("US", "ground", "UPS"),
///     vec![Band::from_raw(2.0, 2.5, 18.0)],
/// );
/// let fedex = CarrierCurve::new(
///     CurveKey::new("US", "ground", "FedEx"),
///     vec![Band::from_raw(2.2, 2.4, 17.0), Band::from_raw(2.4, 3.0, 17.5)],
/// );
/// let rows = comparable_view(&[ups, fedex], 2);
/// // [2.2, 2.4) and [2.4, 2.5) are covered by both
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].surcharge("FedEx"), Some(17.5));
/// ```
pub fn comparable_view(curves: &[CarrierCurve], min_carriers: usize) -> Vec<ComparisonRow> {
    let edges: Vec<f64> = curves
        .iter()
        .flat_map(|c| c.bands())
        .flat_map(|b| [Edge(b.at_least), Edge(b.but_less_than)])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|e| e.0)
        .collect();

    edges
        .windows(2)
        .map(|w| {
            let (lo, hi) = (w[0], w[1]);
            curves.iter().fold(ComparisonRow::new(lo, hi), |row, curve| {
                let pct = first_overlap(curve.bands(), lo, hi).map(|b| b.surcharge_pct);
                row.with_surcharge(curve.key().carrier.clone(), pct)
            })
        })
        .filter(|row| row.populated() >= min_carriers)
        .collect()
}

fn first_overlap(bands: &[Band], lo: f64, hi: f64) -> Option<&Band> {
    bands.iter().find(|b| b.overlaps(lo, hi))
}

/// Carrier names present in `curves`, in input order, without duplicates.
pub fn carriers(curves: &[CarrierCurve]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    curves
        .iter()
        .map(|c| c.key().carrier.clone())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
