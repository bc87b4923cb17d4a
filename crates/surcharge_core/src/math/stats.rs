//! Small estimators used by the band engines.
//!
//! All functions are generic over `T: Float` and total: empty input or
//! degenerate geometry yields a neutral value instead of NaN.

use num_traits::Float;

/// Arithmetic mean, or `None` for an empty slice.
///
/// # Example
///
/// ```
/// use surcharge_core::math::stats::mean;
///
/// assert_eq!(mean(&[1.0_f64, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean::<f64>(&[]), None);
/// ```
pub fn mean<T: Float>(values: &[T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    T::from(values.len()).map(|n| sum / n)
}

/// Mean of the per-pair slopes `Δy / Δx` over adjacent points.
///
/// Pairs with `Δx == 0` (or a non-finite slope) are skipped. Returns zero
/// when no valid pair remains, so callers get a flat projection rather
/// than NaN.
///
/// # Example
///
/// ```
/// use surcharge_core::math::stats::mean_slope;
///
/// let pts = [(0.0_f64, 1.0), (1.0, 3.0), (1.0, 9.0), (2.0, 11.0)];
/// assert_eq!(mean_slope(&pts), 2.0);
/// assert_eq!(mean_slope(&[(1.0_f64, 1.0)]), 0.0);
/// ```
pub fn mean_slope<T: Float>(points: &[(T, T)]) -> T {
    let slopes: Vec<T> = points
        .windows(2)
        .filter_map(|w| {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            let dx = x1 - x0;
            if dx == T::zero() {
                return None;
            }
            let slope = (y1 - y0) / dx;
            slope.is_finite().then_some(slope)
        })
        .collect();
    mean(&slopes).unwrap_or_else(T::zero)
}

/// Clamp `x` into `[lo, hi]`, mapping NaN to `lo`.
#[inline]
pub fn clamp<T: Float>(x: T, lo: T, hi: T) -> T {
    if x.is_nan() {
        lo
    } else {
        x.max(lo).min(hi)
    }
}
