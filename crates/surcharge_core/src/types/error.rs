//! Error types for band construction and validation.
//!
//! The detection and extrapolation engines are total and never return
//! errors. These types only appear at the boundary where raw upstream
//! rows are turned into [`Band`](super::Band) values.

use thiserror::Error;

/// Band construction errors.
///
/// # Variants
/// - `InvalidInterval`: Lower edge is not strictly below the upper edge
/// - `NonFinite`: A field is NaN or infinite
/// - `MissingSurcharge`: Upstream row carried a null surcharge
///
/// # Examples
/// ```
/// use surcharge_core::types::BandError;
///
/// let err = BandError::InvalidInterval { at_least: 2.1, but_less_than: 2.0 };
/// assert_eq!(format!("{}", err), "Invalid band interval: [2.1, 2)");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandError {
    /// `at_least` is not strictly below `but_less_than`.
    #[error("Invalid band interval: [{at_least}, {but_less_than})")]
    InvalidInterval {
        /// Inclusive lower edge
        at_least: f64,
        /// Exclusive upper edge
        but_less_than: f64,
    },

    /// A numeric field is NaN or infinite.
    #[error("Non-finite value in field `{field}`: {value}")]
    NonFinite {
        /// Name of the offending field
        field: &'static str,
        /// The offending value
        value: f64,
    },

    /// The upstream row has no surcharge for this carrier.
    #[error("Missing surcharge for carrier {carrier} at {at_least}")]
    MissingSurcharge {
        /// Carrier name
        carrier: String,
        /// Lower edge of the row's interval
        at_least: f64,
    },
}
