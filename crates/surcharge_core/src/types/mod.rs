//! Domain types: bands, upstream rows and their errors.
//!
//! - [`Band`]: a published price interval and its surcharge
//! - [`ExtrapolatedBand`]: a synthetic band, tagged as such
//! - [`SurchargeRow`], [`ComparisonRow`]: upstream row shapes
//! - [`BandError`]: construction errors

pub mod band;
pub mod error;
pub mod row;

pub use band::{price_range_label, sorted_bands, Band, ExtrapolatedBand, ExtrapolationDirection};
pub use error::BandError;
pub use row::{ComparisonRow, CurveKey, SurchargeRow};
