//! Band analytics: inflection detection, extrapolation and the per-carrier
//! wrapper that combines them.
//!
//! # Components
//!
//! - [`inflection`]: step-width regime change detection
//! - [`extrapolation`]: linear synthetic bands beyond the published range
//! - [`curve`]: [`CarrierCurve`] orchestration for chart consumers
//!
//! Both engines are pure functions over borrowed slices. They sort a copy
//! of their input, hold no state between calls and never fail: missing
//! signal is reported as `None` or an empty vector.

pub mod curve;
pub mod extrapolation;
pub mod inflection;

pub use curve::{group_curves, CarrierCurve, CurveOverlay};
pub use extrapolation::{extrapolate_bands, BandExtrapolator, ExtrapolationConfig};
pub use inflection::{
    find_carrier_inflections, find_inflection, InflectionConfig, InflectionDetector,
};
