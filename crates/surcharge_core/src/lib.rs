//! # surcharge_core: Band Analytics for Carrier Fuel-Surcharge Tables
//!
//! Carriers publish fuel surcharges as tables of price bands: a surcharge
//! percentage for each half-open fuel price interval. This crate finds
//! where a table changes its bucket granularity (the inflection point) and
//! synthesises a short linear continuation of the table beyond its
//! published range for charting.
//!
//! ## Modules
//!
//! - [`types`]: `Band`, `ExtrapolatedBand`, upstream row shapes, `BandError`
//! - [`math`]: mean and slope estimators
//! - [`analytics`]: inflection detector, band extrapolator, `CarrierCurve`
//! - [`policy`]: injected skip policy for converted carrier tables
//! - [`pivot`]: wide comparison rows consumed by batch detection
//!
//! ## Purity
//!
//! Every analytics entry point is a synchronous pure function over
//! borrowed slices: it sorts a copy, returns freshly allocated results and
//! never fails. Callers recompute on each input change; nothing is cached.
//!
//! ## Usage Examples
//!
//! ```rust
//! use surcharge_core::analytics::{extrapolate_bands, find_inflection};
//! use surcharge_core::types::Band;
//!
//! let bands = [
//!     Band::from_raw(2.00, 2.10, 18.00),
//!     Band::from_raw(2.10, 2.20, 18.25),
//!     Band::from_raw(2.20, 2.22, 18.50),
//!     Band::from_raw(2.22, 2.24, 18.75),
//! ];
//!
//! assert_eq!(find_inflection(&bands), Some(2.20));
//!
//! let synthetic = extrapolate_bands(&bands, "UPS", "US", "ground", &());
//! assert!(synthetic.iter().all(|b| b.is_extrapolated));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytics;
pub mod math;
pub mod pivot;
pub mod policy;
pub mod types;
