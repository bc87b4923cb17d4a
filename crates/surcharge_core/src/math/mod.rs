//! Numeric helpers shared by the analytics engines.

pub mod stats;

pub use stats::{clamp, mean, mean_slope};
