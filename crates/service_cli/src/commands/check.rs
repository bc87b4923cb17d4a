//! Check command implementation
//!
//! Validates the layered configuration and prints the effective settings.

use serde::Serialize;
use tracing::info;

use crate::config::RefuelConfig;
use crate::output::{emit, Tabular};
use crate::Result;

/// One effective setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingRecord {
    pub setting: &'static str,
    pub value: String,
}

impl Tabular for SettingRecord {
    fn headers() -> &'static [&'static str] {
        &["Setting", "Value"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.setting.to_string(), self.value.clone()]
    }
}

/// Effective settings of `config`.
pub fn settings(config: &RefuelConfig) -> Vec<SettingRecord> {
    let inf = &config.inflection;
    let ext = &config.extrapolation;
    let rec = |setting, value: String| SettingRecord { setting, value };

    vec![
        rec("log_level", config.log_level.to_string()),
        rec("output_format", config.output_format.to_string()),
        rec("inflection.min_bands", inf.min_bands.to_string()),
        rec(
            "inflection.immediate_ratio",
            format!("({}, {})", inf.immediate_ratio_low, inf.immediate_ratio_high),
        ),
        rec("inflection.narrow_factor", inf.narrow_factor.to_string()),
        rec("inflection.wide_factor", inf.wide_factor.to_string()),
        rec("inflection.min_consecutive", inf.min_consecutive.to_string()),
        rec("inflection.lookahead", inf.lookahead.to_string()),
        rec("extrapolation.extension_distance", ext.extension_distance.to_string()),
        rec("extrapolation.min_step_width", ext.min_step_width.to_string()),
        rec("extrapolation.sample_size", ext.sample_size.to_string()),
        rec("extrapolation.min_real_bands", ext.min_real_bands.to_string()),
        rec("extrapolation.price_floor", ext.price_floor.to_string()),
        rec(
            "extrapolation.surcharge_clamp",
            format!("[{}, {}]", ext.surcharge_min, ext.surcharge_max),
        ),
        rec("skip_list.entries", config.skip_list.len().to_string()),
    ]
}

/// Run the check command
pub fn run(config: &RefuelConfig) -> Result<()> {
    info!("Checking configuration...");
    config.validate()?;
    info!("Configuration OK");
    emit(&settings(config), config.output_format)
}
