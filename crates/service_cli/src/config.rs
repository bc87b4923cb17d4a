//! CLI configuration management
//!
//! Handles loading configuration from a TOML file, environment variables
//! and CLI arguments.
//!
//! ```toml
//! log_level = "info"
//! output_format = "table"
//!
//! [inflection]
//! narrow_factor = 0.7
//! wide_factor = 1.3
//!
//! [extrapolation]
//! extension_distance = 1.0
//!
//! [[skip_list]]
//! market = "DE"
//! carrier = "DHL"
//! fuel_category = "road"
//! ```

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use surcharge_core::analytics::{
    BandExtrapolator, ExtrapolationConfig, InflectionConfig, InflectionDetector,
};
use surcharge_core::policy::{SkipEntry, SkipList};
use thiserror::Error;

/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "REFUEL_LOG_LEVEL";
/// Environment variable overriding the output format.
pub const ENV_OUTPUT_FORMAT: &str = "REFUEL_OUTPUT_FORMAT";
/// Environment variable appending skip entries (`market:carrier:category,...`).
pub const ENV_SKIP_LIST: &str = "REFUEL_SKIP_LIST";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid output format: {0}. Must be one of: table, json, csv")]
    InvalidOutputFormat(String),

    #[error("Invalid skip entry: {0}. Expected market:carrier:fuel_category")]
    InvalidSkipEntry(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// How command results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ConfigError::InvalidOutputFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// CLI configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefuelConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Output format for command results
    #[serde(deserialize_with = "deserialize_output_format")]
    pub output_format: OutputFormat,
    /// Inflection detector thresholds
    pub inflection: InflectionConfig,
    /// Extrapolation constants
    pub extrapolation: ExtrapolationConfig,
    /// Curves excluded from detection and extrapolation
    pub skip_list: SkipList,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_output_format<'de, D>(deserializer: D) -> Result<OutputFormat, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    OutputFormat::from_str(&s).map_err(serde::de::Error::custom)
}

/// Parse a comma-separated `market:carrier:fuel_category` list.
pub fn parse_skip_list(s: &str) -> Result<SkipList, ConfigError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| SkipEntry::parse(part).ok_or_else(|| ConfigError::InvalidSkipEntry(part.to_string())))
        .collect()
}

impl RefuelConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RefuelConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Skip entries from the environment are appended to the file list.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(format) = lookup(ENV_OUTPUT_FORMAT) {
            self.output_format = OutputFormat::from_str(&format)?;
        }
        if let Some(entries) = lookup(ENV_SKIP_LIST) {
            self.skip_list.extend(parse_skip_list(&entries)?);
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let inf = &self.inflection;
        if inf.min_bands < 3 {
            return Err(ConfigError::InvalidThreshold(format!(
                "inflection.min_bands must be >= 3, got {}",
                inf.min_bands
            )));
        }
        if !(inf.narrow_factor > 0.0 && inf.narrow_factor < 1.0) {
            return Err(ConfigError::InvalidThreshold(format!(
                "inflection.narrow_factor must be in (0, 1), got {}",
                inf.narrow_factor
            )));
        }
        if !(inf.wide_factor > 1.0 && inf.wide_factor.is_finite()) {
            return Err(ConfigError::InvalidThreshold(format!(
                "inflection.wide_factor must be > 1, got {}",
                inf.wide_factor
            )));
        }
        if !(inf.immediate_ratio_low > 0.0
            && inf.immediate_ratio_low < 1.0
            && inf.immediate_ratio_high > 1.0)
        {
            return Err(ConfigError::InvalidThreshold(format!(
                "inflection immediate ratios must satisfy 0 < low < 1 < high, got {} / {}",
                inf.immediate_ratio_low, inf.immediate_ratio_high
            )));
        }
        if inf.min_consecutive == 0 || inf.lookahead < inf.min_consecutive {
            return Err(ConfigError::InvalidThreshold(format!(
                "inflection.lookahead ({}) must be >= min_consecutive ({}) >= 1",
                inf.lookahead, inf.min_consecutive
            )));
        }

        let ext = &self.extrapolation;
        if !(ext.extension_distance > 0.0 && ext.extension_distance.is_finite()) {
            return Err(ConfigError::InvalidThreshold(format!(
                "extrapolation.extension_distance must be positive, got {}",
                ext.extension_distance
            )));
        }
        if !(ext.min_step_width > 0.0) {
            return Err(ConfigError::InvalidThreshold(format!(
                "extrapolation.min_step_width must be positive, got {}",
                ext.min_step_width
            )));
        }
        if ext.sample_size < 2 || ext.min_real_bands < 2 {
            return Err(ConfigError::InvalidThreshold(
                "extrapolation.sample_size and min_real_bands must be >= 2".to_string(),
            ));
        }
        if !(ext.surcharge_min < ext.surcharge_max) || !ext.price_floor.is_finite() {
            return Err(ConfigError::InvalidThreshold(format!(
                "extrapolation clamp [{}, {}] or price floor {} is invalid",
                ext.surcharge_min, ext.surcharge_max, ext.price_floor
            )));
        }

        Ok(())
    }

    /// Detector using the configured thresholds
    pub fn detector(&self) -> InflectionDetector {
        InflectionDetector::new(self.inflection)
    }

    /// Extrapolator using the configured constants and thresholds
    pub fn extrapolator(&self) -> BandExtrapolator {
        BandExtrapolator::new(self.extrapolation).with_detector(self.detector())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if let Some(format) = &cli.output_format {
            self.output_format = OutputFormat::from_str(format)?;
        }
        Ok(())
    }
}

/// CLI arguments relevant to configuration
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Output format override
    pub output_format: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<RefuelConfig, ConfigError> {
    build_config_with_env(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an explicit environment lookup.
pub fn build_config_with_env<F>(cli: &CliArgs, lookup: F) -> Result<RefuelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if let Some(config_path) = &cli.config_file {
        RefuelConfig::from_file(config_path)?
    } else {
        RefuelConfig::default()
    };

    config.apply_env(lookup)?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use surcharge_core::policy::SkipPolicy;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RefuelConfig::default();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.output_format, OutputFormat::Table);
        assert_eq!(config.inflection, InflectionConfig::default());
        assert_eq!(config.extrapolation, ExtrapolationConfig::default());
        assert!(config.skip_list.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("csv").unwrap(), OutputFormat::Csv);
        assert_eq!(format!("{}", OutputFormat::Table), "table");
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            log_level = "debug"
            output_format = "json"

            [inflection]
            narrow_factor = 0.6

            [extrapolation]
            extension_distance = 0.5

            [[skip_list]]
            market = "DE"
            carrier = "DHL"
            fuel_category = "road"

            [[skip_list]]
            market = "*"
            carrier = "Hermes"
            fuel_category = "*"
        "#;

        let config = RefuelConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.inflection.narrow_factor, 0.6);
        assert_eq!(config.inflection.wide_factor, 1.3);
        assert_eq!(config.extrapolation.extension_distance, 0.5);
        assert_eq!(config.extrapolation.min_step_width, 0.01);
        assert_eq!(config.skip_list.len(), 2);
        assert!(config.skip_list.skips("DE", "DHL", "road"));
        assert!(config.skip_list.skips("US", "Hermes", "ground"));
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let config = RefuelConfig::from_toml_str("output_format = \"csv\"").unwrap();
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = RefuelConfig::from_toml_str("[inflection]\nnarrow_factor = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(_)));

        let err =
            RefuelConfig::from_toml_str("[extrapolation]\nmin_step_width = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(_)));

        let err = RefuelConfig::from_toml_str("[inflection]\nlookahead = 1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(_)));
    }

    #[test]
    fn test_parse_skip_list() {
        let list = parse_skip_list("DE:DHL:road, US:UPS:ground,").unwrap();
        assert_eq!(list.len(), 2);
        assert!(matches!(
            parse_skip_list("DE:DHL"),
            Err(ConfigError::InvalidSkipEntry(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RefuelConfig::from_toml_str(
            "[[skip_list]]\nmarket = \"DE\"\ncarrier = \"DHL\"\nfuel_category = \"road\"",
        )
        .unwrap();
        config
            .apply_env(env(&[
                (ENV_LOG_LEVEL, "error"),
                (ENV_OUTPUT_FORMAT, "json"),
                (ENV_SKIP_LIST, "US:UPS:ground"),
            ]))
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.skip_list.len(), 2);
    }

    #[test]
    fn test_env_invalid_value() {
        let mut config = RefuelConfig::default();
        let result = config.apply_env(env(&[(ENV_LOG_LEVEL, "chatty")]));
        assert!(matches!(result, Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_cli_args_merge() {
        let mut config = RefuelConfig::default();
        let cli = CliArgs {
            config_file: None,
            log_level: Some("debug".to_string()),
            output_format: Some("csv".to_string()),
        };
        config.merge_with_cli(&cli).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.output_format, OutputFormat::Csv);
    }

    #[test]
    fn test_build_config_priority() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"info\"\noutput_format = \"json\"").unwrap();

        let cli = CliArgs {
            config_file: Some(file.path().to_path_buf()),
            log_level: Some("trace".to_string()),
            output_format: None,
        };
        let config =
            build_config_with_env(&cli, env(&[(ENV_OUTPUT_FORMAT, "csv"), (ENV_LOG_LEVEL, "error")]))
                .unwrap();

        // CLI beats env, env beats file
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.output_format, OutputFormat::Csv);
    }

    #[test]
    fn test_build_config_missing_file() {
        let cli = CliArgs {
            config_file: Some(PathBuf::from("/nonexistent/refuel.toml")),
            ..Default::default()
        };
        let result = build_config_with_env(&cli, env(&[]));
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidLogLevel("bad".to_string());
        assert!(err.to_string().contains("Invalid log level"));

        let err = ConfigError::InvalidSkipEntry("x".to_string());
        assert!(err.to_string().contains("market:carrier:fuel_category"));
    }
}
