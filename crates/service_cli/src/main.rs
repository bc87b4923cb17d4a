//! ReFuel CLI - command-line front end for the surcharge band engine
//!
//! # Commands
//!
//! - `refuel inflection --input <file>` - Detect regime changes per curve
//! - `refuel extrapolate --input <file>` - Generate synthetic bands
//! - `refuel batch --input <file> --market <m> --fuel-category <f>` - Batch
//!   detection over wide comparison rows
//! - `refuel skip-list` - Print the effective skip list
//! - `refuel check` - Validate configuration
//!
//! Input files are JSON arrays or CSV tables of surcharge rows.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod input;
mod output;

pub use error::{CliError, Result};

use commands::batch::View;
use config::{build_config, CliArgs, LogLevel};
use input::RowFilter;

/// ReFuel surcharge band CLI
#[derive(Parser)]
#[command(name = "refuel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format (table, json, csv)
    #[arg(short, long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Input file and row filters shared by the curve commands
#[derive(Args)]
struct InputArgs {
    /// Path to surcharge rows (.json or .csv)
    #[arg(short, long)]
    input: String,

    /// Only this market
    #[arg(short, long)]
    market: Option<String>,

    /// Only this fuel category
    #[arg(long)]
    fuel_category: Option<String>,

    /// Only this carrier
    #[arg(long)]
    carrier: Option<String>,
}

impl InputArgs {
    fn filter(&self) -> RowFilter {
        RowFilter {
            market: self.market.clone(),
            fuel_category: self.fuel_category.clone(),
            carrier: self.carrier.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the inflection price of each carrier curve
    Inflection {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Generate synthetic bands below and above each curve
    Extrapolate {
        #[command(flatten)]
        input: InputArgs,

        /// Also print the published bands
        #[arg(long)]
        include_real: bool,
    },

    /// Batch detection over one market and fuel category
    Batch {
        /// Path to surcharge rows (.json or .csv)
        #[arg(short, long)]
        input: String,

        /// Market code
        #[arg(short, long)]
        market: String,

        /// Fuel category
        #[arg(long)]
        fuel_category: String,

        /// Wide table the detector reads
        #[arg(long, value_enum, default_value_t = View::Complete)]
        view: View,

        /// Minimum overlapping carriers per comparable row
        #[arg(long, default_value_t = surcharge_core::pivot::MIN_COMPARABLE_CARRIERS)]
        min_carriers: usize,
    },

    /// Print the effective skip list
    SkipList {
        /// Restrict to one market (requires --fuel-category)
        #[arg(short, long)]
        market: Option<String>,

        /// Restrict to one fuel category (requires --market)
        #[arg(long)]
        fuel_category: Option<String>,
    },

    /// Check configuration
    Check,
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config_file: cli.config.clone(),
        log_level: cli
            .log_level
            .clone()
            .or_else(|| cli.verbose.then(|| "debug".to_string())),
        output_format: cli.format.clone(),
    };
    let config = build_config(&args)?;

    init_tracing(config.log_level);
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Inflection { input } => {
            commands::inflection::run(&input.input, &input.filter(), &config)
        }
        Commands::Extrapolate {
            input,
            include_real,
        } => commands::extrapolate::run(&input.input, &input.filter(), include_real, &config),
        Commands::Batch {
            input,
            market,
            fuel_category,
            view,
            min_carriers,
        } => commands::batch::run(&input, &market, &fuel_category, view, min_carriers, &config),
        Commands::SkipList {
            market,
            fuel_category,
        } => commands::skip_list::run(market.as_deref(), fuel_category.as_deref(), &config),
        Commands::Check => commands::check::run(&config),
    }
}
