//! autohaul-sim - closed-loop simulator for the Autohaul control core
//!
//! Runs the fault monitor, command logic and navigation loops against a toy
//! kinematic truck, with a scripted operator driving a square route.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod config;
mod error;
mod plant;
mod report;
mod runner;
mod scenario;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigFormat, SimConfig};
use crate::error::SimError;
use crate::report::ReportFormat;
use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "autohaul-sim")]
#[command(about = "Closed-loop simulator for the Autohaul truck control core")]
#[command(version)]
struct Cli {
    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Run time in seconds
        #[arg(short, long, default_value_t = 10)]
        duration: u64,

        /// Scripted scenario
        #[arg(short, long, value_enum, default_value_t = Scenario::Nominal)]
        scenario: Scenario,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        report: ReportFormat,
    },

    /// Print the default configuration
    DefaultConfig {
        #[arg(value_enum, default_value_t = ConfigFormat::Yaml)]
        format: ConfigFormat,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<SimError>().map_or(1, SimError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig, SimError> {
    match path {
        Some(path) => SimConfig::load(path),
        None => Ok(SimConfig::default()),
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run {
            duration,
            scenario,
            report,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let summary =
                runner::run(&config, *scenario, Duration::from_secs(*duration)).await?;
            println!("{}", summary.render(*report)?);
            Ok(())
        }
        Commands::DefaultConfig { format } => {
            print!("{}", SimConfig::default().render(*format)?);
            Ok(())
        }
    }
}
