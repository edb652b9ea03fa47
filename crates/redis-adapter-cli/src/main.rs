//! Redis Service Adapter CLI
//!
//! Invoked by the on-demand service broker once per operation. Each
//! subcommand reads a JSON request, writes the JSON response to stdout and
//! exits 0, or writes the caller-facing error message to stdout and exits 1.
//! Operator diagnostics go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Default location of the adapter configuration on a deployed broker VM
const DEFAULT_CONFIG_PATH: &str = "/var/vcap/jobs/service-adapter/config/service-adapter.conf";

/// Redis service adapter CLI
#[derive(Parser)]
#[command(name = "redis-service-adapter")]
#[command(about = "On-demand service adapter for Redis", long_about = None)]
#[command(version)]
struct Cli {
    /// Adapter configuration file
    #[arg(short, long, env = "REDIS_ADAPTER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Generate the deployment manifest for a service instance
    GenerateManifest {
        /// Request document (JSON); reads stdin when omitted or `-`
        input: Option<PathBuf>,
    },

    /// Create credentials for a deployed service instance
    CreateBinding {
        /// Request document (JSON); reads stdin when omitted or `-`
        input: Option<PathBuf>,
    },

    /// Validate and remove a binding
    DeleteBinding {
        /// Request document (JSON); reads stdin when omitted or `-`
        input: Option<PathBuf>,
    },

    /// Print the dashboard URL of a service instance
    DashboardUrl {
        /// Request document (JSON); reads stdin when omitted or `-`
        input: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the response
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match commands::execute(cli.command, &cli.config) {
        Ok(response) => {
            println!("{}", response);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:#}", err);
            println!("{}", commands::caller_message(&err));
            ExitCode::FAILURE
        }
    }
}
