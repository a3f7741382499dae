//! mcphub - maintenance and search tool for the Network MCP Hub catalog
//!
//! Main entry point: global flags, logging setup and command dispatch

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mcphub_core::config::HubConfig;

mod catalog_cli;
mod submit_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "mcphub",
    about = "Maintain, search and submit entries of the Network MCP Hub server catalog",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level (RUST_LOG takes precedence when set)
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    log_json: bool,

    /// Override configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Override the catalog file (servers.json) path
    #[clap(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    #[clap(flatten)]
    Catalog(catalog_cli::CatalogSubcommand),

    /// Build a new server entry from form input
    Submit(submit_cli::SubmitArgs),
}

/// Resolved configuration shared by every command
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: HubConfig,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = HubConfig::load(cli.config.as_deref())?;
        if let Some(path) = &cli.catalog {
            config.catalog_path = path.clone();
        }
        Ok(Self { config })
    }
}

/// Initialize tracing with CLI flags
///
/// Logs always go to stderr so that `--json` output on stdout stays parseable.
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    let settings = Settings::resolve(&cli)?;
    tracing::debug!(config = ?settings.config, "Resolved configuration");

    match cli.command {
        Command::Catalog(command) => command.execute(&settings).await,
        Command::Submit(args) => args.execute(&settings).await,
    }
}
