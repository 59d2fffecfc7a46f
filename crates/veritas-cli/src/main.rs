//! Veritas CLI — operator tooling for the credential trust registry and
//! predicate solver.
//!
//! Subcommands: init, match, missing, authority, validate.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{LoggingConfig, VeritasConfig};

/// Veritas — credential trust and predicate matching.
#[derive(Parser, Debug)]
#[command(name = "veritas", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(long, global = true, default_value = "veritas.toml")]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override the log format (text, json).
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Select the minimal credential set satisfying a predicate tree.
    #[command(name = "match")]
    Match(commands::matching::MatchArgs),
    /// Report which predicates a credential set cannot satisfy.
    Missing(commands::missing::MissingArgs),
    /// Query issuer authority in the configured registry.
    Authority(commands::authority::AuthorityArgs),
    /// Validate presentations and report on a holder.
    Validate(commands::validate::ValidateArgs),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = VeritasConfig::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.clone();
    }
    init_tracing(&config.logging);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Match(args) => commands::matching::run(args, &config),
        Commands::Missing(args) => commands::missing::run(args, &config),
        Commands::Authority(args) => commands::authority::run(args, &config),
        Commands::Validate(args) => commands::validate::run(args, &config),
    }
}
