use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use perimeter_core::{LogLevel, PerimeterConfig};

mod commands;
mod site;

use commands::{download, render, resolve};

/// Perimeter Command Line Interface
///
/// Runs secure includes and delegated downloads against a site fixture.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Perimeter configuration file (TOML)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Log level; overrides RUST_LOG and the configuration file
    #[clap(long, global = true)]
    log_level: Option<LogLevel>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a wiki link the way the grant form does
    Resolve(resolve::ResolveArgs),

    /// Render one secure include on a host page
    Render(render::RenderArgs),

    /// Serve a delegated download request
    Download(download::DownloadArgs),
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PerimeterConfig> {
    match path {
        Some(path) => Ok(PerimeterConfig::load(path)?),
        None => Ok(PerimeterConfig::default()),
    }
}

fn init_logging(level: Option<LogLevel>, config: &PerimeterConfig) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_filter()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(cli.log_level, &config);

    let result = match &cli.command {
        Commands::Resolve(args) => resolve::execute(args, &config),
        Commands::Render(args) => render::execute(args, &config),
        Commands::Download(args) => download::execute(args, &config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
