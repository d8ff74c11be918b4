//! Sensutop CLI
//!
//! Command-line entry point for the Sensu terminal dashboard.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use sensutop::config::{user_config_path, SYSTEM_CONFIG_PATH};
use sensutop::load_config;
use tracing::Level;

#[derive(Parser)]
#[command(name = "sensutop")]
#[command(about = "Terminal dashboard for Sensu monitoring events")]
#[command(version)]
struct Args {
    /// System-wide configuration file
    #[arg(long, default_value = SYSTEM_CONFIG_PATH)]
    system_config: PathBuf,

    /// Per-user configuration file (defaults to ~/.sensutop.json)
    #[arg(long)]
    user_config: Option<PathBuf>,

    /// File that receives log output; the terminal is used by the dashboard
    #[arg(long, default_value = "sensutop.log")]
    log_file: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)?;
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    tracing::debug!(
        "Parsed command line arguments: system_config={:?}, user_config={:?}, log_level={:?}",
        args.system_config,
        args.user_config,
        args.log_level
    );

    let mut config_paths = vec![args.system_config];
    if let Some(user_config) = args.user_config.or_else(user_config_path) {
        config_paths.push(user_config);
    }
    let config = load_config(&config_paths)?;

    tracing::info!("Starting sensutop");
    sensutop::run(config).await?;

    Ok(())
}
