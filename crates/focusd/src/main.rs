//! focusd - Pomodoro focus timer service
//!
//! Reads commands from stdin (`start`, `pause`, `status`, ...) and drives
//! the timer engine until it receives `quit` or a termination signal.

use anyhow::Result;
use clap::Parser;
use focus_util::default_config_path;
use focusd::{Service, ServiceOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// focusd - Pomodoro focus timer
#[derive(Parser, Debug)]
#[command(name = "focusd")]
#[command(about = "Pomodoro focus timer driven from the command line", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/focusd/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set FOCUSD_DATA_DIR env var)
    #[arg(short, long, env = "FOCUSD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Start hidden: the timer runs on the low-frequency fallback ticks
    #[arg(long)]
    hidden: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries command replies
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "focusd starting");

    let service = Service::new(ServiceOptions {
        config_path: args.config,
        data_dir: args.data_dir,
        start_hidden: args.hidden,
    })?;
    service.run().await
}
