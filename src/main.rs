use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use manifest_shell::cli::{Cli, commands};
use manifest_shell::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.apply_overrides(&mut config);

    // The terminal belongs to the UI, so logs go to a file (truncated each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&config.logging.file)
        .with_context(|| format!("Failed to open log file {:?}", config.logging.file))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    info!("Starting manifest-shell");
    commands::dispatch(cli, config).await
}
