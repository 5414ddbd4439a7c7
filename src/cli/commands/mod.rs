pub mod run;
pub mod screens;
pub mod simulate;
pub mod validate;

pub use simulate::{SimulateCommands, Step};

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;
use std::time::Duration;

use super::app::{Cli, Commands};
use crate::collab::{FileDevice, MockApi};
use crate::config::Config;
use crate::manifest::{Manifest, load_manifest};
use crate::shell::{Capabilities, EventBus, ShellOptions};

/// Run the selected command against an already-merged config
pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run::run_command(&config).await,
        Commands::Validate => validate::validate_command(&config),
        Commands::Screens => screens::screens_command(&config),
        Commands::Simulate(args) => simulate::simulate_command(&config, args),
    }
}

/// Load the manifest named by the config, or the bundled one
pub fn load_configured_manifest(config: &Config) -> Result<Manifest> {
    let path = config.manifest.path.as_deref();
    load_manifest(path, config.manifest.validation).with_context(|| match path {
        Some(path) => format!("Failed to load manifest {:?}", path),
        None => "Failed to load bundled manifest".to_string(),
    })
}

/// Collaborators for an interactive session
pub fn capabilities(config: &Config) -> Capabilities {
    info!(
        "Mock API latency {}ms, image source {:?}",
        config.api.latency_ms, config.device.image_path
    );
    Capabilities {
        api: Arc::new(MockApi::new(Duration::from_millis(config.api.latency_ms))),
        device: Arc::new(FileDevice::new(config.device.image_path.clone())),
        bus: EventBus::new(),
    }
}

pub fn shell_options(config: &Config) -> ShellOptions {
    ShellOptions {
        depth_warning: config.navigation.depth_warning,
    }
}
