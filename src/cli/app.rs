use super::commands::SimulateCommands;
use crate::config::Config;
use crate::manifest::ValidationMode;
use clap::{Parser, Subcommand};
use log::debug;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "manifest-shell")]
#[command(about = "Run a manifest-driven terminal app shell")]
pub struct Cli {
    /// Manifest file to load instead of the bundled one
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Log dangling navigation targets instead of rejecting the manifest
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Image file returned by the photo picker
    #[arg(long, global = true, value_name = "PATH")]
    pub image: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive shell (default)
    Run,
    /// Load the manifest and report validation problems
    Validate,
    /// List screens with their handler, agent and navigation edges
    Screens,
    /// Apply navigation steps headlessly and print the stack after each one
    Simulate(SimulateCommands),
}

impl Cli {
    /// Flags win over both the config file and the environment
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.manifest {
            debug!("--manifest overrides manifest path");
            config.manifest.path = Some(path.clone());
        }
        if self.lenient {
            config.manifest.validation = ValidationMode::Lenient;
        }
        if let Some(path) = &self.image {
            debug!("--image overrides device image path");
            config.device.image_path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::Step;
    use crate::config::{IMAGE_ENV, MANIFEST_ENV};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_is_the_default() {
        let cli = Cli::try_parse_from(["manifest-shell"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.lenient);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["manifest-shell", "validate", "--lenient", "--manifest", "app.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Validate)));
        assert!(cli.lenient);
        assert_eq!(cli.manifest, Some(PathBuf::from("app.json")));
    }

    #[test]
    fn test_simulate_steps() {
        let cli = Cli::try_parse_from(["manifest-shell", "simulate", "resolve:open_history", "back"]).unwrap();
        match cli.command {
            Some(Commands::Simulate(args)) => {
                assert_eq!(args.steps, vec![Step::Resolve("open_history".into()), Step::Back]);
            }
            _ => panic!("expected simulate"),
        }
        assert!(Cli::try_parse_from(["manifest-shell", "simulate"]).is_err());
        assert!(Cli::try_parse_from(["manifest-shell", "simulate", "jump:home"]).is_err());
    }

    #[test]
    fn test_flags_beat_env_which_beats_file() {
        let mut config = Config::default();
        config.manifest.path = Some(PathBuf::from("from-file.json"));
        config.device.image_path = Some(PathBuf::from("file.jpg"));

        config.apply_env(|key| match key {
            k if k == MANIFEST_ENV => Some("from-env.json".to_string()),
            k if k == IMAGE_ENV => Some("env.jpg".to_string()),
            _ => None,
        });
        assert_eq!(config.manifest.path, Some(PathBuf::from("from-env.json")));

        let cli = Cli::try_parse_from(["manifest-shell", "--manifest", "from-flag.json", "--lenient"]).unwrap();
        cli.apply_overrides(&mut config);

        assert_eq!(config.manifest.path, Some(PathBuf::from("from-flag.json")));
        assert_eq!(config.manifest.validation, ValidationMode::Lenient);
        // No --image flag, so the env value stands
        assert_eq!(config.device.image_path, Some(PathBuf::from("env.jpg")));
    }
}
