use anyhow::Result;
use clap::Args;
use colored::*;
use std::fmt;
use std::str::FromStr;

use super::load_configured_manifest;
use crate::config::Config;
use crate::manifest::Manifest;
use crate::shell::{NavRequest, NavStack, ScreenRegistry};

#[derive(Args)]
pub struct SimulateCommands {
    /// Navigation steps: `resolve:EVENT`, `go:SCREEN` or `back`
    #[arg(required = true, value_name = "STEP")]
    pub steps: Vec<Step>,
}

/// One headless navigation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Resolve(String),
    Go(String),
    Back,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "back" {
            return Ok(Step::Back);
        }
        match s.split_once(':') {
            Some(("resolve", event)) if !event.is_empty() => Ok(Step::Resolve(event.to_string())),
            Some(("go", screen)) if !screen.is_empty() => Ok(Step::Go(screen.to_string())),
            _ => Err(format!("invalid step '{}', expected resolve:EVENT, go:SCREEN or back", s)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Resolve(event) => write!(f, "resolve:{}", event),
            Step::Go(screen) => write!(f, "go:{}", screen),
            Step::Back => f.write_str("back"),
        }
    }
}

impl From<Step> for NavRequest {
    fn from(step: Step) -> Self {
        match step {
            Step::Resolve(event) => NavRequest::Resolve { event, params: None },
            Step::Go(screen_id) => NavRequest::Go { screen_id, params: None },
            Step::Back => NavRequest::Back,
        }
    }
}

/// Stack state after one step
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub step: Step,
    pub changed: bool,
    pub stack: Vec<String>,
    /// Handler name, or `None` when the top screen isn't in the manifest
    pub view: Option<String>,
}

pub fn simulate_command(config: &Config, args: SimulateCommands) -> Result<()> {
    let manifest = load_configured_manifest(config)?;
    let registry = ScreenRegistry::new();
    let stack = NavStack::new(manifest.start_screen_id()).with_depth_warning(config.navigation.depth_warning);

    println!("{} {}", "start".bold(), manifest.start_screen_id().bright_green());
    for (i, frame) in simulate(&manifest, &registry, stack, args.steps).into_iter().enumerate() {
        let step = if frame.changed {
            format!("{:<28}", frame.step).bright_cyan()
        } else {
            format!("{:<28}", format!("{} (no transition)", frame.step)).dimmed()
        };
        let view = match frame.view {
            Some(view) => view.normal(),
            None => "Screen not found".bright_red().bold(),
        };
        println!("{:>3}. {} {}  [{}]", i + 1, step, frame.stack.join(" > "), view);
    }
    Ok(())
}

/// Apply each step in order, recording the stack after every one
pub fn simulate(manifest: &Manifest, registry: &ScreenRegistry, mut stack: NavStack, steps: Vec<Step>) -> Vec<Frame> {
    steps
        .into_iter()
        .map(|step| {
            let changed = stack.apply(manifest, step.clone().into());
            let top = stack.current_screen_id();
            let view = manifest
                .has_screen(top)
                .then(|| registry.screen_component(top).to_string());
            Frame {
                step,
                changed,
                stack: stack.entries().iter().map(|e| e.screen_id.clone()).collect(),
                view,
            }
        })
        .collect()
}
