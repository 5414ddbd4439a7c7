use anyhow::{Context, Result, bail};
use colored::*;

use crate::config::Config;
use crate::manifest::{Manifest, ValidationMode, ValidationReport, inspect_manifest};
use crate::shell::ScreenRegistry;

/// Findings split by whether they stop the shell from starting
#[derive(Debug, Default, PartialEq)]
pub struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn validate_command(config: &Config) -> Result<()> {
    let path = config.manifest.path.as_deref();
    let (manifest, report) = inspect_manifest(path).context("Failed to read manifest")?;
    let mode = config.manifest.validation;
    let findings = assess(&manifest, report, mode, &ScreenRegistry::new());

    let source = path.map_or_else(|| "bundled manifest".to_string(), |p| p.display().to_string());
    println!(
        "{} {} ({}, {} screens, {:?} validation)",
        "Manifest".bold(),
        manifest.app.app_id.bright_cyan().bold(),
        source.dimmed(),
        manifest.screens.len(),
        mode
    );
    println!("  Start screen: {}", manifest.start_screen_id().bright_green());

    for error in &findings.errors {
        println!("  {} {}", "✗".bright_red().bold(), error);
    }
    for warning in &findings.warnings {
        println!("  {} {}", "⚠".bright_yellow().bold(), warning);
    }

    if !findings.errors.is_empty() {
        bail!("Manifest has {} error(s)", findings.errors.len());
    }
    println!("{} Manifest is valid", "✓".bright_green().bold());
    Ok(())
}

/// Classify every issue under `mode`, plus screens no handler is registered for
pub fn assess(manifest: &Manifest, report: ValidationReport, mode: ValidationMode, registry: &ScreenRegistry) -> Findings {
    let mut findings = Findings::default();

    for index in &report.empty_ids {
        findings.errors.push(format!("Screen at position {} has an empty screen_id", index));
    }
    for id in &report.duplicates {
        findings.errors.push(format!("Duplicate screen_id '{}'", id));
    }
    for edge in &report.dangling {
        match mode {
            ValidationMode::Strict => findings.errors.push(edge.to_string()),
            ValidationMode::Lenient => findings.warnings.push(edge.to_string()),
        }
    }

    if let Some(explicit) = &manifest.app.start_screen_id {
        if !manifest.has_screen(explicit) {
            findings.warnings.push(format!(
                "start_screen_id '{}' is not defined; starting at '{}'",
                explicit,
                manifest.start_screen_id()
            ));
        }
    }
    for screen in &manifest.screens {
        if !screen.screen_id.trim().is_empty() && !registry.is_registered(&screen.screen_id) {
            findings
                .warnings
                .push(format!("No handler registered for '{}'; it renders the fallback", screen.screen_id));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: serde_json::Value) -> (Manifest, ValidationReport) {
        let manifest: Manifest = serde_json::from_value(value).unwrap();
        let report = ValidationReport::check(&manifest);
        (manifest, report)
    }

    #[test]
    fn test_bundled_manifest_has_no_findings() {
        let (manifest, report) = inspect_manifest(None).unwrap();
        let findings = assess(&manifest, report, ValidationMode::Strict, &ScreenRegistry::new());
        assert_eq!(findings, Findings::default());
    }

    #[test]
    fn test_dangling_severity_follows_mode() {
        let value = json!({
            "app": { "app_id": "t", "name": "T" },
            "screens": [{ "screen_id": "home", "title": "Home", "navigation": { "go": "ghost" } }]
        });

        let (m, report) = manifest(value.clone());
        let strict = assess(&m, report, ValidationMode::Strict, &ScreenRegistry::new());
        assert_eq!(strict.errors.len(), 1);

        let (m, report) = manifest(value);
        let lenient = assess(&m, report, ValidationMode::Lenient, &ScreenRegistry::new());
        assert!(lenient.errors.is_empty());
        assert!(lenient.warnings[0].contains("ghost"));
    }

    #[test]
    fn test_unregistered_screens_and_bad_start_are_warnings() {
        let (m, report) = manifest(json!({
            "app": { "app_id": "t", "name": "T", "start_screen_id": "splash" },
            "screens": [
                { "screen_id": "home", "title": "Home" },
                { "screen_id": "settings", "title": "Settings" }
            ]
        }));
        let findings = assess(&m, report, ValidationMode::Strict, &ScreenRegistry::new());
        assert!(findings.errors.is_empty());
        assert_eq!(findings.warnings.len(), 2);
        assert!(findings.warnings.iter().any(|w| w.contains("splash")));
        assert!(findings.warnings.iter().any(|w| w.contains("'settings'")));
    }

    #[test]
    fn test_duplicates_are_errors() {
        let (m, report) = manifest(json!({
            "app": { "app_id": "t", "name": "T" },
            "screens": [
                { "screen_id": "home", "title": "A" },
                { "screen_id": "home", "title": "B" }
            ]
        }));
        let findings = assess(&m, report, ValidationMode::Lenient, &ScreenRegistry::new());
        assert_eq!(findings.errors, vec!["Duplicate screen_id 'home'".to_string()]);
    }
}
