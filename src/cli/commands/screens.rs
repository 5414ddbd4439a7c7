use anyhow::Result;
use colored::*;

use super::load_configured_manifest;
use crate::config::Config;
use crate::manifest::Manifest;
use crate::shell::{ScreenKind, ScreenRegistry};

/// One line of the screen listing
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenRow {
    pub screen_id: String,
    pub title: String,
    pub handler: ScreenKind,
    pub agent_id: Option<String>,
    pub edges: Vec<(String, String)>,
    pub is_start: bool,
}

pub fn screens_command(config: &Config) -> Result<()> {
    let manifest = load_configured_manifest(config)?;
    let rows = screen_rows(&manifest, &ScreenRegistry::new());

    println!(
        "{} {} ({} screens)",
        manifest.app.name.bold(),
        format!("[{}]", manifest.app.app_id).dimmed(),
        rows.len()
    );

    for row in rows {
        let marker = if row.is_start { "▶".bright_green().bold() } else { " ".normal() };
        let handler = match row.handler {
            ScreenKind::Fallback => row.handler.to_string().bright_yellow(),
            _ => row.handler.to_string().bright_cyan(),
        };
        println!(
            "{} {} {} {}",
            marker,
            row.screen_id.bold(),
            format!("\"{}\"", row.title).dimmed(),
            handler
        );
        if let Some(agent) = &row.agent_id {
            println!("    agent: {}", agent.bright_magenta());
        }
        for (event, target) in &row.edges {
            println!("    {} → {}", event, target.bright_blue());
        }
    }
    Ok(())
}

/// Screens in manifest order with the handler each one resolves to
pub fn screen_rows(manifest: &Manifest, registry: &ScreenRegistry) -> Vec<ScreenRow> {
    let start = manifest.start_screen_id();
    manifest
        .screens
        .iter()
        .map(|screen| ScreenRow {
            screen_id: screen.screen_id.clone(),
            title: screen.title.clone(),
            handler: registry.screen_component(&screen.screen_id),
            agent_id: screen.agent_id.clone(),
            edges: screen
                .navigation
                .iter()
                .map(|(event, target)| (event.clone(), target.clone()))
                .collect(),
            is_start: screen.screen_id == start,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ValidationMode;

    #[test]
    fn test_rows_follow_manifest_order() {
        let manifest = Manifest::bundled(ValidationMode::Strict).unwrap();
        let rows = screen_rows(&manifest, &ScreenRegistry::new());

        assert_eq!(rows.len(), manifest.screens.len());
        assert_eq!(rows[0].screen_id, "home");
        assert!(rows[0].is_start);
        assert_eq!(rows.iter().filter(|r| r.is_start).count(), 1);

        let capture = rows.iter().find(|r| r.screen_id == "meal_capture").unwrap();
        assert_eq!(capture.handler, ScreenKind::MealCapture);
        assert_eq!(capture.agent_id.as_deref(), Some("agent_analyze_meal"));
        assert!(capture.edges.contains(&("on_back".to_string(), "home".to_string())));
    }

    #[test]
    fn test_unregistered_screen_shows_fallback() {
        let manifest = Manifest::from_json(
            r#"{ "app": { "app_id": "t", "name": "T" },
                 "screens": [ { "screen_id": "home", "title": "Home" }, { "screen_id": "about", "title": "About" } ] }"#,
            ValidationMode::Strict,
        )
        .unwrap();
        let rows = screen_rows(&manifest, &ScreenRegistry::new());
        assert_eq!(rows[1].handler, ScreenKind::Fallback);
    }
}
