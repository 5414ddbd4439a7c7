use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::loader::ManifestError;
use super::types::Manifest;

/// How strictly navigation targets are checked at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Dangling navigation targets abort the load
    #[default]
    Strict,
    /// Dangling navigation targets are logged and surface later as "Screen not found"
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEdge {
    pub screen: String,
    pub event: String,
    pub target: String,
}

impl fmt::Display for DanglingEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --{}--> {} (unknown screen)", self.screen, self.event, self.target)
    }
}

/// Structural problems found in a manifest
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub empty_ids: Vec<usize>,
    pub duplicates: Vec<String>,
    pub dangling: Vec<DanglingEdge>,
}

impl ValidationReport {
    pub fn check(manifest: &Manifest) -> Self {
        let mut report = Self::default();
        let mut seen = HashSet::new();

        for (index, screen) in manifest.screens.iter().enumerate() {
            if screen.screen_id.trim().is_empty() {
                report.empty_ids.push(index);
            } else if !seen.insert(screen.screen_id.as_str())
                && !report.duplicates.contains(&screen.screen_id)
            {
                report.duplicates.push(screen.screen_id.clone());
            }
        }

        for screen in &manifest.screens {
            for (event, target) in &screen.navigation {
                if !seen.contains(target.as_str()) {
                    report.dangling.push(DanglingEdge {
                        screen: screen.screen_id.clone(),
                        event: event.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        report
    }

    pub fn is_clean(&self) -> bool {
        self.empty_ids.is_empty() && self.duplicates.is_empty() && self.dangling.is_empty()
    }

    /// Issues that are tolerated under `mode` but still worth logging
    pub fn warnings(&self, mode: ValidationMode) -> Vec<String> {
        match mode {
            ValidationMode::Strict => Vec::new(),
            ValidationMode::Lenient => self.dangling.iter().map(ToString::to_string).collect(),
        }
    }

    /// First issue that makes the manifest unusable under `mode`
    pub fn into_fatal(self, mode: ValidationMode) -> Option<ManifestError> {
        if let Some(&index) = self.empty_ids.first() {
            return Some(ManifestError::EmptyScreenId { index });
        }
        if let Some(id) = self.duplicates.into_iter().next() {
            return Some(ManifestError::DuplicateScreen(id));
        }
        if mode == ValidationMode::Strict {
            if let Some(edge) = self.dangling.into_iter().next() {
                return Some(ManifestError::DanglingTarget {
                    screen: edge.screen,
                    event: edge.event,
                    target: edge.target,
                });
            }
        }
        None
    }
}
