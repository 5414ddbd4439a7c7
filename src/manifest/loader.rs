use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::Manifest;
use super::validate::{ValidationMode, ValidationReport};

/// Manifest shipped inside the binary
const BUNDLED_MANIFEST: &str = include_str!("../../assets/manifest.json");

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("screen at position {index} has an empty screen_id")]
    EmptyScreenId { index: usize },

    #[error("duplicate screen_id '{0}'")]
    DuplicateScreen(String),

    #[error("screen '{screen}' routes event '{event}' to unknown screen '{target}'")]
    DanglingTarget {
        screen: String,
        event: String,
        target: String,
    },
}

impl Manifest {
    /// Parse and validate the bundled manifest
    pub fn bundled(mode: ValidationMode) -> Result<Self, ManifestError> {
        Self::from_json(BUNDLED_MANIFEST, mode)
    }

    pub fn from_path(path: &Path, mode: ValidationMode) -> Result<Self, ManifestError> {
        debug!("Loading manifest from {:?}", path);
        Self::from_json(&read_source(path)?, mode)
    }

    pub fn from_json(content: &str, mode: ValidationMode) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(content)?;
        let report = ValidationReport::check(&manifest);

        for issue in report.warnings(mode) {
            warn!("Manifest: {}", issue);
        }
        if let Some(err) = report.into_fatal(mode) {
            return Err(err);
        }

        info!(
            "Loaded manifest '{}' with {} screens",
            manifest.app.app_id,
            manifest.screens.len()
        );
        Ok(manifest)
    }
}

/// Load the manifest the shell runs with: an explicit path if given, the bundled one otherwise
pub fn load_manifest(path: Option<&Path>, mode: ValidationMode) -> Result<Manifest, ManifestError> {
    match path {
        Some(path) => Manifest::from_path(path, mode),
        None => Manifest::bundled(mode),
    }
}

fn read_source(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse without rejecting anything structural, returning every issue found.
/// Only unreadable or malformed input is an error.
pub fn inspect_manifest(path: Option<&Path>) -> Result<(Manifest, ValidationReport), ManifestError> {
    let manifest: Manifest = match path {
        Some(path) => serde_json::from_str(&read_source(path)?)?,
        None => serde_json::from_str(BUNDLED_MANIFEST)?,
    };
    let report = ValidationReport::check(&manifest);
    Ok((manifest, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DANGLING: &str = r#"{
        "app": { "app_id": "t", "name": "T" },
        "screens": [
            { "screen_id": "home", "title": "Home", "navigation": { "go": "nowhere" } }
        ]
    }"#;

    #[test]
    fn test_bundled_manifest_is_valid() {
        let manifest = Manifest::bundled(ValidationMode::Strict).unwrap();
        assert_eq!(manifest.start_screen_id(), "home");
        assert!(manifest.screen_by_id("meal_capture").is_some());
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = Manifest::from_json("{ not json", ValidationMode::Lenient).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_missing_app_section_is_a_parse_error() {
        let err = Manifest::from_json(r#"{ "screens": [] }"#, ValidationMode::Lenient).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_strict_rejects_dangling_targets() {
        let err = Manifest::from_json(DANGLING, ValidationMode::Strict).unwrap_err();
        match err {
            ManifestError::DanglingTarget { screen, event, target } => {
                assert_eq!(screen, "home");
                assert_eq!(event, "go");
                assert_eq!(target, "nowhere");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lenient_accepts_dangling_targets() {
        let manifest = Manifest::from_json(DANGLING, ValidationMode::Lenient).unwrap();
        assert_eq!(manifest.screens.len(), 1);
    }

    #[test]
    fn test_duplicates_rejected_in_both_modes() {
        let json = r#"{
            "app": { "app_id": "t", "name": "T" },
            "screens": [
                { "screen_id": "home", "title": "A" },
                { "screen_id": "home", "title": "B" }
            ]
        }"#;
        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let err = Manifest::from_json(json, mode).unwrap_err();
            assert!(matches!(err, ManifestError::DuplicateScreen(ref id) if id == "home"));
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "app": {{ "app_id": "f", "name": "F", "start_screen_id": "b" }},
                 "screens": [ {{ "screen_id": "a", "title": "A" }}, {{ "screen_id": "b", "title": "B" }} ] }}"#
        )
        .unwrap();

        let manifest = load_manifest(Some(file.path()), ValidationMode::Strict).unwrap();
        assert_eq!(manifest.start_screen_id(), "b");
    }

    #[test]
    fn test_inspect_reports_instead_of_failing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", DANGLING).unwrap();

        let (manifest, report) = inspect_manifest(Some(file.path())).unwrap();
        assert_eq!(manifest.screens.len(), 1);
        assert_eq!(report.dangling.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_manifest(Some(Path::new("/definitely/not/here.json")), ValidationMode::Strict)
            .unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }

    #[test]
    fn test_inspect_missing_file_is_io_error() {
        let path = Path::new("/definitely/not/here.json");
        match inspect_manifest(Some(path)).unwrap_err() {
            ManifestError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
