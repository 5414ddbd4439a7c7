//! Symbolic event -> target screen lookup.
//!
//! Screens speak in their own event vocabulary (`on_back`, `on_save_success`,
//! ...). Which screen an event leads to is data, declared per screen in the
//! manifest's `navigation` table. Tables may be incomplete: an event with no
//! entry simply doesn't navigate.

use crate::manifest::Manifest;

/// Target screen for `event` when emitted from `current_screen_id`.
///
/// Returns `None` when the current screen isn't in the manifest or declares no
/// transition for the event.
pub fn resolve_target<'m>(manifest: &'m Manifest, current_screen_id: &str, event: &str) -> Option<&'m str> {
    manifest
        .screen_by_id(current_screen_id)
        .and_then(|screen| screen.target_for(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ValidationMode;

    fn manifest() -> Manifest {
        Manifest::from_json(
            r#"{
                "app": { "app_id": "t", "name": "T" },
                "screens": [
                    { "screen_id": "home", "title": "Home", "navigation": { "start_capture": "meal_capture" } },
                    { "screen_id": "meal_capture", "title": "Capture", "navigation": { "on_back": "home" } }
                ]
            }"#,
            ValidationMode::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_from_current_screen_only() {
        let m = manifest();
        assert_eq!(resolve_target(&m, "home", "start_capture"), Some("meal_capture"));
        assert_eq!(resolve_target(&m, "meal_capture", "start_capture"), None);
        assert_eq!(resolve_target(&m, "meal_capture", "on_back"), Some("home"));
    }

    #[test]
    fn test_unknown_event_or_screen_is_none() {
        let m = manifest();
        assert_eq!(resolve_target(&m, "home", "on_refresh"), None);
        assert_eq!(resolve_target(&m, "ghost", "on_back"), None);
    }
}
