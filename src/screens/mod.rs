//! Per-screen behavior. Each screen parses its own typed props from the
//! manifest and talks to collaborators through the `ScreenContext`.

pub mod fallback;
pub mod home;
pub mod meal_capture;
pub mod meal_confirm;
pub mod meal_history;
pub mod nutrition_advice;
pub mod weekly_report;

pub use fallback::FallbackScreen;
pub use home::HomeScreen;
pub use meal_capture::MealCaptureScreen;
pub use meal_confirm::MealConfirmScreen;
pub use meal_history::MealHistoryScreen;
pub use nutrition_advice::NutritionAdviceScreen;
pub use weekly_report::WeeklyReportScreen;

/// Flatten an error chain into the single line shown inline on a screen
pub(crate) fn describe_error(err: impl std::fmt::Display) -> String {
    format!("{:#}", err)
}

/// Screen test fixtures: a context over the bundled manifest with instant collaborators
#[cfg(test)]
pub(crate) mod testing {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Arc;

    use crate::collab::{FileDevice, MockApi};
    use crate::manifest::{Manifest, ValidationMode};
    use crate::shell::navigation::{NavParams, NavStack};
    use crate::shell::{Command, EventBus, NavRequest, ScreenContext};

    pub fn context(screen_id: &str, params: Option<NavParams>) -> ScreenContext {
        let manifest = Arc::new(Manifest::bundled(ValidationMode::Strict).unwrap());
        let mut stack = NavStack::new(manifest.start_screen_id());
        if screen_id != manifest.start_screen_id() || params.is_some() {
            stack.go(screen_id, params);
        }
        ScreenContext {
            screen: Arc::new(manifest.screen_by_id(screen_id).cloned().unwrap()),
            nav: stack.nav(),
            manifest,
            api: Arc::new(MockApi::instant()),
            device: Arc::new(FileDevice::new(None)),
            bus: EventBus::new(),
        }
    }

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn type_text(text: &str) -> Vec<KeyEvent> {
        text.chars().map(|c| key(KeyCode::Char(c))).collect()
    }

    /// Extract the navigation request from a command, if it carries exactly one
    pub fn nav_request(command: &Command) -> Option<&NavRequest> {
        match command {
            Command::Navigate(request) => Some(request),
            Command::Batch(commands) => commands.iter().find_map(nav_request),
            _ => None,
        }
    }
}
