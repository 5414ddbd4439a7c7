use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use serde_json::Value;
use std::sync::Arc;

use crate::collab::{ApiClient, Device};
use crate::manifest::{Manifest, ScreenDef};
use crate::shell::command::{Command, ScreenMsg};
use crate::shell::events::EventBus;
use crate::shell::navigation::Nav;
use crate::shell::registry::ScreenKind;
use crate::tui::Theme;

/// Everything a screen is handed when it runs: configuration, where it sits
/// in navigation, and the collaborators it may call.
#[derive(Clone)]
pub struct ScreenContext {
    pub manifest: Arc<Manifest>,
    pub screen: Arc<ScreenDef>,
    pub nav: Nav,
    pub api: Arc<dyn ApiClient>,
    pub device: Arc<dyn Device>,
    pub bus: EventBus,
}

impl ScreenContext {
    pub fn emit(&self, event: &str, payload: Option<Value>) {
        self.bus.emit(event, payload);
    }

    /// Emit `on_back` and follow the manifest's transition for it
    pub fn back_command(&self) -> Command {
        self.emit("on_back", None);
        Command::navigate(self.nav.resolve("on_back", None))
    }
}

/// Behavior behind one screen kind.
///
/// A fresh handler is instantiated every time its screen becomes the top of
/// the navigation stack, so state never leaks between visits.
pub trait ScreenHandler: Send {
    fn kind(&self) -> ScreenKind;

    /// Called once right after the handler is mounted
    fn init(&mut self, _ctx: &ScreenContext) -> Command {
        Command::None
    }

    /// Handle a key press. `None` means the key wasn't consumed and the shell
    /// may apply its global binding.
    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command>;

    /// Receive the result of a `Command::Perform` this handler issued
    fn on_complete(&mut self, _ctx: &ScreenContext, _msg: ScreenMsg) -> Command {
        Command::None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme);

    /// Key hints for the footer and help overlay
    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}
