use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};
use ratatui::Frame;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::collab::{ApiClient, Device};
use crate::manifest::{Manifest, ScreenDef};
use crate::shell::command::{Command, ScreenMsg};
use crate::shell::events::EventBus;
use crate::shell::navigation::{DEFAULT_DEPTH_WARNING, EntryId, NavRequest, NavStack};
use crate::shell::registry::{ScreenKind, ScreenRegistry};
use crate::shell::screen::{ScreenContext, ScreenHandler};
use crate::tui::{Theme, chrome};

const NOT_FOUND_HINTS: &[(&str, &str)] = &[("b", "Back"), ("q", "Quit")];

/// Collaborators injected into every screen
#[derive(Clone)]
pub struct Capabilities {
    pub api: Arc<dyn ApiClient>,
    pub device: Arc<dyn Device>,
    pub bus: EventBus,
}

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub depth_warning: usize,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            depth_warning: DEFAULT_DEPTH_WARNING,
        }
    }
}

/// What occupies the body of the screen right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    /// A handler for a screen the manifest defines
    Screen(ScreenKind),
    /// The stack top names a screen the manifest doesn't define
    NotFound,
}

struct Mounted {
    mount: u64,
    handler: Box<dyn ScreenHandler>,
}

struct Completion {
    mount: u64,
    msg: ScreenMsg,
}

/// Composes manifest, navigation stack, and registry into one render cycle.
///
/// Owns the stack; screens only see it through `Nav` and change it by
/// returning `Command::Navigate`. Async results are tagged with the mount
/// that requested them and dropped if that screen is gone by the time they
/// arrive.
pub struct Shell {
    manifest: Arc<Manifest>,
    screens: HashMap<String, Arc<ScreenDef>>,
    registry: ScreenRegistry,
    stack: NavStack,
    caps: Capabilities,
    mounted: Option<Mounted>,
    mount_counter: u64,
    mounted_entry: Option<EntryId>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    help_open: bool,
    quit: bool,
}

impl Shell {
    pub fn new(manifest: Arc<Manifest>, caps: Capabilities, options: ShellOptions) -> Self {
        let start = manifest.start_screen_id().to_string();
        info!("Starting shell '{}' at screen '{}'", manifest.app.app_id, start);

        let mut screens = HashMap::new();
        for screen in &manifest.screens {
            screens
                .entry(screen.screen_id.clone())
                .or_insert_with(|| Arc::new(screen.clone()));
        }

        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let mut shell = Self {
            stack: NavStack::new(start).with_depth_warning(options.depth_warning),
            manifest,
            screens,
            registry: ScreenRegistry::new(),
            caps,
            mounted: None,
            mount_counter: 0,
            mounted_entry: None,
            completions_tx,
            completions_rx,
            in_flight: 0,
            help_open: false,
            quit: false,
        };
        shell.sync_mounted();
        shell
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn stack(&self) -> &NavStack {
        &self.stack
    }

    pub fn bus(&self) -> &EventBus {
        &self.caps.bus
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    /// Definition of the screen on top of the stack, if the manifest has it
    pub fn current_screen(&self) -> Option<&ScreenDef> {
        self.manifest.screen_by_id(self.stack.current_screen_id())
    }

    pub fn active_view(&self) -> ActiveView {
        match &self.mounted {
            Some(mounted) => ActiveView::Screen(mounted.handler.kind()),
            None => ActiveView::NotFound,
        }
    }

    /// Apply a navigation request from outside any screen (CLI, tests)
    pub fn navigate(&mut self, request: NavRequest) -> bool {
        let changed = self.stack.apply(&self.manifest, request);
        if changed {
            self.sync_mounted();
        }
        changed
    }

    /// Route a key press: global bindings first, then the active screen,
    /// then global fallbacks for keys the screen didn't consume.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }
        if key.code == KeyCode::F(1) {
            self.help_open = !self.help_open;
            return;
        }
        if self.help_open {
            // Help swallows everything until closed
            if key.code == KeyCode::Esc {
                self.help_open = false;
            }
            return;
        }

        let consumed = match self.context() {
            Some(ctx) => self
                .mounted
                .as_mut()
                .and_then(|m| m.handler.handle_key(&ctx, key)),
            None => None,
        };

        let not_found = self.mounted.is_none();
        match (consumed, key.code) {
            (Some(command), _) => self.execute(command),
            (None, KeyCode::Esc) => {
                self.navigate(NavRequest::Back);
            }
            // No screen takes text input on the not-found view
            (None, KeyCode::Char('b')) if not_found => {
                self.navigate(NavRequest::Back);
            }
            (None, KeyCode::Char('q')) if not_found => self.quit = true,
            (None, _) => {}
        }
    }

    /// Deliver every finished async result without blocking
    pub fn poll_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.deliver(completion);
        }
    }

    /// Wait for the next async result and deliver it. Returns false when
    /// nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.deliver(completion);
                true
            }
            None => false,
        }
    }

    /// Wait until no async work is pending
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    pub fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        let (header, body, footer) = chrome::frame_layout(area);
        let brand = self.manifest.app.theme.brand_name.clone();

        let Some(ctx) = self.context() else {
            chrome::render_header(frame, header, &brand, "", theme);
            chrome::render_not_found(frame, body, self.stack.current_screen_id(), theme);
            chrome::render_footer(frame, footer, NOT_FOUND_HINTS, theme);
            if self.help_open {
                chrome::render_help(frame, area, NOT_FOUND_HINTS, theme);
            }
            return;
        };

        chrome::render_header(frame, header, &brand, &ctx.screen.title, theme);
        let hints = match self.mounted.as_mut() {
            Some(mounted) => {
                mounted.handler.render(frame, body, &ctx, theme);
                mounted.handler.key_hints()
            }
            None => Vec::new(),
        };
        chrome::render_footer(frame, footer, &hints, theme);
        if self.help_open {
            chrome::render_help(frame, area, &hints, theme);
        }
    }

    /// Capability set for the current screen, `None` when it isn't defined
    fn context(&self) -> Option<ScreenContext> {
        let screen = Arc::clone(self.screens.get(self.stack.current_screen_id())?);
        Some(ScreenContext {
            manifest: Arc::clone(&self.manifest),
            screen,
            nav: self.stack.nav(),
            api: Arc::clone(&self.caps.api),
            device: Arc::clone(&self.caps.device),
            bus: self.caps.bus.clone(),
        })
    }

    /// Make the mounted handler match the stack top, instantiating a fresh
    /// one whenever the top entry changed.
    fn sync_mounted(&mut self) {
        let top = self.stack.current().id;
        if self.mounted_entry == Some(top) {
            return;
        }
        self.mounted_entry = Some(top);

        let Some(ctx) = self.context() else {
            warn!("Screen not found: '{}'", self.stack.current_screen_id());
            self.mounted = None;
            return;
        };

        let kind = self.registry.screen_component(&ctx.screen.screen_id);
        if kind == ScreenKind::Fallback {
            warn!("No handler registered for screen '{}'", ctx.screen.screen_id);
        }

        self.mount_counter += 1;
        let mut handler = kind.instantiate(&ctx);
        debug!("Mounted {} for '{}' (mount {})", kind, ctx.screen.screen_id, self.mount_counter);
        let init = handler.init(&ctx);
        self.mounted = Some(Mounted {
            mount: self.mount_counter,
            handler,
        });
        self.execute(init);
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::None => {}
            Command::Batch(commands) => {
                for command in commands {
                    self.execute(command);
                }
            }
            Command::Navigate(request) => {
                self.navigate(request);
            }
            Command::Perform(future) => {
                let Some(mount) = self.mounted.as_ref().map(|m| m.mount) else {
                    return;
                };
                let tx = self.completions_tx.clone();
                self.in_flight += 1;
                tokio::spawn(async move {
                    let msg = future.await;
                    // Receiver only disappears when the shell is dropped
                    let _ = tx.send(Completion { mount, msg });
                });
            }
            Command::Quit => self.quit = true,
        }
    }

    fn deliver(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let current_mount = self.mounted.as_ref().map(|m| m.mount);
        if current_mount != Some(completion.mount) {
            debug!("Dropping stale result for mount {}", completion.mount);
            return;
        }
        let Some(ctx) = self.context() else {
            return;
        };
        let command = match self.mounted.as_mut() {
            Some(mounted) => mounted.handler.on_complete(&ctx, completion.msg),
            None => Command::None,
        };
        self.execute(command);
    }
}
