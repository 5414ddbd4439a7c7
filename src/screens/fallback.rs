use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::manifest::ROOT_SCREEN_ID;
use crate::shell::{Command, ScreenContext, ScreenHandler, ScreenKind};
use crate::tui::{Theme, chrome, widgets};

/// Shown for screens the manifest defines but no handler implements.
///
/// Its only action sends the user to the root screen, even if the manifest
/// has no such screen.
pub struct FallbackScreen;

impl FallbackScreen {
    pub fn new(_ctx: &ScreenContext) -> Self {
        Self
    }
}

impl ScreenHandler for FallbackScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Fallback
    }

    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => Some(Command::navigate(ctx.nav.go(ROOT_SCREEN_ID, None))),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme) {
        let lines = vec![
            Line::from(Span::styled("Missing Screen Handler", theme.title_style())),
            Line::from(""),
            Line::from(vec![
                Span::raw("No screen handler registered for screen_id: "),
                Span::styled(ctx.screen.screen_id.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(""),
            widgets::button_line("Go Home", true, true, theme),
        ];
        let body = Paragraph::new(lines)
            .style(Style::default().fg(theme.text))
            .block(chrome::screen_block(&ctx.screen.title, theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(body, chrome::centered_rect(area, 70, 9));
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Enter", "Go home")]
    }
}
