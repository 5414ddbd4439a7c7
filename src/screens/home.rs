use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use serde::Deserialize;
use serde_json::json;

use crate::shell::{Command, ScreenContext, ScreenHandler, ScreenKind};
use crate::tui::{Theme, chrome};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct HomeProps {
    subheader: String,
    cards: Vec<Card>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Card {
    id: String,
    label: String,
    event: String,
}

/// Entry screen: a list of cards, each emitting a symbolic event
pub struct HomeScreen {
    props: HomeProps,
    selected: usize,
}

impl HomeScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        Self {
            props: ctx.screen.typed_props(),
            selected: 0,
        }
    }

    fn activate(&self, ctx: &ScreenContext) -> Command {
        let Some(card) = self.props.cards.get(self.selected) else {
            return Command::None;
        };
        ctx.emit(&card.event, Some(json!({ "card_id": card.id })));
        Command::navigate(ctx.nav.resolve(card.event.clone(), None))
    }
}

impl ScreenHandler for HomeScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Home
    }

    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command> {
        let count = self.props.cards.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.selected = (self.selected + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab if count > 0 => {
                self.selected = (self.selected + 1) % count;
            }
            KeyCode::Enter => return Some(self.activate(ctx)),
            _ => return None,
        }
        Some(Command::None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme) {
        let mut lines = vec![
            Line::from(Span::styled(self.props.subheader.clone(), theme.muted_style())),
            Line::from(""),
        ];

        for (i, card) in self.props.cards.iter().enumerate() {
            let (marker, style) = if i == self.selected {
                ("▶", theme.focus_style())
            } else {
                (" ", Style::default().fg(theme.brand).add_modifier(Modifier::BOLD))
            };
            lines.push(Line::from(Span::styled(format!(" {} {} ", marker, card.label), style)));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Log meals to see trends",
            theme.muted_style().add_modifier(Modifier::ITALIC),
        )));

        let body = Paragraph::new(lines)
            .block(chrome::screen_block(&ctx.screen.title, theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(body, area);
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("↑↓", "Select"), ("Enter", "Open")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{context, key, nav_request};
    use crate::shell::NavRequest;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_card_activation_emits_and_resolves() {
        let ctx = context("home", None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctx.bus.on("open_history", move |payload| sink.lock().unwrap().push(payload.clone()));

        let mut screen = HomeScreen::new(&ctx);
        screen.handle_key(&ctx, key(KeyCode::Down));
        let command = screen.handle_key(&ctx, key(KeyCode::Enter)).unwrap();

        assert_eq!(
            nav_request(&command),
            Some(&NavRequest::Resolve { event: "open_history".into(), params: None })
        );
        assert_eq!(seen.lock().unwrap()[0]["card_id"], "history");
    }

    #[test]
    fn test_escape_is_left_to_the_shell() {
        let ctx = context("home", None);
        let mut screen = HomeScreen::new(&ctx);
        assert!(screen.handle_key(&ctx, key(KeyCode::Esc)).is_none());
    }

    #[test]
    fn test_selection_wraps() {
        let ctx = context("home", None);
        let mut screen = HomeScreen::new(&ctx);
        screen.handle_key(&ctx, key(KeyCode::Up));
        assert_eq!(screen.selected, screen.props.cards.len() - 1);
    }
}
