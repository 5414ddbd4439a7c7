use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::{AdviceReply, ChatMessage, ChatRole};
use crate::screens::describe_error;
use crate::shell::{Command, ScreenContext, ScreenHandler, ScreenKind, ScreenMsg};
use crate::tui::widgets::{self, FocusRing, TextField};
use crate::tui::{Theme, chrome};

/// Days of history the advice agent is asked to consider
const CONTEXT_WINDOW_DAYS: u32 = 14;

const PROMPTS: usize = 0;
const INPUT: usize = 1;
const SEND: usize = 2;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AdviceProps {
    quick_prompts: Vec<String>,
    composer: Composer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Composer {
    placeholder: String,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            placeholder: "Ask a question...".to_string(),
        }
    }
}

enum Msg {
    Answered(Result<Value, String>),
}

/// Chat-style Q&A with the advice agent
pub struct NutritionAdviceScreen {
    props: AdviceProps,
    messages: Vec<ChatMessage>,
    input: TextField,
    prompt_index: usize,
    focus: FocusRing,
    loading: bool,
    error: Option<String>,
}

impl NutritionAdviceScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let mut focus = FocusRing::new(3);
        focus.focus(INPUT);
        Self {
            props: ctx.screen.typed_props(),
            messages: Vec::new(),
            input: TextField::default(),
            prompt_index: 0,
            focus,
            loading: false,
            error: None,
        }
    }

    fn can_send(&self) -> bool {
        !self.loading && !self.input.value().trim().is_empty()
    }

    fn send(&mut self, ctx: &ScreenContext) -> Command {
        let Some(agent) = ctx.screen.agent_id.clone() else {
            return Command::None;
        };
        if !self.can_send() {
            return Command::None;
        }

        let text = self.input.value().to_string();
        self.messages.push(ChatMessage::new(ChatRole::User, text.clone()));
        self.input.clear();
        self.loading = true;
        self.error = None;

        ctx.emit("on_submit", Some(json!({ "text": text })));

        let api = Arc::clone(&ctx.api);
        let payload = json!({ "text": text, "context_window_days": CONTEXT_WINDOW_DAYS });
        Command::perform(async move { api.call(&agent, Some(payload)).await }, |result| {
            Msg::Answered(result.map_err(describe_error))
        })
    }

    fn transcript(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in &self.messages {
            let (label, style) = match message.role {
                ChatRole::User => ("You", Style::default().fg(theme.brand)),
                ChatRole::Assistant => ("Assistant", Style::default().fg(theme.green)),
            };
            lines.push(Line::from(Span::styled(label, style.add_modifier(Modifier::BOLD))));
            lines.push(Line::from(Span::styled(message.text.clone(), Style::default().fg(theme.text))));
            lines.push(Line::from(""));
        }
        if self.loading {
            lines.push(Line::from(Span::styled("Thinking…", theme.muted_style())));
        }
        lines
    }
}

impl ScreenHandler for NutritionAdviceScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::NutritionAdvice
    }

    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Esc {
            return Some(ctx.back_command());
        }
        if self.focus.handle_key(key) {
            return Some(Command::None);
        }

        let activate = widgets::is_activate(&key);
        let prompt_count = self.props.quick_prompts.len();
        let command = match self.focus.index() {
            PROMPTS if prompt_count > 0 => {
                match key.code {
                    KeyCode::Right => self.prompt_index = (self.prompt_index + 1) % prompt_count,
                    KeyCode::Left => self.prompt_index = (self.prompt_index + prompt_count - 1) % prompt_count,
                    KeyCode::Enter => {
                        if let Some(prompt) = self.props.quick_prompts.get(self.prompt_index) {
                            self.input.set(prompt.clone());
                            self.focus.focus(INPUT);
                        }
                    }
                    _ => {}
                }
                Command::None
            }
            INPUT if activate => self.send(ctx),
            INPUT if !self.loading => {
                self.input.handle_key(key);
                Command::None
            }
            SEND if activate => self.send(ctx),
            _ => Command::None,
        };
        Some(command)
    }

    fn on_complete(&mut self, _ctx: &ScreenContext, msg: ScreenMsg) -> Command {
        let Ok(msg) = msg.downcast::<Msg>() else {
            return Command::None;
        };
        let Msg::Answered(result) = *msg;
        self.loading = false;

        match result {
            Ok(value) => {
                let reply: AdviceReply = serde_json::from_value(value).unwrap_or_default();
                self.messages.push(ChatMessage::new(ChatRole::Assistant, reply.advice_text));
            }
            Err(e) => self.error = Some(e),
        }
        Command::None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme) {
        let block = chrome::screen_block(&ctx.screen.title, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(if self.error.is_some() { 1 } else { 0 }),
                Constraint::Length(3),
            ])
            .split(inner);

        let mut chips = Vec::new();
        for (i, prompt) in self.props.quick_prompts.iter().enumerate() {
            let style = if self.focus.is(PROMPTS) && i == self.prompt_index {
                theme.focus_style()
            } else {
                Style::default().fg(theme.lavender).bg(theme.surface0)
            };
            chips.push(Span::styled(format!(" {} ", prompt), style));
            chips.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(chips)).wrap(Wrap { trim: true }), chunks[0]);

        // Keep the latest messages in view
        let transcript = self.transcript(theme);
        let visible = chunks[1].height as usize;
        let scroll = transcript.len().saturating_sub(visible) as u16;
        frame.render_widget(
            Paragraph::new(transcript).wrap(Wrap { trim: false }).scroll((scroll, 0)),
            chunks[1],
        );

        if let Some(error) = &self.error {
            frame.render_widget(Paragraph::new(chrome::error_line(error, theme)), chunks[2]);
        }

        let composer = if self.input.value().is_empty() && !self.focus.is(INPUT) {
            Line::from(Span::styled(self.props.composer.placeholder.clone(), theme.muted_style()))
        } else {
            self.input.to_line("Message", self.focus.is(INPUT), theme)
        };
        let send = widgets::button_line("Send", self.focus.is(SEND), self.can_send(), theme);
        let mut spans = composer.spans;
        spans.push(Span::raw("  "));
        spans.extend(send.spans);
        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP)),
            chunks[3],
        );
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Tab", "Focus"), ("←→", "Prompt"), ("Enter", "Send")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{context, key, type_text};
    use std::sync::Mutex;

    #[test]
    fn test_quick_prompt_fills_input() {
        let ctx = context("nutrition_advice", None);
        let mut screen = NutritionAdviceScreen::new(&ctx);
        screen.focus.focus(PROMPTS);
        screen.handle_key(&ctx, key(KeyCode::Right));
        screen.handle_key(&ctx, key(KeyCode::Enter));

        assert_eq!(screen.input.value(), "Is my sugar intake too high?");
        assert!(screen.focus.is(INPUT));
    }

    #[test]
    fn test_send_appends_user_message() {
        let ctx = context("nutrition_advice", None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctx.bus.on("on_submit", move |payload| sink.lock().unwrap().push(payload.clone()));

        let mut screen = NutritionAdviceScreen::new(&ctx);
        for k in type_text("more protein?") {
            screen.handle_key(&ctx, k);
        }
        let command = screen.handle_key(&ctx, key(KeyCode::Enter)).unwrap();

        assert!(matches!(command, Command::Perform(_)));
        assert_eq!(screen.messages.len(), 1);
        assert_eq!(screen.messages[0].role, ChatRole::User);
        assert_eq!(screen.input.value(), "");
        assert_eq!(seen.lock().unwrap()[0]["text"], "more protein?");
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let ctx = context("nutrition_advice", None);
        let mut screen = NutritionAdviceScreen::new(&ctx);
        for k in type_text("   ") {
            screen.handle_key(&ctx, k);
        }
        let command = screen.handle_key(&ctx, key(KeyCode::Enter)).unwrap();
        assert!(matches!(command, Command::None));
        assert!(screen.messages.is_empty());
    }

    #[test]
    fn test_answer_is_appended() {
        let ctx = context("nutrition_advice", None);
        let mut screen = NutritionAdviceScreen::new(&ctx);
        screen.loading = true;

        screen.on_complete(&ctx, Box::new(Msg::Answered(Ok(json!({ "advice_text": "Eat more beans." })))));
        assert_eq!(screen.messages.len(), 1);
        assert_eq!(screen.messages[0].role, ChatRole::Assistant);
        assert_eq!(screen.messages[0].text, "Eat more beans.");
        assert!(!screen.loading);
    }

    #[test]
    fn test_placeholder_comes_from_props() {
        let ctx = context("nutrition_advice", None);
        let screen = NutritionAdviceScreen::new(&ctx);
        assert_eq!(screen.props.composer.placeholder, "Ask about your nutrition...");
        assert_eq!(screen.props.quick_prompts.len(), 3);
    }
}
