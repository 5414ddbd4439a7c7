use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::{MealHistoryReply, MealRecord};
use crate::screens::describe_error;
use crate::shell::navigation::NavParams;
use crate::shell::{Command, ScreenContext, ScreenHandler, ScreenKind, ScreenMsg};
use crate::tui::widgets::{self, Choice, FocusRing};
use crate::tui::{Theme, chrome};

const DATE_RANGES: [&str; 3] = ["today", "7d", "30d"];

const RANGE: usize = 0;
const REFRESH: usize = 1;
const LIST: usize = 2;

enum Msg {
    Loaded { seq: u64, result: Result<Value, String> },
}

/// Logged meals filtered by date range, newest first
pub struct MealHistoryScreen {
    range: Choice,
    focus: FocusRing,
    meals: Vec<MealRecord>,
    list_state: ListState,
    expanded: bool,
    highlight: Option<String>,
    fetch_seq: u64,
    loading: bool,
    error: Option<String>,
}

impl MealHistoryScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let highlight = match &ctx.nav.params {
            Some(NavParams::HighlightMeal { meal_id }) => meal_id.clone(),
            _ => None,
        };

        Self {
            range: Choice::new(DATE_RANGES.iter().map(|s| s.to_string()).collect(), "7d"),
            focus: FocusRing::new(3),
            meals: Vec::new(),
            list_state: ListState::default(),
            expanded: false,
            highlight,
            fetch_seq: 0,
            loading: false,
            error: None,
        }
    }

    /// Start a fetch for the selected range; any earlier fetch still in
    /// flight is ignored when it lands.
    fn fetch(&mut self, ctx: &ScreenContext) -> Command {
        let Some(agent) = ctx.screen.agent_id.clone() else {
            return Command::None;
        };
        self.fetch_seq += 1;
        self.loading = true;
        self.error = None;

        let seq = self.fetch_seq;
        let api = Arc::clone(&ctx.api);
        let payload = json!({ "date_range": self.range.selected() });
        Command::perform(async move { api.call(&agent, Some(payload)).await }, move |result| Msg::Loaded {
            seq,
            result: result.map_err(describe_error),
        })
    }

    fn selected_meal(&self) -> Option<&MealRecord> {
        self.list_state.selected().and_then(|i| self.meals.get(i))
    }

    fn move_selection(&mut self, forward: bool) {
        if self.meals.is_empty() {
            return;
        }
        let count = self.meals.len();
        let next = match self.list_state.selected() {
            Some(i) if forward => (i + 1) % count,
            Some(i) => (i + count - 1) % count,
            None => 0,
        };
        self.list_state.select(Some(next));
        self.expanded = false;
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self
            .meals
            .iter()
            .map(|meal| {
                let highlighted = self.highlight.as_deref() == Some(meal.meal_id.as_str());
                let name_style = if highlighted {
                    theme.success_style()
                } else {
                    Style::default().fg(theme.text)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<10}", meal.meal_type), theme.muted_style()),
                    Span::styled(format!("{:<28}", meal.food_name), name_style),
                    Span::styled(format!("{:>6.0} kcal", meal.calories_kcal), theme.muted_style()),
                ]))
            })
            .collect();

        let border = if self.focus.is(LIST) { theme.brand } else { theme.overlay0 };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(format!(" Meals ({}) ", self.meals.len())),
            )
            .highlight_style(Style::default().bg(theme.surface0).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}

impl ScreenHandler for MealHistoryScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::MealHistory
    }

    fn init(&mut self, ctx: &ScreenContext) -> Command {
        self.fetch(ctx)
    }

    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Esc {
            return Some(ctx.back_command());
        }
        if self.focus.is(LIST) {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection(false);
                    return Some(Command::None);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection(true);
                    return Some(Command::None);
                }
                _ => {}
            }
        }
        if self.focus.handle_key(key) {
            return Some(Command::None);
        }

        let activate = widgets::is_activate(&key);
        let command = match self.focus.index() {
            RANGE if self.range.handle_key(key) => self.fetch(ctx),
            REFRESH if activate && !self.loading => {
                ctx.emit("on_refresh", None);
                self.fetch(ctx)
            }
            LIST if activate => {
                if let Some(meal) = self.selected_meal() {
                    ctx.emit("on_select:meal", Some(json!({ "meal_id": meal.meal_id })));
                    self.expanded = !self.expanded;
                }
                Command::None
            }
            _ => Command::None,
        };
        Some(command)
    }

    fn on_complete(&mut self, _ctx: &ScreenContext, msg: ScreenMsg) -> Command {
        let Ok(msg) = msg.downcast::<Msg>() else {
            return Command::None;
        };
        let Msg::Loaded { seq, result } = *msg;
        if seq != self.fetch_seq {
            return Command::None;
        }
        self.loading = false;

        match result {
            Ok(value) => {
                let reply: MealHistoryReply = serde_json::from_value(value).unwrap_or_default();
                self.meals = reply.meals;
                self.expanded = false;
                let selected = self
                    .highlight
                    .as_ref()
                    .and_then(|id| self.meals.iter().position(|m| &m.meal_id == id))
                    .or(if self.meals.is_empty() { None } else { Some(0) });
                self.list_state.select(selected);
            }
            Err(e) => self.error = Some(e),
        }
        Command::None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme) {
        let block = chrome::screen_block(&ctx.screen.title, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let detail_height = if self.expanded && self.selected_meal().is_some() { 8 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(detail_height),
            ])
            .split(inner);

        let mut controls = vec![
            self.range.to_line("Date Range", self.focus.is(RANGE), theme),
            widgets::button_line("Refresh", self.focus.is(REFRESH), !self.loading, theme),
        ];
        if let Some(error) = &self.error {
            controls.push(chrome::error_line(error, theme));
        } else if self.loading {
            controls.push(Line::from(Span::styled("Loading…", theme.muted_style())));
        } else if self.meals.is_empty() {
            controls.push(Line::from(Span::styled("No meals logged in this range", theme.muted_style())));
        }
        frame.render_widget(Paragraph::new(controls), chunks[0]);

        self.render_list(frame, chunks[1], theme);

        if detail_height > 0 {
            if let Some(meal) = self.selected_meal() {
                let detail = vec![
                    Line::from(Span::styled(meal.food_name.clone(), theme.title_style())),
                    Line::from(Span::styled(meal.serving_notes.clone(), theme.muted_style())),
                    Line::from(format!(
                        "{} kcal · P {}g · C {}g · F {}g",
                        meal.calories_kcal, meal.protein_g, meal.carbs_g, meal.fat_g
                    )),
                    Line::from(format!(
                        "Fiber {}g · Sugar {}g · Sodium {}mg",
                        meal.fiber_g, meal.sugar_g, meal.sodium_mg
                    )),
                    Line::from(Span::styled(meal.consumed_at.clone(), theme.muted_style())),
                ];
                let panel = Paragraph::new(detail)
                    .block(Block::default().borders(Borders::TOP).title(" Details "))
                    .wrap(Wrap { trim: true });
                frame.render_widget(panel, chunks[2]);
            }
        }
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Tab", "Focus"), ("←→", "Range"), ("↑↓", "Select"), ("Enter", "Details")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{context, key};

    fn loaded(seq: u64, ids: &[&str]) -> ScreenMsg {
        let meals: Vec<Value> = ids.iter().map(|id| json!({ "meal_id": id, "meal_type": "lunch" })).collect();
        Box::new(Msg::Loaded {
            seq,
            result: Ok(json!({ "ok": true, "meals": meals })),
        })
    }

    #[test]
    fn test_init_fetches() {
        let ctx = context("meal_history", None);
        let mut screen = MealHistoryScreen::new(&ctx);
        let command = screen.init(&ctx);
        assert!(matches!(command, Command::Perform(_)));
        assert!(screen.loading);
    }

    #[test]
    fn test_out_of_date_responses_are_ignored() {
        let ctx = context("meal_history", None);
        let mut screen = MealHistoryScreen::new(&ctx);
        let _ = screen.init(&ctx);
        // Changing the range supersedes the first request
        let _ = screen.handle_key(&ctx, key(KeyCode::Right));
        assert_eq!(screen.fetch_seq, 2);

        screen.on_complete(&ctx, loaded(1, &["stale"]));
        assert!(screen.meals.is_empty());
        assert!(screen.loading);

        screen.on_complete(&ctx, loaded(2, &["fresh"]));
        assert_eq!(screen.meals[0].meal_id, "fresh");
        assert!(!screen.loading);
    }

    #[test]
    fn test_saved_meal_is_preselected() {
        let params = NavParams::HighlightMeal {
            meal_id: Some("m2".into()),
        };
        let ctx = context("meal_history", Some(params));
        let mut screen = MealHistoryScreen::new(&ctx);
        let _ = screen.init(&ctx);

        screen.on_complete(&ctx, loaded(1, &["m1", "m2", "m3"]));
        assert_eq!(screen.list_state.selected(), Some(1));
    }

    #[test]
    fn test_select_emits_and_toggles_detail() {
        let ctx = context("meal_history", None);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctx.bus.on("on_select:meal", move |payload| sink.lock().unwrap().push(payload.clone()));

        let mut screen = MealHistoryScreen::new(&ctx);
        let _ = screen.init(&ctx);
        screen.on_complete(&ctx, loaded(1, &["m1", "m2"]));

        screen.focus.focus(LIST);
        screen.handle_key(&ctx, key(KeyCode::Down));
        screen.handle_key(&ctx, key(KeyCode::Enter));

        assert!(screen.expanded);
        assert_eq!(seen.lock().unwrap()[0]["meal_id"], "m2");
    }
}
