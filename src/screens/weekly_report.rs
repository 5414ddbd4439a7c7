use chrono::{Duration, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::WeeklyReport;
use crate::screens::describe_error;
use crate::shell::{Command, ScreenContext, ScreenHandler, ScreenKind, ScreenMsg};
use crate::tui::widgets::{self, FocusRing, TextField};
use crate::tui::{Theme, chrome};

const WEEK_START: usize = 0;
const WEEK_END: usize = 1;
const GENERATE: usize = 2;

enum Msg {
    Generated(Result<Value, String>),
}

pub struct WeeklyReportScreen {
    week_start: TextField,
    week_end: TextField,
    focus: FocusRing,
    report: Option<WeeklyReport>,
    scroll: u16,
    loading: bool,
    error: Option<String>,
}

impl WeeklyReportScreen {
    pub fn new(_ctx: &ScreenContext) -> Self {
        let today = Utc::now().date_naive();
        Self {
            week_start: TextField::new((today - Duration::days(7)).format("%Y-%m-%d").to_string()),
            week_end: TextField::new(today.format("%Y-%m-%d").to_string()),
            focus: FocusRing::new(3),
            report: None,
            scroll: 0,
            loading: false,
            error: None,
        }
    }

    fn generate(&mut self, ctx: &ScreenContext) -> Command {
        let Some(agent) = ctx.screen.agent_id.clone() else {
            return Command::None;
        };
        if self.loading {
            return Command::None;
        }
        self.loading = true;
        self.error = None;

        let range = json!({
            "week_start": self.week_start.value().trim(),
            "week_end": self.week_end.value().trim(),
        });
        ctx.emit("on_generate", Some(range.clone()));

        let api = Arc::clone(&ctx.api);
        Command::perform(async move { api.call(&agent, Some(range)).await }, |result| {
            Msg::Generated(result.map_err(describe_error))
        })
    }

    fn report_lines(report: &WeeklyReport, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled("Totals & Averages", theme.title_style())),
            Line::from(format!("  Total Calories:     {} kcal", report.total_calories_kcal)),
            Line::from(format!("  Avg Daily Calories: {} kcal", report.avg_daily_calories_kcal)),
            Line::from(format!("  Total Protein:      {}g", report.total_protein_g)),
            Line::from(format!("  Total Carbs:        {}g", report.total_carbs_g)),
            Line::from(format!("  Total Fat:          {}g", report.total_fat_g)),
            Line::from(""),
            Line::from(Span::styled("Highlights", theme.title_style())),
            Line::from(format!("  Best Day: {}", report.best_day.as_deref().unwrap_or("-"))),
            Line::from("  Needs Attention:"),
        ];
        for item in &report.needs_attention {
            lines.push(Line::from(Span::styled(format!("    • {}", item), theme.warning_style())));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Daily Breakdown", theme.title_style())));
        for day in &report.days {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", day.date), theme.muted_style()),
                Span::raw(format!(
                    "{} kcal | P: {}g C: {}g F: {}g",
                    day.calories_kcal, day.protein_g, day.carbs_g, day.fat_g
                )),
            ]));
        }
        lines
    }
}

impl ScreenHandler for WeeklyReportScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::WeeklyReport
    }

    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => return Some(ctx.back_command()),
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(5);
                return Some(Command::None);
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(5);
                return Some(Command::None);
            }
            _ => {}
        }
        if self.focus.handle_key(key) {
            return Some(Command::None);
        }

        let activate = widgets::is_activate(&key);
        let command = match self.focus.index() {
            GENERATE if activate => self.generate(ctx),
            WEEK_START | WEEK_END if activate => {
                self.focus.next();
                Command::None
            }
            WEEK_START => {
                self.week_start.handle_key(key);
                Command::None
            }
            WEEK_END => {
                self.week_end.handle_key(key);
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
        let Msg::Generated(result) = *msg;
        self.loading = false;

        match result.and_then(|value| serde_json::from_value::<WeeklyReport>(value).map_err(describe_error)) {
            Ok(report) => {
                self.report = Some(report);
                self.scroll = 0;
            }
            Err(e) => self.error = Some(e),
        }
        Command::None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme) {
        let mut lines = vec![
            self.week_start.to_line("Start Date", self.focus.is(WEEK_START), theme),
            self.week_end.to_line("End Date", self.focus.is(WEEK_END), theme),
            Line::from(""),
        ];

        let label = if self.loading { "Generating…" } else { "Generate Report" };
        lines.push(widgets::button_line(label, self.focus.is(GENERATE), !self.loading, theme));
        lines.push(Line::from(""));

        if let Some(error) = &self.error {
            lines.push(chrome::error_line(error, theme));
            lines.push(Line::from(""));
        }
        if let Some(report) = &self.report {
            lines.extend(Self::report_lines(report, theme));
        }

        let body = Paragraph::new(lines)
            .block(chrome::screen_block(&ctx.screen.title, theme))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(body, area);
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Tab", "Next field"), ("Enter", "Generate"), ("PgUp/PgDn", "Scroll")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{context, key};
    use std::sync::Mutex;

    #[test]
    fn test_default_range_is_last_week() {
        let ctx = context("weekly_report", None);
        let screen = WeeklyReportScreen::new(&ctx);
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(screen.week_end.value(), today);
        assert_eq!(screen.week_start.value().len(), 10);
    }

    #[test]
    fn test_generate_emits_range() {
        let ctx = context("weekly_report", None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctx.bus.on("on_generate", move |payload| sink.lock().unwrap().push(payload.clone()));

        let mut screen = WeeklyReportScreen::new(&ctx);
        screen.focus.focus(GENERATE);
        let command = screen.handle_key(&ctx, key(KeyCode::Enter)).unwrap();

        assert!(matches!(command, Command::Perform(_)));
        assert!(screen.loading);
        assert_eq!(seen.lock().unwrap()[0]["week_end"], screen.week_end.value());
    }

    #[test]
    fn test_report_is_parsed() {
        let ctx = context("weekly_report", None);
        let mut screen = WeeklyReportScreen::new(&ctx);
        screen.loading = true;

        let value = json!({
            "ok": true,
            "total_calories_kcal": 9000.0,
            "best_day": "2026-10-02",
            "needs_attention": ["Protein below 50 g/day"],
            "days": [{ "date": "2026-10-02", "calories_kcal": 2100.0 }],
        });
        screen.on_complete(&ctx, Box::new(Msg::Generated(Ok(value))));

        let report = screen.report.as_ref().unwrap();
        assert_eq!(report.total_calories_kcal, 9000.0);
        assert_eq!(report.days.len(), 1);
        assert!(!screen.loading);
    }

    #[test]
    fn test_errors_keep_previous_report() {
        let ctx = context("weekly_report", None);
        let mut screen = WeeklyReportScreen::new(&ctx);
        screen.report = Some(WeeklyReport::default());

        screen.on_complete(&ctx, Box::new(Msg::Generated(Err("week_start must be YYYY-MM-DD".into()))));
        assert!(screen.report.is_some());
        assert_eq!(screen.error.as_deref(), Some("week_start must be YYYY-MM-DD"));
    }
}
