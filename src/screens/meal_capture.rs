use chrono::{SecondsFormat, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::{MEAL_TYPES, MealDraft};
use crate::screens::describe_error;
use crate::shell::navigation::NavParams;
use crate::shell::{Command, ScreenContext, ScreenHandler, ScreenKind, ScreenMsg};
use crate::tui::widgets::{self, Choice, FocusRing, TextField};
use crate::tui::{Theme, chrome};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CaptureProps {
    instructions: Vec<String>,
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FieldSpec {
    name: String,
    options: Vec<String>,
}

const MEAL_TYPE: usize = 0;
const CONSUMED_AT: usize = 1;
const PICK_PHOTO: usize = 2;
const ANALYZE: usize = 3;

enum Msg {
    Picked(Result<Option<String>, String>),
    Analyzed(Result<Value, String>),
}

/// Pick a meal photo, describe when it was eaten, and send it for analysis
pub struct MealCaptureScreen {
    instructions: Vec<String>,
    meal_type: Choice,
    consumed_at: TextField,
    image_base64: Option<String>,
    focus: FocusRing,
    loading_pick: bool,
    loading_analyze: bool,
    error: Option<String>,
}

impl MealCaptureScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let props: CaptureProps = ctx.screen.typed_props();
        let options = props
            .fields
            .iter()
            .find(|f| f.name == "meal_type" && !f.options.is_empty())
            .map(|f| f.options.clone())
            .unwrap_or_else(|| MEAL_TYPES.iter().map(|s| s.to_string()).collect());

        Self {
            instructions: props.instructions,
            meal_type: Choice::new(options, "breakfast"),
            consumed_at: TextField::new(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            image_base64: None,
            focus: FocusRing::new(4),
            loading_pick: false,
            loading_analyze: false,
            error: None,
        }
    }

    fn busy(&self) -> bool {
        self.loading_pick || self.loading_analyze
    }

    fn pick_photo(&mut self, ctx: &ScreenContext) -> Command {
        if self.busy() {
            return Command::None;
        }
        self.loading_pick = true;
        self.error = None;

        let device = Arc::clone(&ctx.device);
        Command::perform(async move { device.pick_image_base64().await }, |result| {
            Msg::Picked(result.map_err(describe_error))
        })
    }

    fn analyze(&mut self, ctx: &ScreenContext) -> Command {
        let (Some(image), Some(agent)) = (self.image_base64.clone(), ctx.screen.agent_id.clone()) else {
            return Command::None;
        };
        if self.busy() {
            return Command::None;
        }
        self.loading_analyze = true;
        self.error = None;

        let meal_type = self.meal_type.selected().to_string();
        let consumed_at = self.consumed_at.value().to_string();
        ctx.emit("on_analyze", Some(json!({ "meal_type": meal_type, "consumed_at": consumed_at })));

        let api = Arc::clone(&ctx.api);
        let payload = json!({
            "image_base64": image,
            "meal_type": meal_type,
            "consumed_at": consumed_at,
        });
        Command::perform(async move { api.call(&agent, Some(payload)).await }, |result| {
            Msg::Analyzed(result.map_err(describe_error))
        })
    }
}

impl ScreenHandler for MealCaptureScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::MealCapture
    }

    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Esc {
            return Some(ctx.back_command());
        }
        if self.focus.handle_key(key) {
            return Some(Command::None);
        }

        let activate = widgets::is_activate(&key);
        let command = match self.focus.index() {
            MEAL_TYPE => {
                self.meal_type.handle_key(key);
                Command::None
            }
            CONSUMED_AT if activate => {
                self.focus.next();
                Command::None
            }
            CONSUMED_AT => {
                self.consumed_at.handle_key(key);
                Command::None
            }
            PICK_PHOTO if activate => self.pick_photo(ctx),
            ANALYZE if activate => self.analyze(ctx),
            _ => Command::None,
        };
        Some(command)
    }

    fn on_complete(&mut self, ctx: &ScreenContext, msg: ScreenMsg) -> Command {
        let Ok(msg) = msg.downcast::<Msg>() else {
            return Command::None;
        };

        match *msg {
            Msg::Picked(result) => {
                self.loading_pick = false;
                match result {
                    Ok(image) => {
                        self.image_base64 = image;
                        ctx.emit("on_pick_photo", Some(json!({ "has_image": self.image_base64.is_some() })));
                        if self.image_base64.is_some() {
                            self.focus.focus(ANALYZE);
                        }
                    }
                    Err(e) => self.error = Some(e),
                }
                Command::None
            }
            Msg::Analyzed(result) => {
                self.loading_analyze = false;
                let result = match result {
                    Ok(result) => result,
                    Err(e) => {
                        self.error = Some(e);
                        return Command::None;
                    }
                };

                let meal_type = self.meal_type.selected().to_string();
                let consumed_at = self.consumed_at.value().to_string();
                ctx.emit(
                    "on_analyze_success",
                    Some(json!({ "meal_type": meal_type, "consumed_at": consumed_at })),
                );

                let draft_value = result.get("draft").cloned().unwrap_or(result);
                let draft: MealDraft = serde_json::from_value(draft_value).unwrap_or_default();
                let params = NavParams::MealDraft {
                    draft,
                    image_base64: self.image_base64.clone(),
                    meal_type,
                    consumed_at,
                };
                Command::navigate(ctx.nav.resolve("on_analyze_success", Some(params)))
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme) {
        let mut lines: Vec<Line> = self
            .instructions
            .iter()
            .map(|text| Line::from(Span::styled(text.clone(), theme.muted_style())))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &self.error {
            lines.push(chrome::error_line(error, theme));
            lines.push(Line::from(""));
        }

        lines.push(self.meal_type.to_line("Meal Type", self.focus.is(MEAL_TYPE), theme));
        lines.push(self.consumed_at.to_line("Consumed At", self.focus.is(CONSUMED_AT), theme));
        lines.push(Line::from(""));

        let pick_label = if self.loading_pick { "Picking…" } else { "Pick Meal Photo" };
        lines.push(widgets::button_line(pick_label, self.focus.is(PICK_PHOTO), !self.busy(), theme));

        if let Some(image) = &self.image_base64 {
            lines.push(Line::from(Span::styled(
                format!("Image selected ({} chars)", image.len()),
                theme.success_style(),
            )));
        }

        let analyze_label = if self.loading_analyze { "Analyzing…" } else { "Analyze" };
        let can_analyze = self.image_base64.is_some() && !self.busy();
        lines.push(widgets::button_line(analyze_label, self.focus.is(ANALYZE), can_analyze, theme));

        let body = Paragraph::new(lines)
            .block(chrome::screen_block(&ctx.screen.title, theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(body, area);
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Tab", "Next field"), ("←→", "Meal type"), ("Enter", "Activate")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{context, key, nav_request};
    use crate::shell::NavRequest;

    #[test]
    fn test_meal_type_options_come_from_props() {
        let ctx = context("meal_capture", None);
        let screen = MealCaptureScreen::new(&ctx);
        assert_eq!(screen.meal_type.options().len(), 4);
        assert_eq!(screen.meal_type.selected(), "breakfast");
    }

    #[test]
    fn test_analyze_needs_an_image() {
        let ctx = context("meal_capture", None);
        let mut screen = MealCaptureScreen::new(&ctx);
        screen.focus.focus(ANALYZE);
        let command = screen.handle_key(&ctx, key(KeyCode::Enter)).unwrap();
        assert!(matches!(command, Command::None));
        assert!(!screen.loading_analyze);
    }

    #[test]
    fn test_analysis_result_navigates_with_draft() {
        let ctx = context("meal_capture", None);
        let mut screen = MealCaptureScreen::new(&ctx);
        screen.image_base64 = Some("aGVsbG8=".into());

        let command = screen.on_complete(
            &ctx,
            Box::new(Msg::Analyzed(Ok(json!({ "draft": { "food_name": "Ramen", "calories_kcal": 640 } })))),
        );

        match nav_request(&command) {
            Some(NavRequest::Resolve { event, params: Some(NavParams::MealDraft { draft, image_base64, .. }) }) => {
                assert_eq!(event, "on_analyze_success");
                assert_eq!(draft.food_name, "Ramen");
                assert_eq!(image_base64.as_deref(), Some("aGVsbG8="));
            }
            other => panic!("unexpected navigation: {other:?}"),
        }
    }

    #[test]
    fn test_failures_stay_inline() {
        let ctx = context("meal_capture", None);
        let mut screen = MealCaptureScreen::new(&ctx);
        screen.loading_pick = true;

        let command = screen.on_complete(&ctx, Box::new(Msg::Picked(Err("Media library permission not granted.".into()))));
        assert!(matches!(command, Command::None));
        assert!(!screen.loading_pick);
        assert_eq!(screen.error.as_deref(), Some("Media library permission not granted."));
    }

    #[test]
    fn test_escape_resolves_on_back() {
        let ctx = context("meal_capture", None);
        let mut screen = MealCaptureScreen::new(&ctx);
        let command = screen.handle_key(&ctx, key(KeyCode::Esc)).unwrap();
        assert_eq!(nav_request(&command), Some(&NavRequest::Resolve { event: "on_back".into(), params: None }));
    }
}
