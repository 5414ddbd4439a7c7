use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::{MealDraft, SaveMealReply};
use crate::screens::describe_error;
use crate::shell::navigation::NavParams;
use crate::shell::{Command, ScreenContext, ScreenHandler, ScreenKind, ScreenMsg};
use crate::tui::widgets::{self, FocusRing, TextField};
use crate::tui::{Theme, chrome};

const FIELDS: [(&str, &str); 9] = [
    ("food_name", "Food"),
    ("serving_notes", "Serving"),
    ("calories_kcal", "Calories (kcal)"),
    ("protein_g", "Protein (g)"),
    ("carbs_g", "Carbs (g)"),
    ("fat_g", "Fat (g)"),
    ("fiber_g", "Fiber (g)"),
    ("sugar_g", "Sugar (g)"),
    ("sodium_mg", "Sodium (mg)"),
];
const SAVE: usize = FIELDS.len();

enum Msg {
    Saved(Result<Value, String>),
}

/// Review and edit an analyzed meal before logging it
pub struct MealConfirmScreen {
    fields: Vec<TextField>,
    focus: FocusRing,
    meal_type: String,
    consumed_at: String,
    image_base64: Option<String>,
    confidence: Option<f64>,
    warnings: Vec<String>,
    loading: bool,
    error: Option<String>,
}

impl MealConfirmScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let (draft, image_base64, meal_type, consumed_at) = match ctx.nav.params.clone() {
            Some(NavParams::MealDraft {
                draft,
                image_base64,
                meal_type,
                consumed_at,
            }) => (draft, image_base64, meal_type, consumed_at),
            _ => (MealDraft::default(), None, String::new(), String::new()),
        };

        let meal_type = if meal_type.is_empty() {
            draft.meal_type.clone().unwrap_or_default()
        } else {
            meal_type
        };
        let consumed_at = if consumed_at.is_empty() {
            draft.consumed_at.clone().unwrap_or_default()
        } else {
            consumed_at
        };

        let fields = vec![
            TextField::new(draft.food_name.clone()),
            TextField::new(draft.serving_notes.clone()),
            TextField::new(draft.calories_kcal.to_string()),
            TextField::new(draft.protein_g.to_string()),
            TextField::new(draft.carbs_g.to_string()),
            TextField::new(draft.fat_g.to_string()),
            TextField::new(draft.fiber_g.to_string()),
            TextField::new(draft.sugar_g.to_string()),
            TextField::new(draft.sodium_mg.to_string()),
        ];

        Self {
            fields,
            focus: FocusRing::new(FIELDS.len() + 1),
            meal_type,
            consumed_at,
            image_base64,
            confidence: draft.confidence,
            warnings: draft.warnings,
            loading: false,
            error: None,
        }
    }

    fn payload(&self) -> Value {
        let text = |i: usize| self.fields[i].value().trim().to_string();
        let number = |i: usize| self.fields[i].as_f64();
        json!({
            "meal_type": self.meal_type,
            "consumed_at": self.consumed_at,
            "image_base64": self.image_base64,
            "food_name": text(0),
            "serving_notes": text(1),
            "calories_kcal": number(2),
            "protein_g": number(3),
            "carbs_g": number(4),
            "fat_g": number(5),
            "fiber_g": number(6),
            "sugar_g": number(7),
            "sodium_mg": number(8),
        })
    }

    fn save(&mut self, ctx: &ScreenContext) -> Command {
        let Some(agent) = ctx.screen.agent_id.clone() else {
            return Command::None;
        };
        if self.loading {
            return Command::None;
        }
        self.loading = true;
        self.error = None;

        ctx.emit(
            "on_save",
            Some(json!({ "meal_type": self.meal_type, "consumed_at": self.consumed_at })),
        );

        let api = Arc::clone(&ctx.api);
        let payload = self.payload();
        Command::perform(async move { api.call(&agent, Some(payload)).await }, |result| {
            Msg::Saved(result.map_err(describe_error))
        })
    }
}

impl ScreenHandler for MealConfirmScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::MealConfirm
    }

    fn handle_key(&mut self, ctx: &ScreenContext, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Esc {
            return Some(ctx.back_command());
        }
        if self.focus.handle_key(key) {
            return Some(Command::None);
        }

        let index = self.focus.index();
        if index == SAVE {
            let command = if widgets::is_activate(&key) {
                self.save(ctx)
            } else {
                Command::None
            };
            return Some(command);
        }

        if widgets::is_activate(&key) {
            self.focus.next();
        } else if let Some(field) = self.fields.get_mut(index) {
            field.handle_key(key);
        }
        Some(Command::None)
    }

    fn on_complete(&mut self, ctx: &ScreenContext, msg: ScreenMsg) -> Command {
        let Ok(msg) = msg.downcast::<Msg>() else {
            return Command::None;
        };
        let Msg::Saved(result) = *msg;
        self.loading = false;

        match result {
            Ok(value) => {
                let reply: SaveMealReply = serde_json::from_value(value).unwrap_or_default();
                ctx.emit("on_save_success", Some(json!({ "meal_id": reply.meal_id })));
                let params = NavParams::HighlightMeal {
                    meal_id: reply.meal_id,
                };
                Command::navigate(ctx.nav.resolve("on_save_success", Some(params)))
            }
            Err(e) => {
                self.error = Some(e);
                Command::None
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext, theme: &Theme) {
        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{} ", self.meal_type), theme.title_style()),
            Span::styled(self.consumed_at.clone(), theme.muted_style()),
        ])];

        if let Some(confidence) = self.confidence {
            lines.push(Line::from(Span::styled(
                format!("Confidence: {:.0}%", confidence * 100.0),
                theme.muted_style(),
            )));
        }
        for warning in &self.warnings {
            lines.push(Line::from(Span::styled(format!("! {}", warning), theme.warning_style())));
        }
        lines.push(Line::from(""));

        if let Some(error) = &self.error {
            lines.push(chrome::error_line(error, theme));
            lines.push(Line::from(""));
        }

        for (i, ((_, label), field)) in FIELDS.iter().zip(&self.fields).enumerate() {
            lines.push(field.to_line(label, self.focus.is(i), theme));
        }
        lines.push(Line::from(""));

        let label = if self.loading { "Saving…" } else { "Save Meal" };
        lines.push(widgets::button_line(label, self.focus.is(SAVE), !self.loading, theme));

        let body = Paragraph::new(lines)
            .block(chrome::screen_block(&ctx.screen.title, theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(body, area);
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Tab", "Next field"), ("Enter", "Save")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{context, key, nav_request, type_text};
    use crate::shell::NavRequest;

    fn draft_params() -> NavParams {
        NavParams::MealDraft {
            draft: MealDraft {
                food_name: "Oatmeal".into(),
                calories_kcal: 320.0,
                protein_g: 12.0,
                ..MealDraft::default()
            },
            image_base64: Some("aGVsbG8=".into()),
            meal_type: "breakfast".into(),
            consumed_at: "2026-10-01T08:00:00Z".into(),
        }
    }

    #[test]
    fn test_fields_are_seeded_from_draft() {
        let ctx = context("meal_confirm", Some(draft_params()));
        let screen = MealConfirmScreen::new(&ctx);
        assert_eq!(screen.fields[0].value(), "Oatmeal");
        assert_eq!(screen.fields[2].value(), "320");
        assert_eq!(screen.meal_type, "breakfast");
    }

    #[test]
    fn test_payload_reflects_edits() {
        let ctx = context("meal_confirm", Some(draft_params()));
        let mut screen = MealConfirmScreen::new(&ctx);

        screen.focus.focus(2);
        for _ in 0..3 {
            screen.handle_key(&ctx, key(KeyCode::Backspace));
        }
        for k in type_text("450") {
            screen.handle_key(&ctx, k);
        }

        let payload = screen.payload();
        assert_eq!(payload["calories_kcal"], 450.0);
        assert_eq!(payload["meal_type"], "breakfast");
        assert_eq!(payload["image_base64"], "aGVsbG8=");
    }

    #[test]
    fn test_save_success_resolves_with_highlight() {
        let ctx = context("meal_confirm", Some(draft_params()));
        let mut screen = MealConfirmScreen::new(&ctx);
        screen.loading = true;

        let command = screen.on_complete(&ctx, Box::new(Msg::Saved(Ok(json!({ "ok": true, "meal_id": "meal_1" })))));
        assert!(!screen.loading);
        assert_eq!(
            nav_request(&command),
            Some(&NavRequest::Resolve {
                event: "on_save_success".into(),
                params: Some(NavParams::HighlightMeal {
                    meal_id: Some("meal_1".into())
                }),
            })
        );
    }

    #[test]
    fn test_missing_params_leave_blank_form() {
        let ctx = context("meal_confirm", None);
        let screen = MealConfirmScreen::new(&ctx);
        assert_eq!(screen.fields[0].value(), "");
        assert_eq!(screen.fields[2].value(), "0");
    }
}
