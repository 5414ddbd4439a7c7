use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{DayTotals, MealDraft, MealRecord, WeeklyReport};

/// Backend agent calls, addressed by route (usually a screen's `agent_id`).
///
/// Payloads and results are untyped; each screen interprets its own route.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn call(&self, route: &str, payload: Option<Value>) -> Result<Value>;
}

pub const DEFAULT_LATENCY_MS: u64 = 400;

const DAILY_CALORIE_TARGET: f64 = 2000.0;
const DAILY_PROTEIN_FLOOR: f64 = 50.0;
const DAILY_SUGAR_CEILING: f64 = 50.0;

/// In-process stand-in for the agent backend.
///
/// Saved meals live in memory for the lifetime of the client so history and
/// reports reflect what was logged during the session.
pub struct MockApi {
    latency: Duration,
    meals: Mutex<Vec<MealRecord>>,
}

impl MockApi {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            meals: Mutex::new(Vec::new()),
        }
    }

    /// Client without simulated latency, for tests and headless runs
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn with_meals(self, meals: Vec<MealRecord>) -> Self {
        *self.meals.lock().unwrap_or_else(|p| p.into_inner()) = meals;
        self
    }

    fn meals(&self) -> Vec<MealRecord> {
        self.meals.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn analyze_meal(&self, payload: &Value) -> Result<Value> {
        let has_image = payload
            .get("image_base64")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if !has_image {
            bail!("image_base64 is required");
        }

        const FOODS: [(&str, &str); 4] = [
            ("Grilled chicken salad", "1 bowl"),
            ("Salmon with rice", "1 plate"),
            ("Oatmeal with berries", "1 cup"),
            ("Turkey sandwich", "1 sandwich"),
        ];
        let mut rng = rand::thread_rng();
        let (food_name, serving_notes) = FOODS.choose(&mut rng).copied().unwrap_or(FOODS[0]);
        let scale: f64 = rng.gen_range(0.8..1.2);

        let draft = MealDraft {
            food_name: food_name.to_string(),
            serving_notes: serving_notes.to_string(),
            calories_kcal: (550.0 * scale).round(),
            protein_g: (35.0 * scale).round(),
            carbs_g: (60.0 * scale).round(),
            fat_g: (18.0 * scale).round(),
            fiber_g: (7.0 * scale).round(),
            sugar_g: (9.0 * scale).round(),
            sodium_mg: (640.0 * scale).round(),
            confidence: Some(0.72),
            warnings: vec!["Portion size estimated from photo".to_string()],
            meal_type: payload.get("meal_type").and_then(Value::as_str).map(str::to_string),
            consumed_at: payload.get("consumed_at").and_then(Value::as_str).map(str::to_string),
        };

        Ok(json!({ "ok": true, "draft": draft }))
    }

    fn log_meal(&self, payload: Value) -> Result<Value> {
        let mut record: MealRecord =
            serde_json::from_value(payload.clone()).context("Invalid meal payload")?;
        if record.meal_type.is_empty() {
            bail!("meal_type is required");
        }
        record.meal_id = format!("meal_{}", uuid::Uuid::new_v4().simple());
        record.has_image = payload
            .get("image_base64")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if record.consumed_at.is_empty() {
            record.consumed_at = Utc::now().to_rfc3339();
        }

        let meal_id = record.meal_id.clone();
        self.meals.lock().unwrap_or_else(|p| p.into_inner()).push(record);
        Ok(json!({ "ok": true, "meal_id": meal_id }))
    }

    fn meal_history(&self, payload: &Value) -> Result<Value> {
        let range = payload.get("date_range").and_then(Value::as_str).unwrap_or("7d");
        let now = Utc::now();
        let cutoff = match range {
            "today" => now.date_naive(),
            "7d" => (now - ChronoDuration::days(7)).date_naive(),
            "30d" => (now - ChronoDuration::days(30)).date_naive(),
            other => bail!("Unknown date_range '{}'", other),
        };

        let mut meals: Vec<MealRecord> = self
            .meals()
            .into_iter()
            .filter(|m| consumed_date(m).is_some_and(|d| d >= cutoff))
            .collect();
        meals.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));

        Ok(json!({ "ok": true, "meals": meals }))
    }

    fn weekly_report(&self, payload: &Value) -> Result<Value> {
        let start = parse_date(payload, "week_start")?;
        let end = parse_date(payload, "week_end")?;
        if start > end {
            bail!("week_start must not be after week_end");
        }

        let mut days: BTreeMap<NaiveDate, DayTotals> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| {
                (
                    d,
                    DayTotals {
                        date: d.to_string(),
                        ..DayTotals::default()
                    },
                )
            })
            .collect();

        let mut total_sugar = 0.0;
        for meal in self.meals() {
            let Some(date) = consumed_date(&meal) else {
                continue;
            };
            if let Some(day) = days.get_mut(&date) {
                day.calories_kcal += meal.calories_kcal;
                day.protein_g += meal.protein_g;
                day.carbs_g += meal.carbs_g;
                day.fat_g += meal.fat_g;
                total_sugar += meal.sugar_g;
            }
        }

        let days: Vec<DayTotals> = days.into_values().collect();
        let day_count = days.len() as f64;
        let total = |f: fn(&DayTotals) -> f64| days.iter().map(f).sum::<f64>();

        let total_calories_kcal = total(|d| d.calories_kcal);
        let total_protein_g = total(|d| d.protein_g);

        let best_day = days
            .iter()
            .filter(|d| d.calories_kcal > 0.0)
            .min_by(|a, b| {
                let da = (a.calories_kcal - DAILY_CALORIE_TARGET).abs();
                let db = (b.calories_kcal - DAILY_CALORIE_TARGET).abs();
                da.total_cmp(&db)
            })
            .map(|d| d.date.clone());

        let mut needs_attention = Vec::new();
        let empty_days = days.iter().filter(|d| d.calories_kcal == 0.0).count();
        if empty_days > 0 {
            needs_attention.push(format!("{} day(s) with no meals logged", empty_days));
        }
        if total_protein_g / day_count < DAILY_PROTEIN_FLOOR {
            needs_attention.push(format!("Protein below {} g/day", DAILY_PROTEIN_FLOOR));
        }
        if total_sugar / day_count > DAILY_SUGAR_CEILING {
            needs_attention.push(format!("Sugar above {} g/day", DAILY_SUGAR_CEILING));
        }

        let report = WeeklyReport {
            total_calories_kcal,
            avg_daily_calories_kcal: (total_calories_kcal / day_count).round(),
            total_protein_g,
            total_carbs_g: total(|d| d.carbs_g),
            total_fat_g: total(|d| d.fat_g),
            best_day,
            needs_attention,
            days,
        };

        let mut value = serde_json::to_value(report)?;
        value["ok"] = Value::Bool(true);
        Ok(value)
    }

    fn nutrition_advice(&self, payload: &Value) -> Result<Value> {
        let text = payload
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("text is required"))?
            .to_lowercase();

        let advice = if text.contains("protein") {
            "Add a palm-sized protein source to each meal: eggs at breakfast, lean meat or tofu at lunch and dinner."
        } else if text.contains("sugar") {
            "Watch drinks and snacks first; they carry most hidden sugar. Swap one sweet snack a day for fruit or nuts."
        } else if text.contains("dinner") {
            "Try a vegetable-heavy plate with a lean protein, such as grilled fish with roasted vegetables."
        } else {
            "Based on your goal, prioritize lean protein and fiber. Reduce late-night sugary snacks."
        };

        Ok(json!({ "ok": true, "advice_text": advice }))
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_LATENCY_MS))
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn call(&self, route: &str, payload: Option<Value>) -> Result<Value> {
        info!("[api.call] {}", route);
        debug!("[api.call] {} payload: {}", route, payload.as_ref().map_or(0, |p| p.to_string().len()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let body = payload.clone().unwrap_or(Value::Null);
        match route {
            "agent_analyze_meal" => self.analyze_meal(&body),
            "agent_log_meal" => self.log_meal(body),
            "agent_meal_history" => self.meal_history(&body),
            "agent_weekly_report" => self.weekly_report(&body),
            "agent_set_goals" => Ok(json!({ "ok": true, "saved": true })),
            "agent_nutrition_advice" => self.nutrition_advice(&body),
            _ => Ok(json!({ "ok": true, "route": route, "payload": payload })),
        }
        .with_context(|| format!("API route '{}' failed", route))
    }
}

fn consumed_date(meal: &MealRecord) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(&meal.consumed_at)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

fn parse_date(payload: &Value, field: &str) -> Result<NaiveDate> {
    let raw = payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("{} is required", field))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("{} must be YYYY-MM-DD, got '{}'", field, raw))
}
