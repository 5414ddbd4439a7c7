//! Payload shapes exchanged between screens and the API collaborator.
//!
//! The API itself is untyped JSON; screens convert to and from these structs
//! at the edge and fall back to defaults for missing fields.

use serde::{Deserialize, Serialize};

pub const MEAL_TYPES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

/// Nutrition estimate produced by meal analysis and edited before saving
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MealDraft {
    pub food_name: String,
    pub serving_notes: String,
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    pub confidence: Option<f64>,
    pub warnings: Vec<String>,
    pub meal_type: Option<String>,
    pub consumed_at: Option<String>,
}

/// A saved meal as returned by the history route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MealRecord {
    pub meal_id: String,
    pub meal_type: String,
    pub consumed_at: String,
    pub food_name: String,
    pub serving_notes: String,
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    pub has_image: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveMealReply {
    pub ok: bool,
    pub meal_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MealHistoryReply {
    pub meals: Vec<MealRecord>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DayTotals {
    pub date: String,
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyReport {
    pub total_calories_kcal: f64,
    pub avg_daily_calories_kcal: f64,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub best_day: Option<String>,
    pub needs_attention: Vec<String>,
    pub days: Vec<DayTotals>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceReply {
    pub advice_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub created_at: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
