use std::collections::HashMap;
use std::fmt;

use crate::screens::{
    FallbackScreen, HomeScreen, MealCaptureScreen, MealConfirmScreen, MealHistoryScreen,
    NutritionAdviceScreen, WeeklyReportScreen,
};
use crate::shell::screen::{ScreenContext, ScreenHandler};

/// Every screen behavior compiled into the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Home,
    MealCapture,
    MealConfirm,
    MealHistory,
    WeeklyReport,
    NutritionAdvice,
    Fallback,
}

impl ScreenKind {
    pub fn instantiate(self, ctx: &ScreenContext) -> Box<dyn ScreenHandler> {
        match self {
            ScreenKind::Home => Box::new(HomeScreen::new(ctx)),
            ScreenKind::MealCapture => Box::new(MealCaptureScreen::new(ctx)),
            ScreenKind::MealConfirm => Box::new(MealConfirmScreen::new(ctx)),
            ScreenKind::MealHistory => Box::new(MealHistoryScreen::new(ctx)),
            ScreenKind::WeeklyReport => Box::new(WeeklyReportScreen::new(ctx)),
            ScreenKind::NutritionAdvice => Box::new(NutritionAdviceScreen::new(ctx)),
            ScreenKind::Fallback => Box::new(FallbackScreen::new(ctx)),
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenKind::Home => "HomeScreen",
            ScreenKind::MealCapture => "MealCaptureScreen",
            ScreenKind::MealConfirm => "MealConfirmScreen",
            ScreenKind::MealHistory => "MealHistoryScreen",
            ScreenKind::WeeklyReport => "WeeklyReportScreen",
            ScreenKind::NutritionAdvice => "NutritionAdviceScreen",
            ScreenKind::Fallback => "FallbackScreen",
        };
        f.write_str(name)
    }
}

const REGISTERED: [(&str, ScreenKind); 6] = [
    ("home", ScreenKind::Home),
    ("meal_capture", ScreenKind::MealCapture),
    ("meal_confirm", ScreenKind::MealConfirm),
    ("meal_history", ScreenKind::MealHistory),
    ("weekly_report", ScreenKind::WeeklyReport),
    ("nutrition_advice", ScreenKind::NutritionAdvice),
];

/// Screen id -> handler kind, with `Fallback` for anything unknown
pub struct ScreenRegistry {
    handlers: HashMap<&'static str, ScreenKind>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self {
            handlers: REGISTERED.into_iter().collect(),
        }
    }

    /// Exact-match lookup; unknown ids get the fallback handler
    pub fn screen_component(&self, screen_id: &str) -> ScreenKind {
        self.handlers
            .get(screen_id)
            .copied()
            .unwrap_or(ScreenKind::Fallback)
    }

    pub fn is_registered(&self, screen_id: &str) -> bool {
        self.handlers.contains_key(screen_id)
    }

    pub fn screen_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.handlers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for ScreenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_map_to_their_handlers() {
        let registry = ScreenRegistry::new();
        assert_eq!(registry.screen_component("home"), ScreenKind::Home);
        assert_eq!(registry.screen_component("meal_capture"), ScreenKind::MealCapture);
        assert_eq!(registry.screen_component("nutrition_advice"), ScreenKind::NutritionAdvice);
        assert_eq!(registry.screen_ids().len(), 6);
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let registry = ScreenRegistry::new();
        for id in ["settings", "", "ghost"] {
            assert_eq!(registry.screen_component(id), ScreenKind::Fallback);
            assert!(!registry.is_registered(id));
        }
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let registry = ScreenRegistry::new();
        for id in ["Home", "home ", "meal", "meal_capture_v2", "meal_"] {
            assert_eq!(registry.screen_component(id), ScreenKind::Fallback, "{id:?}");
        }
    }
}
