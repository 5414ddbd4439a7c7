use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::manifest::Manifest;
use crate::models::MealDraft;
use crate::shell::routing::resolve_target;

/// Default depth at which a warning is logged about a growing history
pub const DEFAULT_DEPTH_WARNING: usize = 32;

/// Identity of one stack frame, unique for the lifetime of a `NavStack`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parameters handed from the navigating screen to the next one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavParams {
    /// Analysis result waiting for confirmation
    MealDraft {
        draft: MealDraft,
        image_base64: Option<String>,
        meal_type: String,
        consumed_at: String,
    },
    /// Meal to highlight after saving
    HighlightMeal { meal_id: Option<String> },
    /// Anything else, passed through untouched
    Open { values: Map<String, Value> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackEntry {
    pub id: EntryId,
    pub screen_id: String,
    pub params: Option<NavParams>,
}

/// A navigation request produced by a screen and applied by the shell
#[derive(Debug, Clone, PartialEq)]
pub enum NavRequest {
    Go { screen_id: String, params: Option<NavParams> },
    Back,
    Resolve { event: String, params: Option<NavParams> },
}

/// Ordered history of visited screens.
///
/// Never empty: the root entry is pushed at construction and `back` refuses
/// to pop it.
#[derive(Debug)]
pub struct NavStack {
    entries: Vec<StackEntry>,
    next_id: u64,
    depth_warning: usize,
}

impl NavStack {
    pub fn new(start_screen_id: impl Into<String>) -> Self {
        Self {
            entries: vec![StackEntry {
                id: EntryId(0),
                screen_id: start_screen_id.into(),
                params: None,
            }],
            next_id: 1,
            depth_warning: DEFAULT_DEPTH_WARNING,
        }
    }

    pub fn with_depth_warning(mut self, depth: usize) -> Self {
        self.depth_warning = depth.max(1);
        self
    }

    pub fn current(&self) -> &StackEntry {
        // Invariant: entries is never empty
        &self.entries[self.entries.len() - 1]
    }

    pub fn current_screen_id(&self) -> &str {
        &self.current().screen_id
    }

    pub fn params(&self) -> Option<&NavParams> {
        self.current().params.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_root(&self) -> bool {
        self.entries.len() == 1
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Push a new frame. The target isn't checked against the manifest.
    pub fn go(&mut self, screen_id: impl Into<String>, params: Option<NavParams>) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        let screen_id = screen_id.into();
        debug!("nav: go {} {} (depth {})", screen_id, id, self.entries.len() + 1);
        self.entries.push(StackEntry { id, screen_id, params });

        if self.entries.len() % self.depth_warning == 0 {
            warn!("Navigation stack reached depth {}", self.entries.len());
        }
        id
    }

    /// Pop the top frame unless it is the root. Returns whether anything changed.
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            let popped = self.entries.pop();
            debug!(
                "nav: back from {:?} to {}",
                popped.map(|e| e.screen_id),
                self.current_screen_id()
            );
            true
        } else {
            debug!("nav: back ignored at root {}", self.current_screen_id());
            false
        }
    }

    /// Follow the current screen's navigation table for `event`.
    ///
    /// Events without a declared transition are ignored.
    pub fn resolve(&mut self, manifest: &Manifest, event: &str, params: Option<NavParams>) -> Option<EntryId> {
        match resolve_target(manifest, self.current_screen_id(), event) {
            Some(target) => Some(self.go(target, params)),
            None => {
                debug!("nav: no transition for '{}' on {}", event, self.current_screen_id());
                None
            }
        }
    }

    /// Apply a screen's request. Returns whether the top entry changed.
    pub fn apply(&mut self, manifest: &Manifest, request: NavRequest) -> bool {
        match request {
            NavRequest::Go { screen_id, params } => {
                self.go(screen_id, params);
                true
            }
            NavRequest::Back => self.back(),
            NavRequest::Resolve { event, params } => self.resolve(manifest, &event, params).is_some(),
        }
    }

    /// Read-only projection handed to screens
    pub fn nav(&self) -> Nav {
        let current = self.current();
        Nav {
            current_screen_id: current.screen_id.clone(),
            params: current.params.clone(),
            entry: current.id,
        }
    }
}

/// What a screen sees of navigation: where it is, what it was given, and
/// constructors for the requests it may issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Nav {
    pub current_screen_id: String,
    pub params: Option<NavParams>,
    pub entry: EntryId,
}

impl Nav {
    pub fn go(&self, screen_id: impl Into<String>, params: Option<NavParams>) -> NavRequest {
        NavRequest::Go {
            screen_id: screen_id.into(),
            params,
        }
    }

    pub fn back(&self) -> NavRequest {
        NavRequest::Back
    }

    pub fn resolve(&self, event: impl Into<String>, params: Option<NavParams>) -> NavRequest {
        NavRequest::Resolve {
            event: event.into(),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ValidationMode;

    fn manifest() -> Manifest {
        Manifest::from_json(
            r#"{
                "app": { "app_id": "t", "name": "T" },
                "screens": [
                    { "screen_id": "home", "title": "Home", "navigation": { "start_capture": "meal_capture" } },
                    { "screen_id": "meal_capture", "title": "Capture", "navigation": { "on_back": "home" } }
                ]
            }"#,
            ValidationMode::Strict,
        )
        .unwrap()
    }

    fn open(key: &str, value: i64) -> Option<NavParams> {
        let mut values = Map::new();
        values.insert(key.to_string(), Value::from(value));
        Some(NavParams::Open { values })
    }

    #[test]
    fn test_initial_stack_has_root_without_params() {
        let stack = NavStack::new("home");
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.current_screen_id(), "home");
        assert!(stack.params().is_none());
    }

    #[test]
    fn test_back_at_root_is_idempotent() {
        let mut stack = NavStack::new("home");
        assert!(!stack.back());
        assert!(!stack.back());
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.current_screen_id(), "home");
    }

    #[test]
    fn test_go_then_back_restores_previous_frame() {
        let mut stack = NavStack::new("home");
        stack.go("a", open("n", 1));
        stack.go("b", open("n", 2));
        let before = stack.current().clone();

        stack.go("c", open("n", 3));
        assert_eq!(stack.params(), open("n", 3).as_ref());
        assert!(stack.back());

        assert_eq!(stack.current(), &before);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_go_does_not_validate_targets() {
        let mut stack = NavStack::new("home");
        stack.go("ghost", None);
        assert_eq!(stack.current_screen_id(), "ghost");
    }

    #[test]
    fn test_entry_ids_are_never_reused() {
        let mut stack = NavStack::new("home");
        let first = stack.go("a", None);
        stack.back();
        let second = stack.go("a", None);
        assert_ne!(first, second);
        assert!(!stack.contains(first));
        assert!(stack.contains(second));
    }

    #[test]
    fn test_unresolved_event_leaves_stack_unchanged() {
        let m = manifest();
        let mut stack = NavStack::new("home");
        let before = stack.current().clone();

        assert!(stack.resolve(&m, "on_refresh", open("x", 1)).is_none());
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.current(), &before);
    }

    #[test]
    fn test_resolved_event_pushes_exactly_one_frame() {
        let m = manifest();
        let mut stack = NavStack::new("home");

        stack.resolve(&m, "start_capture", open("x", 7));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current_screen_id(), "meal_capture");
        assert_eq!(stack.params(), open("x", 7).as_ref());
    }

    #[test]
    fn test_capture_round_trip_scenario() {
        let m = manifest();
        let mut stack = NavStack::new(m.start_screen_id());

        assert!(stack.apply(&m, NavRequest::Resolve { event: "start_capture".into(), params: None }));
        let ids: Vec<&str> = stack.entries().iter().map(|e| e.screen_id.as_str()).collect();
        assert_eq!(ids, vec!["home", "meal_capture"]);
        assert!(stack.params().is_none());

        assert!(stack.apply(&m, NavRequest::Back));
        let ids: Vec<&str> = stack.entries().iter().map(|e| e.screen_id.as_str()).collect();
        assert_eq!(ids, vec!["home"]);
    }

    #[test]
    fn test_nav_projection_tracks_stack() {
        let mut stack = NavStack::new("home");
        let id = stack.go("meal_history", Some(NavParams::HighlightMeal { meal_id: Some("m1".into()) }));

        let nav = stack.nav();
        assert_eq!(nav.current_screen_id, "meal_history");
        assert_eq!(nav.entry, id);
        assert_eq!(nav.resolve("on_back", None), NavRequest::Resolve { event: "on_back".into(), params: None });
    }

    #[test]
    fn test_depth_is_unbounded() {
        let mut stack = NavStack::new("home").with_depth_warning(4);
        for i in 0..100 {
            stack.go(format!("s{i}"), None);
        }
        assert_eq!(stack.len(), 101);
    }
}
