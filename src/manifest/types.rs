use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Screen id used as the root screen when the manifest doesn't name one
pub const ROOT_SCREEN_ID: &str = "home";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Theme {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub primary_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMeta {
    pub app_id: String,
    pub name: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub start_screen_id: Option<String>,
}

/// A single navigable screen as declared by the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenDef {
    pub screen_id: String,
    pub title: String,

    /// Screen-specific configuration, parsed by the screen handler itself
    #[serde(default)]
    pub props: Map<String, Value>,

    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub schema_id: Option<String>,
    #[serde(default)]
    pub codegen_id: Option<String>,

    /// Symbolic event name -> target screen id
    #[serde(default)]
    pub navigation: BTreeMap<String, String>,
}

impl ScreenDef {
    /// Target screen for a symbolic event, if the manifest declares one
    pub fn target_for(&self, event: &str) -> Option<&str> {
        self.navigation.get(event).map(String::as_str)
    }

    /// Deserialize the props bag into a typed struct, falling back to its default
    pub fn typed_props<T>(&self) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match serde_json::from_value(Value::Object(self.props.clone())) {
            Ok(props) => props,
            Err(e) => {
                log::warn!("Invalid props for screen '{}': {}", self.screen_id, e);
                T::default()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub app: AppMeta,
    #[serde(default)]
    pub screens: Vec<ScreenDef>,

    // Authoring metadata, carried along but never interpreted by the shell
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub codegen_prompts: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<Value>,
}

impl Manifest {
    /// Pick the screen the shell starts on.
    ///
    /// An explicit `start_screen_id` wins only when it names a real screen.
    /// Otherwise `home` is preferred, then the first declared screen. A manifest
    /// without screens still yields `home`, which later renders as not found.
    pub fn start_screen_id(&self) -> &str {
        if let Some(explicit) = self.app.start_screen_id.as_deref() {
            if self.has_screen(explicit) {
                return explicit;
            }
        }

        if self.has_screen(ROOT_SCREEN_ID) {
            return ROOT_SCREEN_ID;
        }

        self.screens
            .first()
            .map(|s| s.screen_id.as_str())
            .unwrap_or(ROOT_SCREEN_ID)
    }

    pub fn screen_by_id(&self, screen_id: &str) -> Option<&ScreenDef> {
        self.screens.iter().find(|s| s.screen_id == screen_id)
    }

    pub fn has_screen(&self, screen_id: &str) -> bool {
        self.screen_by_id(screen_id).is_some()
    }

    pub fn screen_ids(&self) -> impl Iterator<Item = &str> {
        self.screens.iter().map(|s| s.screen_id.as_str())
    }
}
