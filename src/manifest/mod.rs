pub mod loader;
pub mod types;
pub mod validate;

pub use loader::{ManifestError, inspect_manifest, load_manifest};
pub use types::{AppMeta, Manifest, ROOT_SCREEN_ID, ScreenDef, Theme as ManifestTheme};
pub use validate::{DanglingEdge, ValidationMode, ValidationReport};
