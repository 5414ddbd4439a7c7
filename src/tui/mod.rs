//! Terminal presentation: palette, frame chrome, and form controls.

pub mod chrome;
pub mod theme;
pub mod widgets;

pub use theme::{Theme, ThemeVariant};
