//! Manifest-driven shell: navigation stack, screen registry, event bus, and
//! the orchestrator that ties them to one render cycle.

pub mod command;
pub mod events;
pub mod navigation;
pub mod orchestrator;
pub mod registry;
pub mod routing;
pub mod screen;

pub use command::{Command, ScreenMsg};
pub use events::{EventBus, Subscription};
pub use navigation::{EntryId, Nav, NavParams, NavRequest, NavStack, StackEntry};
pub use orchestrator::{ActiveView, Capabilities, Shell, ShellOptions};
pub use registry::{ScreenKind, ScreenRegistry};
pub use routing::resolve_target;
pub use screen::{ScreenContext, ScreenHandler};
