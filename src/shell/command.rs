use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use crate::shell::navigation::NavRequest;

/// Result of an async operation, downcast by the screen that started it
pub type ScreenMsg = Box<dyn Any + Send>;

/// Commands represent side effects that screens want to perform.
/// They are returned from screen handlers and executed by the shell.
pub enum Command {
    /// Do nothing
    None,

    /// Execute multiple commands in sequence
    Batch(Vec<Command>),

    /// Push, pop, or resolve an event against the navigation stack
    Navigate(NavRequest),

    /// Perform an async operation and hand the result back to the screen
    Perform(Pin<Box<dyn Future<Output = ScreenMsg> + Send>>),

    /// Quit the application
    Quit,
}

impl Command {
    /// Helper to create a command that performs an async operation
    pub fn perform<F, T, M>(future: F, to_msg: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        M: Send + 'static,
    {
        Command::Perform(Box::pin(async move {
            let result = future.await;
            Box::new(to_msg(result)) as ScreenMsg
        }))
    }

    /// Helper to issue a navigation request
    pub fn navigate(request: NavRequest) -> Self {
        Command::Navigate(request)
    }

    /// Helper to batch multiple commands
    pub fn batch(commands: Vec<Command>) -> Self {
        Command::Batch(commands)
    }
}

impl Default for Command {
    fn default() -> Self {
        Command::None
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::None => write!(f, "None"),
            Command::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Command::Navigate(req) => f.debug_tuple("Navigate").field(req).finish(),
            Command::Perform(_) => write!(f, "Perform(..)"),
            Command::Quit => write!(f, "Quit"),
        }
    }
}
