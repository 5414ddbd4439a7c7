use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct Handlers {
    next_id: u64,
    by_event: HashMap<String, Vec<(u64, Handler)>>,
}

/// Fire-and-forget fan-out for screen events.
///
/// Used for side signaling (telemetry, debugging). Navigation never reads it.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<Handlers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`. Dropping the returned value keeps the
    /// handler registered; call `unsubscribe` to remove it.
    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let event = event.into();
        let mut handlers = self.lock();
        let id = handlers.next_id;
        handlers.next_id += 1;
        handlers
            .by_event
            .entry(event.clone())
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            handlers: Arc::downgrade(&self.handlers),
            event,
            id,
        }
    }

    /// Deliver `payload` to every handler registered for `event`
    pub fn emit(&self, event: &str, payload: Option<Value>) {
        let payload = payload.unwrap_or(Value::Null);
        debug!("[event] {} {}", event, payload);

        // Snapshot so handlers may subscribe or emit without deadlocking
        let targets: Vec<Handler> = self
            .lock()
            .by_event
            .get(event)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        for handler in targets {
            handler(&payload);
        }
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.lock().by_event.get(event).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Handlers> {
        // A panicking handler can't leave the map half-updated, so poisoning is ignored
        self.handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle returned by `EventBus::on`
pub struct Subscription {
    handlers: Weak<Mutex<Handlers>>,
    event: String,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        let Some(handlers) = self.handlers.upgrade() else {
            return;
        };
        let mut handlers = handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(list) = handlers.by_event.get_mut(&self.event) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                handlers.by_event.remove(&self.event);
            }
        }
    }
}
