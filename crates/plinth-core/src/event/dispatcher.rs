use std::fmt;

use log::debug;
use tokio::sync::broadcast;

use crate::event::{HandlerId, PluginEvent};

/// Synchronous event handler
pub type EventHandler = Box<dyn Fn(&PluginEvent) + Send + Sync>;

/// Capacity of the broadcast channel handed out by [`EventDispatcher::subscribe`]
pub const BROADCAST_CAPACITY: usize = 256;

struct RegisteredHandler {
    id: HandlerId,
    /// `None` receives every event
    event_name: Option<&'static str>,
    handler: EventHandler,
}

/// Delivers [`PluginEvent`]s to registered handlers and broadcast subscribers.
///
/// Handlers run on the thread that caused the change, in registration order,
/// before the mutating call returns.
pub struct EventDispatcher {
    handlers: Vec<RegisteredHandler>,
    next_handler_id: HandlerId,
    sender: Option<broadcast::Sender<PluginEvent>>,
}

// Manual Debug implementation for EventDispatcher
impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handler_count", &self.handlers.len())
            .field("next_handler_id", &self.next_handler_id)
            .field(
                "subscriber_count",
                &self.sender.as_ref().map_or(0, |s| s.receiver_count()),
            )
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_handler_id: 1,
            sender: None,
        }
    }

    /// Register a handler for every event
    pub fn register_handler(&mut self, handler: EventHandler) -> HandlerId {
        self.push_handler(None, handler)
    }

    /// Register a handler for events named `event_name` (see [`PluginEvent::name`])
    pub fn register_named_handler(
        &mut self,
        event_name: &'static str,
        handler: EventHandler,
    ) -> HandlerId {
        self.push_handler(Some(event_name), handler)
    }

    fn push_handler(&mut self, event_name: Option<&'static str>, handler: EventHandler) -> HandlerId {
        let id = self.next_handler_id;
        self.next_handler_id += 1;
        self.handlers.push(RegisteredHandler {
            id,
            event_name,
            handler,
        });
        id
    }

    /// Unregister a handler, returning whether it was registered
    pub fn unregister_handler(&mut self, id: HandlerId) -> bool {
        let len_before = self.handlers.len();
        self.handlers.retain(|h| h.id != id);
        self.handlers.len() < len_before
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Receive every future event on a broadcast channel.
    ///
    /// A receiver that falls more than [`BROADCAST_CAPACITY`] events behind
    /// loses the oldest ones.
    pub fn subscribe(&mut self) -> broadcast::Receiver<PluginEvent> {
        self.sender
            .get_or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Deliver an event to matching handlers, then to broadcast subscribers
    pub fn dispatch(&self, event: &PluginEvent) {
        debug!("Dispatching event: {}", event);
        for registered in &self.handlers {
            if registered.event_name.is_none_or(|name| name == event.name()) {
                (registered.handler)(event);
            }
        }
        if let Some(sender) = &self.sender {
            // No live receivers is not a failure
            let _ = sender.send(event.clone());
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
