// File: inventory/src/events.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Collected records changed
    Data,
    /// Derived content (configuration cache) changed
    Content,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Data => "data",
            EventType::Content => "content",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fan-out of change notifications to any number of subscribers
#[derive(Clone)]
pub struct EventNotifier {
    sender: broadcast::Sender<EventType>,
}

impl EventNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscriber is not an error.
    pub fn notify(&self, event: EventType) {
        match self.sender.send(event) {
            Ok(receivers) => debug!("Notified {} subscribers: {}", receivers, event),
            Err(_) => debug!("No subscribers for event: {}", event),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventType> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventNotifier {
    fn default() -> Self {
        Self::new()
    }
}
