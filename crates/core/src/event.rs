//! Loop event system — surfacing intermediate exchanges to callers.
//!
//! The loop publishes an event for every round trip and fetch so that the
//! caller (the CLI, a test) can observe the exchange as it happens, not
//! just the final answer. Built on `tokio::sync::broadcast`; publishing
//! with no subscribers is fine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Events emitted by the context-augmentation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoopEvent {
    /// The model returned a response for an iteration.
    ResponseReceived {
        iteration: u32,
        content: String,
        timestamp: DateTime<Utc>,
    },

    /// A `QUERY:` directive was served from the knowledge store.
    KnowledgeRetrieved {
        query: String,
        snippets: usize,
        timestamp: DateTime<Utc>,
    },

    /// A `FILE:` directive was served from the filesystem.
    FileFetched {
        path: String,
        found: bool,
        timestamp: DateTime<Utc>,
    },

    /// The context buffer was truncated to fit the token budget.
    ContextTruncated {
        before_tokens: usize,
        after_tokens: usize,
        timestamp: DateTime<Utc>,
    },

    /// The iteration ceiling was hit; one forced final call follows.
    CeilingReached {
        iterations: u32,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for loop events.
///
/// Components can subscribe to receive all events and filter for what they
/// care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<LoopEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: LoopEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<LoopEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(LoopEvent::FileFetched {
            path: "src/main.rs".into(),
            found: true,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            LoopEvent::FileFetched { path, found, .. } => {
                assert_eq!(path, "src/main.rs");
                assert!(found);
            }
            _ => panic!("Expected FileFetched event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(4);
        bus.publish(LoopEvent::CeilingReached {
            iterations: 5,
            timestamp: Utc::now(),
        });
    }
}
