//! Observer trait for hosts watching a stream session.

use ndtail_types::{Message, StreamEvent};

/// Trait for host-side observers of a stream session.
///
/// Both methods default to no-ops so hosts implement only what they render.
/// Callbacks run synchronously on the monitor's task and are never invoked
/// while the monitor holds its internal lock.
pub trait StreamObserver: Send + Sync {
    /// Called for each emitted session event.
    fn on_event(&self, event: StreamEvent) {
        let _ = event;
    }

    /// Called after each message is appended to the display log.
    fn on_update(&self, message: &Message) {
        let _ = message;
    }
}
