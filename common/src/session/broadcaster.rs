use tokio::sync::mpsc;

use super::events::SessionEvent;

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receives every domain event a session produces, in order. Called while
/// the session lock is held, so implementations must not block.
pub trait EventBroadcaster: Send + Sync + Clone + 'static {
    fn broadcast(&self, event: SessionEvent);
}

impl EventBroadcaster for EventSender {
    fn broadcast(&self, event: SessionEvent) {
        // The presentation side may already be gone during shutdown.
        let _ = self.send(event);
    }
}
