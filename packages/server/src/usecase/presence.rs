//! Presence publishing: the global active-connection count.

use std::sync::Arc;

use crate::domain::MessagePusher;
use crate::infrastructure::dto::websocket::OutboundEvent;
use crate::infrastructure::registry::ConnectionRegistry;

/// Publishes the active session count to every connected client.
///
/// The count is a global, unauthenticated-visible metric; it goes to all
/// connections, not just room members. Called synchronously after every
/// registry mutation, so the broadcast always reflects the just-committed
/// state.
pub struct PresencePublisher {
    registry: Arc<ConnectionRegistry>,
    pusher: Arc<dyn MessagePusher>,
}

impl PresencePublisher {
    pub fn new(registry: Arc<ConnectionRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// Emit the current active session count to every connection.
    pub async fn broadcast_active_count(&self) {
        let count = self.registry.active_count().await;
        let targets = self.registry.all_connections().await;
        let payload = OutboundEvent::ActiveUsers { count }.to_json();
        if let Err(e) = self.pusher.broadcast(targets, &payload).await {
            tracing::warn!("Failed to broadcast active count: {}", e);
        }
    }
}
