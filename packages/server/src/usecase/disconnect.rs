//! Connection teardown.

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{ChatStore, ConnectionId, MessagePusher, PresenceState, Timestamp};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::usecase::{PresencePublisher, log_and_discard};

pub struct DisconnectUseCase {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresencePublisher>,
    clock: Arc<dyn Clock>,
}

impl DisconnectUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        store: Arc<dyn ChatStore>,
        pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresencePublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            store,
            pusher,
            presence,
            clock,
        }
    }

    /// Remove a connection and everything keyed on it. Idempotent: the
    /// transport cannot fully rule out a duplicate disconnect, and a repeat
    /// must be a no-op.
    ///
    /// For an authenticated session the offline presence write and the
    /// connection-record removal are fire-and-forget: failures are logged,
    /// not retried, and never block deregistration.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let removal = self.registry.remove(connection_id).await;
        if !removal.was_registered {
            tracing::debug!("Connection '{}' already removed", connection_id);
            return;
        }

        if let Some(user_id) = removal.identity {
            let last_seen = Timestamp::new(self.clock.now_millis());
            log_and_discard(
                "presence offline upsert",
                self.store
                    .upsert_presence(&user_id, PresenceState::Offline, last_seen)
                    .await,
            );
            log_and_discard(
                "socket connection delete",
                self.store.delete_socket_connection(&user_id).await,
            );
            tracing::info!(
                "Connection '{}' of '{}' disconnected",
                connection_id,
                user_id.as_str()
            );
        } else {
            tracing::info!("Anonymous connection '{}' disconnected", connection_id);
        }

        self.pusher.unregister_connection(&connection_id).await;
        self.presence.broadcast_active_count().await;
    }
}
