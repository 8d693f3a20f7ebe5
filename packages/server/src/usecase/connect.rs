//! Connection establishment and authentication.

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ChatStore, ConnectionId, MessagePusher, PresenceState, PusherChannel, Timestamp, UserId,
};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::usecase::{PresencePublisher, log_and_discard};

pub struct ConnectUseCase {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresencePublisher>,
    clock: Arc<dyn Clock>,
}

impl ConnectUseCase {
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

    /// Register a new anonymous session and announce the updated count.
    ///
    /// Returns the server-generated id the transport uses for every
    /// subsequent event on this connection.
    pub async fn connect(&self, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        self.registry.register(connection_id).await;
        self.pusher.register_connection(connection_id, sender).await;
        self.presence.broadcast_active_count().await;
        connection_id
    }

    /// Bind an identity to a connection.
    ///
    /// The identity is taken on trust; token verification happens upstream
    /// of the relay. The external presence write and connection record are
    /// best-effort: their failure is logged and the connection stays up.
    pub async fn authenticate(&self, connection_id: ConnectionId, user_id: UserId) {
        if !self
            .registry
            .authenticate(connection_id, user_id.clone())
            .await
        {
            tracing::warn!(
                "Ignoring authenticate for unknown connection '{}'",
                connection_id
            );
            return;
        }

        let now = Timestamp::new(self.clock.now_millis());
        log_and_discard(
            "presence upsert",
            self.store
                .upsert_presence(&user_id, PresenceState::Online, now)
                .await,
        );
        log_and_discard(
            "socket connection insert",
            self.store
                .insert_socket_connection(&user_id, &connection_id)
                .await,
        );

        tracing::info!(
            "Connection '{}' authenticated as '{}'",
            connection_id,
            user_id.as_str()
        );
        self.presence.broadcast_active_count().await;
    }
}
