//! Room membership.

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, UserId};
use crate::infrastructure::registry::ConnectionRegistry;

pub struct JoinRoomUseCase {
    registry: Arc<ConnectionRegistry>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Subscribe a connection to a room's broadcast group.
    ///
    /// The claimed identity is taken on trust; room-level authorization is
    /// the caller's responsibility. There is no explicit leave: membership
    /// is cleared when the connection disconnects.
    pub async fn join(&self, connection_id: ConnectionId, room_id: RoomId, user_id: UserId) {
        if self.registry.join_room(connection_id, room_id.clone()).await {
            tracing::info!(
                "User '{}' joined room '{}' on connection '{}'",
                user_id.as_str(),
                room_id.as_str(),
                connection_id
            );
        } else {
            tracing::warn!(
                "Ignoring join for unknown connection '{}'",
                connection_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_subscribes_connection_to_room() {
        // given:
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = JoinRoomUseCase::new(registry.clone());
        let connection_id = ConnectionId::generate();
        registry.register(connection_id).await;

        // when:
        usecase.join(connection_id, room("room-9"), user("user-1")).await;

        // then:
        assert_eq!(
            registry.room_members(&room("room-9")).await,
            vec![connection_id]
        );
    }

    #[tokio::test]
    async fn test_join_for_unknown_connection_is_ignored() {
        // given:
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = JoinRoomUseCase::new(registry.clone());

        // when:
        usecase
            .join(ConnectionId::generate(), room("room-9"), user("user-1"))
            .await;

        // then:
        assert!(registry.room_members(&room("room-9")).await.is_empty());
    }
}
