//! Ephemeral typing signals.

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{ChatStore, ConnectionId, MessagePusher, RoomId, Timestamp, TypingState, UserId};
use crate::infrastructure::dto::websocket::OutboundEvent;
use crate::infrastructure::registry::ConnectionRegistry;
use crate::usecase::log_and_discard;

/// Typing indicators favor liveness over durability: the store write is
/// best-effort and the broadcast goes out regardless of its outcome.
pub struct TypingUseCase {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl TypingUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        store: Arc<dyn ChatStore>,
        pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            store,
            pusher,
            clock,
        }
    }

    /// Announce that a user started typing to everyone else in the room.
    pub async fn typing_start(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        user_id: UserId,
        username: Option<String>,
    ) {
        self.record(room_id.clone(), user_id.clone(), true).await;
        let payload = OutboundEvent::UserTyping {
            user_id: user_id.into_string(),
            username,
        }
        .to_json();
        self.broadcast_to_others(connection_id, &room_id, &payload)
            .await;
    }

    /// Announce that a user stopped typing to everyone else in the room.
    pub async fn typing_end(&self, connection_id: ConnectionId, room_id: RoomId, user_id: UserId) {
        self.record(room_id.clone(), user_id.clone(), false).await;
        let payload = OutboundEvent::UserStoppedTyping {
            user_id: user_id.into_string(),
        }
        .to_json();
        self.broadcast_to_others(connection_id, &room_id, &payload)
            .await;
    }

    async fn record(&self, room_id: RoomId, user_id: UserId, is_typing: bool) {
        let state = TypingState {
            room_id,
            user_id,
            is_typing,
            updated_at: Timestamp::new(self.clock.now_millis()),
        };
        log_and_discard(
            "typing status upsert",
            self.store.upsert_typing_status(state).await,
        );
    }

    /// Fan out to every room member except the signal's own connection.
    async fn broadcast_to_others(
        &self,
        exclude: ConnectionId,
        room_id: &RoomId,
        payload: &str,
    ) {
        let targets: Vec<ConnectionId> = self
            .registry
            .room_members(room_id)
            .await
            .into_iter()
            .filter(|member| *member != exclude)
            .collect();
        if let Err(e) = self.pusher.broadcast(targets, payload).await {
            tracing::warn!("Failed to broadcast typing signal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockChatStore, StoreError};
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use crate::infrastructure::store::InMemoryChatStore;
    use parlor_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    struct RoomFixture {
        usecase: TypingUseCase,
        store: Arc<InMemoryChatStore>,
        members: Vec<(ConnectionId, mpsc::UnboundedReceiver<String>)>,
    }

    /// Three connections, all subscribed to room-9.
    async fn create_room_fixture() -> RoomFixture {
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let store = Arc::new(InMemoryChatStore::new());
        let mut members = Vec::new();
        for _ in 0..3 {
            let conn = ConnectionId::generate();
            let (tx, rx) = mpsc::unbounded_channel();
            registry.register(conn).await;
            registry.join_room(conn, room("room-9")).await;
            pusher.register_connection(conn, tx).await;
            members.push((conn, rx));
        }
        let usecase = TypingUseCase::new(
            registry,
            store.clone(),
            pusher,
            Arc::new(FixedClock::new(1700000000000)),
        );
        RoomFixture {
            usecase,
            store,
            members,
        }
    }

    #[tokio::test]
    async fn test_typing_start_excludes_the_typist() {
        // given:
        let mut fixture = create_room_fixture().await;
        let typist = fixture.members[0].0;

        // when:
        fixture
            .usecase
            .typing_start(typist, room("room-9"), user("user-1"), Some("Alice".to_string()))
            .await;

        // then: the typist's own connection got nothing
        assert!(fixture.members[0].1.try_recv().is_err());
        // everyone else got the signal
        for (_, rx) in &mut fixture.members[1..] {
            let event = rx.try_recv().unwrap();
            assert!(event.contains(r#""type":"user_typing""#));
            assert!(event.contains(r#""userId":"user-1""#));
            assert!(event.contains(r#""username":"Alice""#));
        }
        // and the typing row was recorded
        let state = fixture
            .store
            .typing_of(&room("room-9"), &user("user-1"))
            .await
            .unwrap();
        assert!(state.is_typing);
    }

    #[tokio::test]
    async fn test_typing_end_clears_the_flag() {
        // given:
        let mut fixture = create_room_fixture().await;
        let typist = fixture.members[0].0;

        // when:
        fixture
            .usecase
            .typing_end(typist, room("room-9"), user("user-1"))
            .await;

        // then:
        for (_, rx) in &mut fixture.members[1..] {
            let event = rx.try_recv().unwrap();
            assert!(event.contains(r#""type":"user_stopped_typing""#));
        }
        let state = fixture
            .store
            .typing_of(&room("room-9"), &user("user-1"))
            .await
            .unwrap();
        assert!(!state.is_typing);
    }

    #[tokio::test]
    async fn test_store_failure_never_blocks_the_broadcast() {
        // given: a store that rejects the typing upsert
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let mut store = MockChatStore::new();
        store
            .expect_upsert_typing_status()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("down".to_string())));

        let typist = ConnectionId::generate();
        let other = ConnectionId::generate();
        let (typist_tx, _typist_rx) = mpsc::unbounded_channel();
        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        for (conn, tx) in [(typist, typist_tx), (other, other_tx)] {
            registry.register(conn).await;
            registry.join_room(conn, room("room-9")).await;
            pusher.register_connection(conn, tx).await;
        }
        let usecase = TypingUseCase::new(
            registry,
            Arc::new(store),
            pusher,
            Arc::new(FixedClock::new(1)),
        );

        // when:
        usecase
            .typing_start(typist, room("room-9"), user("user-1"), None)
            .await;

        // then: the signal still went out
        assert!(other_rx.try_recv().unwrap().contains(r#""type":"user_typing""#));
    }
}
