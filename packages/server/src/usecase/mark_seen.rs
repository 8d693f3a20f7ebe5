//! Read receipts.

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{ChatStore, MessageId, MessagePusher, Timestamp, UserId};
use crate::infrastructure::dto::websocket::OutboundEvent;
use crate::infrastructure::registry::ConnectionRegistry;

pub struct MarkSeenUseCase {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl MarkSeenUseCase {
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

    /// Record that a recipient read a message and notify the original
    /// sender on every connection they currently hold.
    ///
    /// The `message_seen` signal is targeted by identity, not room: the
    /// sender may have moved to another room or have several tabs open.
    /// Failures are logged and absorbed; read receipts never surface an
    /// error to the reader.
    pub async fn execute(&self, message_id: MessageId, reader_id: UserId) {
        let read_at = Timestamp::new(self.clock.now_millis());
        if let Err(e) = self
            .store
            .update_delivery_status(&message_id, &reader_id, read_at)
            .await
        {
            tracing::warn!(
                "Failed to record read receipt for message '{}' by '{}': {}",
                message_id.as_str(),
                reader_id.as_str(),
                e
            );
            return;
        }

        let message = match self.store.get_message_by_id(&message_id).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(
                    "Failed to load message '{}' for read receipt: {}",
                    message_id.as_str(),
                    e
                );
                return;
            }
        };

        // Re-read the live connection set after the store awaits; the
        // sender may have connected or dropped in the meantime.
        let targets = self
            .registry
            .connections_for_user(&message.sender.user_id)
            .await;
        if targets.is_empty() {
            tracing::debug!(
                "Sender '{}' has no live connections for read receipt",
                message.sender.user_id.as_str()
            );
            return;
        }

        let payload = OutboundEvent::MessageSeen {
            message_id: message_id.into_string(),
            user_id: reader_id.into_string(),
        }
        .to_json();
        if let Err(e) = self.pusher.broadcast(targets, &payload).await {
            tracing::warn!("Failed to push read receipt: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, DeliveryStatus, MessageContent, NewMessage, RoomId};
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

    async fn persist_message(store: &InMemoryChatStore, sender: &str) -> MessageId {
        let stored = store
            .insert_message(NewMessage {
                room_id: room("room-9"),
                sender_id: user(sender),
                content: MessageContent::new("hi".to_string()).unwrap(),
                file_url: None,
                file_type: None,
            })
            .await
            .unwrap();
        store
            .insert_delivery_statuses(vec![
                DeliveryStatus::delivered(stored.id.clone(), user(sender), stored.created_at),
                DeliveryStatus::pending(stored.id.clone(), user("user-2")),
            ])
            .await
            .unwrap();
        stored.id
    }

    #[tokio::test]
    async fn test_receipt_reaches_both_sender_connections_and_nobody_else() {
        // given: the sender is online on two connections, the reader on one
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let store = Arc::new(InMemoryChatStore::new());

        let sender_tab1 = ConnectionId::generate();
        let sender_tab2 = ConnectionId::generate();
        let reader_conn = ConnectionId::generate();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        for (conn, tx) in [(sender_tab1, tx1), (sender_tab2, tx2), (reader_conn, tx3)] {
            registry.register(conn).await;
            pusher.register_connection(conn, tx).await;
        }
        registry.authenticate(sender_tab1, user("user-1")).await;
        registry.authenticate(sender_tab2, user("user-1")).await;
        registry.authenticate(reader_conn, user("user-2")).await;

        let message_id = persist_message(&store, "user-1").await;
        let usecase = MarkSeenUseCase::new(
            registry,
            store.clone(),
            pusher,
            Arc::new(FixedClock::new(1700000000555)),
        );

        // when: the reader marks the message seen
        usecase.execute(message_id.clone(), user("user-2")).await;

        // then: both sender connections got the receipt
        for rx in [&mut rx1, &mut rx2] {
            let event = rx.try_recv().unwrap();
            assert!(event.contains(r#""type":"message_seen""#));
            assert!(event.contains(&format!(r#""messageId":"{}""#, message_id.as_str())));
            assert!(event.contains(r#""userId":"user-2""#));
        }
        // the reader got nothing
        assert!(rx3.try_recv().is_err());
        // and the read timestamp was recorded
        let status = store.delivery(&message_id, &user("user-2")).await.unwrap();
        assert_eq!(status.read_at, Some(Timestamp::new(1700000000555)));
    }

    #[tokio::test]
    async fn test_receipt_for_unknown_message_is_absorbed() {
        // given:
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let store = Arc::new(InMemoryChatStore::new());
        let usecase = MarkSeenUseCase::new(
            registry,
            store,
            pusher,
            Arc::new(FixedClock::new(1)),
        );

        // when / then: no panic, nothing emitted
        usecase.execute(MessageId::generate(), user("user-2")).await;
    }

    #[tokio::test]
    async fn test_receipt_with_offline_sender_updates_store_only() {
        // given: the sender has no live connections
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let store = Arc::new(InMemoryChatStore::new());
        let message_id = persist_message(&store, "user-1").await;
        let usecase = MarkSeenUseCase::new(
            registry,
            store.clone(),
            pusher,
            Arc::new(FixedClock::new(42)),
        );

        // when:
        usecase.execute(message_id.clone(), user("user-2")).await;

        // then: the read timestamp is recorded anyway
        let status = store.delivery(&message_id, &user("user-2")).await.unwrap();
        assert_eq!(status.read_at, Some(Timestamp::new(42)));
    }
}
