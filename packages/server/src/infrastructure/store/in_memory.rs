//! In-memory ChatStore implementation.
//!
//! Backs local runs and tests. A production deployment substitutes a
//! database-backed implementation of the same trait; nothing above the
//! `ChatStore` seam changes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parlor_shared::time::{Clock, SystemClock};

use crate::domain::{
    ChatStore, ConnectionId, DeliveryStatus, MessageId, NewMessage, PresenceState, RoomId,
    SenderProfile, StoreError, StoredMessage, Timestamp, TypingState, UserId,
};

#[derive(Default)]
struct StoreInner {
    messages: HashMap<MessageId, StoredMessage>,
    participants: HashMap<RoomId, Vec<UserId>>,
    profiles: HashMap<UserId, SenderProfile>,
    presence: HashMap<UserId, (PresenceState, Timestamp)>,
    socket_connections: HashMap<UserId, ConnectionId>,
    typing: HashMap<(RoomId, UserId), TypingState>,
    deliveries: HashMap<(MessageId, UserId), DeliveryStatus>,
}

pub struct InMemoryChatStore {
    inner: Mutex<StoreInner>,
    clock: Arc<dyn Clock>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            clock,
        }
    }

    /// Seed the durable participant list for a room.
    pub async fn seed_participants(&self, room_id: RoomId, participants: Vec<UserId>) {
        let mut inner = self.inner.lock().await;
        inner.participants.insert(room_id, participants);
    }

    /// Seed a user profile used to hydrate stored messages.
    pub async fn seed_profile(&self, profile: SenderProfile) {
        let mut inner = self.inner.lock().await;
        inner.profiles.insert(profile.user_id.clone(), profile);
    }

    /// Delivery record for a (message, recipient) pair, if any.
    pub async fn delivery(
        &self,
        message_id: &MessageId,
        recipient: &UserId,
    ) -> Option<DeliveryStatus> {
        let inner = self.inner.lock().await;
        inner
            .deliveries
            .get(&(message_id.clone(), recipient.clone()))
            .cloned()
    }

    /// Presence row for a user, if any.
    pub async fn presence_of(&self, user_id: &UserId) -> Option<(PresenceState, Timestamp)> {
        let inner = self.inner.lock().await;
        inner.presence.get(user_id).copied()
    }

    /// Stored connection record for a user, if any.
    pub async fn socket_connection_of(&self, user_id: &UserId) -> Option<ConnectionId> {
        let inner = self.inner.lock().await;
        inner.socket_connections.get(user_id).copied()
    }

    /// Typing row for a (room, user) pair, if any.
    pub async fn typing_of(&self, room_id: &RoomId, user_id: &UserId) -> Option<TypingState> {
        let inner = self.inner.lock().await;
        inner
            .typing
            .get(&(room_id.clone(), user_id.clone()))
            .cloned()
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn insert_message(&self, message: NewMessage) -> Result<StoredMessage, StoreError> {
        let mut inner = self.inner.lock().await;
        let sender = inner
            .profiles
            .get(&message.sender_id)
            .cloned()
            .unwrap_or_else(|| SenderProfile {
                user_id: message.sender_id.clone(),
                username: message.sender_id.as_str().to_string(),
                avatar_url: None,
            });
        let stored = StoredMessage {
            id: MessageId::generate(),
            room_id: message.room_id,
            sender,
            content: message.content,
            file_url: message.file_url,
            file_type: message.file_type,
            created_at: Timestamp::new(self.clock.now_millis()),
        };
        inner.messages.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_room_participants(&self, room_id: &RoomId) -> Result<Vec<UserId>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.participants.get(room_id).cloned().unwrap_or_default())
    }

    async fn upsert_presence(
        &self,
        user_id: &UserId,
        state: PresenceState,
        last_seen: Timestamp,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.presence.insert(user_id.clone(), (state, last_seen));
        Ok(())
    }

    async fn insert_socket_connection(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .socket_connections
            .insert(user_id.clone(), *connection_id);
        Ok(())
    }

    async fn delete_socket_connection(&self, user_id: &UserId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.socket_connections.remove(user_id);
        Ok(())
    }

    async fn upsert_typing_status(&self, typing: TypingState) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .typing
            .insert((typing.room_id.clone(), typing.user_id.clone()), typing);
        Ok(())
    }

    async fn insert_delivery_statuses(
        &self,
        statuses: Vec<DeliveryStatus>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        for status in statuses {
            inner
                .deliveries
                .insert((status.message_id.clone(), status.recipient.clone()), status);
        }
        Ok(())
    }

    async fn update_delivery_status(
        &self,
        message_id: &MessageId,
        recipient: &UserId,
        read_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner
            .deliveries
            .get_mut(&(message_id.clone(), recipient.clone()))
        {
            Some(status) => {
                status.read_at = Some(read_at);
                Ok(())
            }
            None => Err(StoreError::NotFound("delivery status")),
        }
    }

    async fn get_message_by_id(&self, message_id: &MessageId) -> Result<StoredMessage, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .messages
            .get(message_id)
            .cloned()
            .ok_or(StoreError::NotFound("message"))
    }
}
