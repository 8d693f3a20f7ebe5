//! Persistence seam consumed by the relay.
//!
//! The relay never talks to a concrete database; it depends on this trait
//! and lets the infrastructure layer provide the implementation. The store
//! is the authority for durable state (messages, presence, delivery
//! records) and handles its own concurrency control.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{DeliveryStatus, NewMessage, PresenceState, StoredMessage, TypingState};
use super::error::StoreError;
use super::value_object::{ConnectionId, MessageId, RoomId, Timestamp, UserId};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist a new chat message and return the stored record, hydrated
    /// with the sender's denormalized profile.
    async fn insert_message(&self, message: NewMessage) -> Result<StoredMessage, StoreError>;

    /// Fetch the durable participant list for a room.
    ///
    /// Distinct from the live subscription set: this is room membership as
    /// the store knows it, used for delivery bookkeeping.
    async fn get_room_participants(&self, room_id: &RoomId) -> Result<Vec<UserId>, StoreError>;

    /// Upsert a user's online/offline state with a last-seen timestamp.
    async fn upsert_presence(
        &self,
        user_id: &UserId,
        state: PresenceState,
        last_seen: Timestamp,
    ) -> Result<(), StoreError>;

    /// Record which connection currently serves a user.
    async fn insert_socket_connection(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Result<(), StoreError>;

    /// Remove a user's stored connection record.
    async fn delete_socket_connection(&self, user_id: &UserId) -> Result<(), StoreError>;

    /// Upsert an ephemeral typing-state row.
    async fn upsert_typing_status(&self, typing: TypingState) -> Result<(), StoreError>;

    /// Create one delivery record per room participant for a new message.
    async fn insert_delivery_statuses(
        &self,
        statuses: Vec<DeliveryStatus>,
    ) -> Result<(), StoreError>;

    /// Set the read timestamp on a (message, recipient) delivery record.
    async fn update_delivery_status(
        &self,
        message_id: &MessageId,
        recipient: &UserId,
        read_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Fetch a stored message by id.
    async fn get_message_by_id(&self, message_id: &MessageId) -> Result<StoredMessage, StoreError>;
}
