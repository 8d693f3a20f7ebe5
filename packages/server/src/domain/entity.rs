//! Domain entities: messages, delivery records, and presence/typing state.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageContent, MessageId, RoomId, Timestamp, UserId};

/// Denormalized sender profile attached to a stored message by the
/// persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub user_id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// A chat message as submitted by a client, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
}

/// A persisted chat message, hydrated with the sender's profile.
///
/// Immutable once stored; delivery/read state lives in side records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender: SenderProfile,
    pub content: MessageContent,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub created_at: Timestamp,
}

/// Per (message, recipient) delivery tracking record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    pub message_id: MessageId,
    pub recipient: UserId,
    pub delivered_at: Option<Timestamp>,
    pub read_at: Option<Timestamp>,
}

impl DeliveryStatus {
    /// Record for a recipient that has not acknowledged the message yet.
    pub fn pending(message_id: MessageId, recipient: UserId) -> Self {
        Self {
            message_id,
            recipient,
            delivered_at: None,
            read_at: None,
        }
    }

    /// Record for the sender's own copy; self-delivery is instantaneous.
    pub fn delivered(message_id: MessageId, recipient: UserId, at: Timestamp) -> Self {
        Self {
            message_id,
            recipient,
            delivered_at: Some(at),
            read_at: None,
        }
    }
}

/// Online/offline state written to the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Online,
    Offline,
}

/// Ephemeral per (room, user) typing flag with a last-updated timestamp.
///
/// Stored for observability only; never reconciled on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingState {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub is_typing: bool,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_delivery_status_has_no_timestamps() {
        // given:
        let message_id = MessageId::generate();
        let recipient = UserId::new("user-2".to_string()).unwrap();

        // when:
        let status = DeliveryStatus::pending(message_id.clone(), recipient.clone());

        // then:
        assert_eq!(status.message_id, message_id);
        assert_eq!(status.recipient, recipient);
        assert!(status.delivered_at.is_none());
        assert!(status.read_at.is_none());
    }

    #[test]
    fn test_delivered_status_sets_delivered_timestamp_only() {
        // given:
        let message_id = MessageId::generate();
        let recipient = UserId::new("user-1".to_string()).unwrap();
        let at = Timestamp::new(1700000000000);

        // when:
        let status = DeliveryStatus::delivered(message_id, recipient, at);

        // then:
        assert_eq!(status.delivered_at, Some(at));
        assert!(status.read_at.is_none());
    }
}
