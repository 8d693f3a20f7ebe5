//! WebSocket wire events.
//!
//! One JSON object per event, tagged by `type`, with camelCase fields.
//! Event names are part of the client contract and must not change.

use serde::{Deserialize, Serialize};

/// Events a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Bind a user identity to this connection.
    #[serde(rename_all = "camelCase")]
    Authenticate { user_id: String },

    /// Join a room's broadcast group.
    #[serde(rename_all = "camelCase")]
    JoinChat { chat_id: String, user_id: String },

    /// Submit a chat message.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        chat_id: String,
        sender_id: String,
        content: String,
        #[serde(default)]
        file_url: Option<String>,
        #[serde(default)]
        file_type: Option<String>,
    },

    /// Ephemeral typing-start signal.
    #[serde(rename_all = "camelCase")]
    TypingStart {
        chat_id: String,
        user_id: String,
        #[serde(default)]
        username: Option<String>,
    },

    /// Ephemeral typing-end signal.
    #[serde(rename_all = "camelCase")]
    TypingEnd { chat_id: String, user_id: String },

    /// Read receipt for a message.
    #[serde(rename_all = "camelCase")]
    MarkSeen { message_id: String, user_id: String },
}

/// A stored message as it goes out on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessageDto {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub sender_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar_url: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub created_at: String,
}

/// Events the relay pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    /// Global live-connection count; visible to every connection.
    #[serde(rename = "activeUsers")]
    ActiveUsers { count: usize },

    /// A persisted message, broadcast to a room.
    #[serde(rename = "message_received")]
    MessageReceived(StoredMessageDto),

    /// Persist failure, targeted to the sender only.
    #[serde(rename = "message_error")]
    MessageError { error: String },

    /// Typing signal, broadcast to a room excluding the typist.
    #[serde(rename = "user_typing", rename_all = "camelCase")]
    UserTyping {
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },

    /// Typing-stop signal, broadcast to a room excluding the typist.
    #[serde(rename = "user_stopped_typing", rename_all = "camelCase")]
    UserStoppedTyping { user_id: String },

    /// Read receipt, targeted to the original sender's connections.
    #[serde(rename = "message_seen", rename_all = "camelCase")]
    MessageSeen { message_id: String, user_id: String },
}

impl OutboundEvent {
    /// Serialize for the wire. Outbound events are plain data and always
    /// serialize.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("outbound event serializes to JSON")
    }
}
