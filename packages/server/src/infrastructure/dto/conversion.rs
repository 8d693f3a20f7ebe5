//! Conversion logic between domain entities and wire DTOs.

use parlor_shared::time::millis_to_rfc3339;

use crate::domain::StoredMessage;
use crate::infrastructure::dto::websocket::StoredMessageDto;

impl From<&StoredMessage> for StoredMessageDto {
    fn from(message: &StoredMessage) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            chat_id: message.room_id.as_str().to_string(),
            sender_id: message.sender.user_id.as_str().to_string(),
            sender_name: message.sender.username.clone(),
            sender_avatar_url: message.sender.avatar_url.clone(),
            content: message.content.as_str().to_string(),
            file_url: message.file_url.clone(),
            file_type: message.file_type.clone(),
            created_at: millis_to_rfc3339(message.created_at.value()),
        }
    }
}
