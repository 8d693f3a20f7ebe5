//! Domain layer: value objects, entities, and the trait seams the relay
//! depends on.

pub mod entity;
mod error;
mod pusher;
mod store;
pub mod value_object;

pub use entity::{
    DeliveryStatus, NewMessage, PresenceState, SenderProfile, StoredMessage, TypingState,
};
pub use error::{StoreError, ValidationError};
pub use pusher::{MessagePushError, MessagePusher, PusherChannel};
pub use store::ChatStore;
#[cfg(test)]
pub use store::MockChatStore;
pub use value_object::{ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId};
