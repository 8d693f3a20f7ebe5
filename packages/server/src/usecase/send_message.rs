//! Message relay: persist, fan out, and track delivery.

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ChatStore, ConnectionId, DeliveryStatus, MessagePusher, NewMessage, StoredMessage, Timestamp,
};
use crate::infrastructure::dto::websocket::{OutboundEvent, StoredMessageDto};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::usecase::{SendMessageError, log_and_discard};

pub struct SendMessageUseCase {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
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

    /// Relay one chat message.
    ///
    /// Persistence gates the broadcast: nothing is fanned out unless the
    /// store accepted the message, and a rejected message produces exactly
    /// one `message_error` back to the sender. Delivery bookkeeping runs
    /// after the fan-out and never rolls it back.
    pub async fn execute(
        &self,
        sender_connection: ConnectionId,
        message: NewMessage,
    ) -> Result<StoredMessage, SendMessageError> {
        let room_id = message.room_id.clone();
        let sender_id = message.sender_id.clone();

        let stored = match self.store.insert_message(message).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(
                    "Failed to persist message from '{}' in room '{}': {}",
                    sender_id.as_str(),
                    room_id.as_str(),
                    e
                );
                let payload = OutboundEvent::MessageError {
                    error: "failed to persist message".to_string(),
                }
                .to_json();
                if let Err(push_err) = self.pusher.push_to(&sender_connection, &payload).await {
                    tracing::warn!(
                        "Failed to report persist error to '{}': {}",
                        sender_connection,
                        push_err
                    );
                }
                return Err(SendMessageError::PersistFailed(e.to_string()));
            }
        };

        // Fan out to the live subscription set, sender included. Membership
        // is re-read after the persistence await, so connections that left
        // mid-flight are not targeted.
        let targets = self.registry.room_members(&room_id).await;
        let payload = OutboundEvent::MessageReceived(StoredMessageDto::from(&stored)).to_json();
        if let Err(e) = self.pusher.broadcast(targets, &payload).await {
            tracing::warn!("Failed to broadcast message '{}': {}", stored.id.as_str(), e);
        }

        // Delivery bookkeeping against the durable participant list. The
        // sender's own record is delivered immediately; everyone else's
        // starts unset.
        match self.store.get_room_participants(&room_id).await {
            Ok(participants) => {
                let now = Timestamp::new(self.clock.now_millis());
                let statuses: Vec<DeliveryStatus> = participants
                    .into_iter()
                    .map(|participant| {
                        if participant == sender_id {
                            DeliveryStatus::delivered(stored.id.clone(), participant, now)
                        } else {
                            DeliveryStatus::pending(stored.id.clone(), participant)
                        }
                    })
                    .collect();
                log_and_discard(
                    "delivery status insert",
                    self.store.insert_delivery_statuses(statuses).await,
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch participants for room '{}': {}",
                    room_id.as_str(),
                    e
                );
            }
        }

        Ok(stored)
    }
}
