//! WebSocket-backed MessagePusher implementation.
//!
//! The transport layer accepts the WebSocket connection and creates the
//! per-connection channel; this implementation holds the sender half of
//! each channel and performs the actual pushes. Splitting it this way keeps
//! "accepting a socket" and "delivering an event" in separate layers.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// MessagePusher over per-connection mpsc channels.
pub struct WebSocketMessagePusher {
    /// Push channel for every live connection.
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to pusher", connection_id);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!("Connection '{}' unregistered from pusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;

        if let Some(sender) = connections.get(connection_id) {
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed event to connection '{}'", connection_id);
            Ok(())
        } else {
            Err(MessagePushError::ConnectionNotFound(
                connection_id.to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(sender) = connections.get(&target) {
                // Partial failure is tolerated during fan-out
                if let Err(e) = sender.send(content.to_string()) {
                    tracing::warn!("Failed to push event to connection '{}': {}", target, e);
                } else {
                    tracing::debug!("Broadcast event to connection '{}'", target);
                }
            } else {
                tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_push_to_success() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_connection(connection_id, tx).await;

        // when:
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_fails() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let connection_id = ConnectionId::generate();

        // when:
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then:
        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_targets() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();
        pusher.register_connection(first, tx1).await;
        pusher.register_connection(second, tx2).await;

        // when:
        let result = pusher.broadcast(vec![first, second], "Broadcast message").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("Broadcast message".to_string()));
        assert_eq!(rx2.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_missing_targets() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let known = ConnectionId::generate();
        let unknown = ConnectionId::generate();
        pusher.register_connection(known, tx).await;

        // when:
        let result = pusher.broadcast(vec![known, unknown], "Broadcast message").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_with_no_targets_is_ok() {
        // given:
        let pusher = WebSocketMessagePusher::new();

        // when:
        let result = pusher.broadcast(vec![], "Message").await;

        // then:
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unregistered_connection_is_no_longer_reachable() {
        // given:
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        pusher.register_connection(connection_id, tx).await;

        // when:
        pusher.unregister_connection(&connection_id).await;
        let result = pusher.push_to(&connection_id, "Hello").await;

        // then:
        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }
}
