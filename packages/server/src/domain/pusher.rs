//! Push-channel abstraction for delivering outbound events to connections.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::value_object::ConnectionId;

/// Channel used to push serialized events to one connection.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Outbound delivery seam between the use cases and the transport.
///
/// `push_to` is the hard path (the caller cares whether the single target
/// got the event); `broadcast` tolerates partial failure, since a recipient
/// dropping mid-fan-out is normal churn, not an error.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a connection's push channel.
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Unregister a connection's push channel.
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// Push an event to a single connection.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Push an event to every target connection, skipping dead ones.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
