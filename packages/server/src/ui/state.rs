//! Shared application state for the HTTP/WebSocket handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::infrastructure::registry::ConnectionRegistry;
use crate::usecase::{
    ConnectUseCase, DisconnectUseCase, JoinRoomUseCase, MarkSeenUseCase, SendMessageUseCase,
    TypingUseCase,
};

/// Shared application state
pub struct AppState {
    pub connect_usecase: Arc<ConnectUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub mark_seen_usecase: Arc<MarkSeenUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    /// Live connection state, read by the health endpoint.
    pub registry: Arc<ConnectionRegistry>,
    /// Process start time, for uptime reporting.
    pub started_at: Instant,
}
