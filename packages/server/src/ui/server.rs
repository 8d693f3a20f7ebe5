//! Server execution logic.

use std::sync::Arc;
use std::time::Instant;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::infrastructure::registry::ConnectionRegistry;
use crate::usecase::{
    ConnectUseCase, DisconnectUseCase, JoinRoomUseCase, MarkSeenUseCase, SendMessageUseCase,
    TypingUseCase,
};

use super::{
    handler::{http::health_check, websocket::websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// The chat relay server.
///
/// Encapsulates the wired use cases and runs the HTTP/WebSocket surface.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_usecase,
///     disconnect_usecase,
///     join_room_usecase,
///     send_message_usecase,
///     mark_seen_usecase,
///     typing_usecase,
///     registry,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    connect_usecase: Arc<ConnectUseCase>,
    disconnect_usecase: Arc<DisconnectUseCase>,
    join_room_usecase: Arc<JoinRoomUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    mark_seen_usecase: Arc<MarkSeenUseCase>,
    typing_usecase: Arc<TypingUseCase>,
    registry: Arc<ConnectionRegistry>,
}

impl Server {
    pub fn new(
        connect_usecase: Arc<ConnectUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        mark_seen_usecase: Arc<MarkSeenUseCase>,
        typing_usecase: Arc<TypingUseCase>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            connect_usecase,
            disconnect_usecase,
            join_room_usecase,
            send_message_usecase,
            mark_seen_usecase,
            typing_usecase,
            registry,
        }
    }

    /// Run the chat relay server.
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified
    /// address or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            connect_usecase: self.connect_usecase,
            disconnect_usecase: self.disconnect_usecase,
            join_room_usecase: self.join_room_usecase,
            send_message_usecase: self.send_message_usecase,
            mark_seen_usecase: self.mark_seen_usecase,
            typing_usecase: self.typing_usecase,
            registry: self.registry,
            started_at: Instant::now(),
        });

        let app = Router::new()
            .route("/ws", get(websocket_handler))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
