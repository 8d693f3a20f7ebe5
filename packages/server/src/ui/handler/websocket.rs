//! WebSocket connection handlers: the transport adapter.
//!
//! Owns the physical connection lifecycle and event (de)serialization, and
//! routes inbound events to the use cases. No relay behavior lives here.
//!
//! Liveness is delegated to the WebSocket protocol's ping/pong; a client
//! that goes silent is torn down by the transport, which lands in the same
//! disconnect path as a clean close.
//!
//! Identity claims in `authenticate` and `join_chat` are not verified
//! here: the deployment fronts this socket with its own auth layer, and
//! the relay trusts what arrives.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessageContent, MessageId, NewMessage, RoomId, UserId},
    infrastructure::dto::websocket::InboundEvent,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives events from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This is the outbound half of a connection: everything the use cases
/// address to it funnels through this one channel.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let connection_id = state.connect_usecase.connect(tx).await;
    tracing::info!("Connection '{}' established", connection_id);

    let mut push_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch_event(&recv_state, connection_id, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => push_task.abort(),
        _ = &mut push_task => recv_task.abort(),
    };

    state.disconnect_usecase.disconnect(connection_id).await;
    tracing::info!("Connection '{}' closed", connection_id);
}

/// Parse one inbound frame and route it to the owning use case.
///
/// Malformed frames and invalid field values are protocol errors: logged
/// and dropped, never fatal to the connection.
async fn dispatch_event(state: &Arc<AppState>, connection_id: ConnectionId, text: &str) {
    let event = match serde_json::from_str::<InboundEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping malformed event from '{}': {}", connection_id, e);
            return;
        }
    };

    match event {
        InboundEvent::Authenticate { user_id } => match UserId::try_from(user_id) {
            Ok(user_id) => {
                state
                    .connect_usecase
                    .authenticate(connection_id, user_id)
                    .await;
            }
            Err(e) => {
                tracing::warn!("Dropping authenticate from '{}': {}", connection_id, e);
            }
        },
        InboundEvent::JoinChat { chat_id, user_id } => {
            match (RoomId::try_from(chat_id), UserId::try_from(user_id)) {
                (Ok(room_id), Ok(user_id)) => {
                    state
                        .join_room_usecase
                        .join(connection_id, room_id, user_id)
                        .await;
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("Dropping join_chat from '{}': {}", connection_id, e);
                }
            }
        }
        InboundEvent::SendMessage {
            chat_id,
            sender_id,
            content,
            file_url,
            file_type,
        } => {
            let parsed = RoomId::try_from(chat_id).and_then(|room_id| {
                Ok((
                    room_id,
                    UserId::try_from(sender_id)?,
                    MessageContent::try_from(content)?,
                ))
            });
            match parsed {
                Ok((room_id, sender_id, content)) => {
                    let message = NewMessage {
                        room_id,
                        sender_id,
                        content,
                        file_url,
                        file_type,
                    };
                    if let Err(e) = state
                        .send_message_usecase
                        .execute(connection_id, message)
                        .await
                    {
                        tracing::warn!(
                            "Message from '{}' was not relayed: {}",
                            connection_id,
                            e
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!("Dropping send_message from '{}': {}", connection_id, e);
                }
            }
        }
        InboundEvent::TypingStart {
            chat_id,
            user_id,
            username,
        } => match (RoomId::try_from(chat_id), UserId::try_from(user_id)) {
            (Ok(room_id), Ok(user_id)) => {
                state
                    .typing_usecase
                    .typing_start(connection_id, room_id, user_id, username)
                    .await;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Dropping typing_start from '{}': {}", connection_id, e);
            }
        },
        InboundEvent::TypingEnd { chat_id, user_id } => {
            match (RoomId::try_from(chat_id), UserId::try_from(user_id)) {
                (Ok(room_id), Ok(user_id)) => {
                    state
                        .typing_usecase
                        .typing_end(connection_id, room_id, user_id)
                        .await;
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("Dropping typing_end from '{}': {}", connection_id, e);
                }
            }
        }
        InboundEvent::MarkSeen {
            message_id,
            user_id,
        } => {
            match (MessageId::try_from(message_id), UserId::try_from(user_id)) {
                (Ok(message_id), Ok(user_id)) => {
                    state.mark_seen_usecase.execute(message_id, user_id).await;
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("Dropping mark_seen from '{}': {}", connection_id, e);
                }
            }
        }
    }
}
