//! Parlor chat relay server.
//!
//! Tracks connected clients, relays chat messages to room subscribers, and
//! broadcasts presence. Runs against the in-memory store; a deployment
//! swaps in a database-backed `ChatStore` at this wiring point.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use parlor_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::ConnectionRegistry,
        store::InMemoryChatStore,
    },
    ui::Server,
    usecase::{
        ConnectUseCase, DisconnectUseCase, JoinRoomUseCase, MarkSeenUseCase, PresencePublisher,
        SendMessageUseCase, TypingUseCase,
    },
};
use parlor_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "parlor-server")]
#[command(about = "Real-time chat relay and presence server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Clock + Store
    // 2. Pusher + Registry
    // 3. Presence publisher
    // 4. UseCases
    // 5. Server

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(InMemoryChatStore::with_clock(clock.clone()));

    let pusher = Arc::new(WebSocketMessagePusher::new());
    let registry = Arc::new(ConnectionRegistry::new());

    let presence = Arc::new(PresencePublisher::new(registry.clone(), pusher.clone()));

    let connect_usecase = Arc::new(ConnectUseCase::new(
        registry.clone(),
        store.clone(),
        pusher.clone(),
        presence.clone(),
        clock.clone(),
    ));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(
        registry.clone(),
        store.clone(),
        pusher.clone(),
        presence.clone(),
        clock.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(registry.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        store.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let mark_seen_usecase = Arc::new(MarkSeenUseCase::new(
        registry.clone(),
        store.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let typing_usecase = Arc::new(TypingUseCase::new(
        registry.clone(),
        store.clone(),
        pusher.clone(),
        clock.clone(),
    ));

    let server = Server::new(
        connect_usecase,
        disconnect_usecase,
        join_room_usecase,
        send_message_usecase,
        mark_seen_usecase,
        typing_usecase,
        registry,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
