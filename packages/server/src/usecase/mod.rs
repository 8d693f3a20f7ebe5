//! Application use cases wiring the registry, store, and pusher together.
//!
//! Each use case owns `Arc` handles to the shared state and the trait
//! seams, and is the only place its piece of relay behavior lives; the
//! transport layer routes events here and does nothing else.

mod connect;
mod disconnect;
mod error;
mod join_room;
mod mark_seen;
mod presence;
mod send_message;
mod typing;

pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::SendMessageError;
pub use join_room::JoinRoomUseCase;
pub use mark_seen::MarkSeenUseCase;
pub use presence::PresencePublisher;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;

use crate::domain::StoreError;

/// Record the outcome of a best-effort store write.
///
/// Secondary bookkeeping (presence, typing, delivery tracking) must never
/// fail the operation that triggered it. The result lands here, gets
/// logged, and is dropped, which keeps the soft path visibly separate from
/// the hard failure path in message send.
pub(crate) fn log_and_discard(op: &str, result: Result<(), StoreError>) {
    if let Err(e) = result {
        tracing::warn!("Best-effort {} failed: {}", op, e);
    }
}
