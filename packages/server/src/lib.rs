//! Real-time chat relay / presence server.
//!
//! Tracks connected WebSocket clients, binds them to authenticated
//! identities, relays chat messages to room subscribers, tracks typing and
//! delivery/read state, and broadcasts a live count of active connections.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
