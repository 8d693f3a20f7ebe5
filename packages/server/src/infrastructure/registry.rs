//! Live connection registry: the single owner of all shared mutable relay
//! state.
//!
//! Three views over the same population, mutated together under one lock:
//!
//! - the connection table (one entry per live transport),
//! - the active session set (identity-or-connection-id keyed, whose size is
//!   the `activeUsers` count),
//! - the room and identity broadcast groups.
//!
//! Constructed fresh per server (and per test); nothing here is global.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, RoomId, UserId};

/// Session-set key: a connection is keyed by its own id until it
/// authenticates, then by the identity it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SessionKey {
    Anonymous(ConnectionId),
    User(UserId),
}

#[derive(Default)]
struct ConnectionEntry {
    identity: Option<UserId>,
    rooms: HashSet<RoomId>,
}

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    sessions: HashMap<SessionKey, ConnectionId>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
    identity_groups: HashMap<UserId, HashSet<ConnectionId>>,
}

/// Outcome of removing a connection from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Whether the connection was still registered. False on a repeated
    /// disconnect; the caller must treat that as a no-op.
    pub was_registered: bool,
    /// Identity found in the session slot, when the slot was an
    /// authenticated one. Drives the offline presence cleanup.
    pub identity: Option<UserId>,
}

pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Register a new anonymous session.
    pub async fn register(&self, connection_id: ConnectionId) {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        inner.connections.insert(connection_id, ConnectionEntry::default());
        inner
            .sessions
            .insert(SessionKey::Anonymous(connection_id), connection_id);
    }

    /// Re-key a session under the identity it authenticated as, and join
    /// the connection to the identity's broadcast group so other components
    /// can target the user directly.
    ///
    /// Returns false when the connection is no longer registered (the
    /// transport dropped while the event was in flight).
    pub async fn authenticate(&self, connection_id: ConnectionId, user_id: UserId) -> bool {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let Some(entry) = inner.connections.get_mut(&connection_id) else {
            return false;
        };
        if let Some(previous) = entry.identity.replace(user_id.clone())
            && previous != user_id
            && let Some(group) = inner.identity_groups.get_mut(&previous)
        {
            group.remove(&connection_id);
            if group.is_empty() {
                inner.identity_groups.remove(&previous);
            }
        }
        inner.sessions.retain(|_, conn| *conn != connection_id);
        inner
            .sessions
            .insert(SessionKey::User(user_id.clone()), connection_id);
        inner
            .identity_groups
            .entry(user_id)
            .or_default()
            .insert(connection_id);
        true
    }

    /// Subscribe a connection to a room's broadcast group.
    ///
    /// Returns false when the connection is no longer registered.
    pub async fn join_room(&self, connection_id: ConnectionId, room_id: RoomId) -> bool {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let Some(entry) = inner.connections.get_mut(&connection_id) else {
            return false;
        };
        entry.rooms.insert(room_id.clone());
        inner.rooms.entry(room_id).or_default().insert(connection_id);
        true
    }

    /// Remove a connection and every trace of it: room subscriptions,
    /// identity group membership, and its session slot. Idempotent.
    pub async fn remove(&self, connection_id: ConnectionId) -> Removal {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let Some(entry) = inner.connections.remove(&connection_id) else {
            return Removal {
                was_registered: false,
                identity: None,
            };
        };

        for room_id in &entry.rooms {
            if let Some(members) = inner.rooms.get_mut(room_id) {
                members.remove(&connection_id);
                if members.is_empty() {
                    inner.rooms.remove(room_id);
                }
            }
        }

        if let Some(user_id) = &entry.identity
            && let Some(group) = inner.identity_groups.get_mut(user_id)
        {
            group.remove(&connection_id);
            if group.is_empty() {
                inner.identity_groups.remove(user_id);
            }
        }

        // Reverse lookup: the session slot holding this connection, if any.
        // A later login under the same identity may have taken the slot, in
        // which case this connection no longer owns one.
        let owned_key = inner
            .sessions
            .iter()
            .find(|(_, conn)| **conn == connection_id)
            .map(|(key, _)| key.clone());
        let identity = match owned_key {
            Some(key) => {
                inner.sessions.remove(&key);
                match key {
                    SessionKey::User(user_id) => Some(user_id),
                    SessionKey::Anonymous(_) => None,
                }
            }
            None => None,
        };

        Removal {
            was_registered: true,
            identity,
        }
    }

    /// Size of the active session set; the `activeUsers` count.
    pub async fn active_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    /// Number of live transports, regardless of authentication.
    pub async fn connection_count(&self) -> usize {
        self.inner.lock().await.connections.len()
    }

    /// Every live connection; targets for a global broadcast.
    pub async fn all_connections(&self) -> Vec<ConnectionId> {
        self.inner.lock().await.connections.keys().copied().collect()
    }

    /// Live connections subscribed to a room.
    pub async fn room_members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every live connection currently carrying an identity.
    pub async fn connections_for_user(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .identity_groups
            .get(user_id)
            .map(|group| group.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
