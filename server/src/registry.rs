//! Connection registry for the chat relay
//!
//! Tracks every open connection together with the channel used to push
//! events to it, and the display name once the connection has joined.
//! A name is present exactly between a successful [`ConnectionRegistry::register`]
//! and the matching [`ConnectionRegistry::unregister`].
//!
//! The registry is owned by the relay task and is never shared, so it
//! carries no locks.

use log::info;
use shared::ServerEvent;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;

/// Opaque identifier assigned to each WebSocket connection on upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {0} is not open")]
    UnknownConnection(ConnectionId),
    #[error("connection {id} already joined as {name:?}")]
    AlreadyNamed { id: ConnectionId, name: String },
}

/// One open connection
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    /// Display name, absent until the join event arrives
    pub name: Option<String>,
    /// Outbound queue drained by the connection's socket task
    pub sender: mpsc::UnboundedSender<ServerEvent>,
    pub opened_at: Instant,
}

impl Connection {
    pub fn new(id: ConnectionId, sender: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            id,
            name: None,
            sender,
            opened_at: Instant::now(),
        }
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a freshly upgraded, still anonymous connection
    pub fn open(&mut self, id: ConnectionId, sender: mpsc::UnboundedSender<ServerEvent>) {
        info!("Connection {} opened", id);
        self.connections.insert(id, Connection::new(id, sender));
    }

    /// Stores the display name for a connection.
    ///
    /// The name is set once; a connection that already has a name keeps it
    /// and the call reports [`RegistryError::AlreadyNamed`].
    pub fn register(&mut self, id: ConnectionId, name: String) -> Result<(), RegistryError> {
        let connection = self
            .connections
            .get_mut(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;

        if let Some(existing) = &connection.name {
            return Err(RegistryError::AlreadyNamed {
                id,
                name: existing.clone(),
            });
        }

        info!("Connection {} joined as {:?}", id, name);
        connection.name = Some(name);
        Ok(())
    }

    pub fn lookup(&self, id: ConnectionId) -> Option<&str> {
        self.connections
            .get(&id)
            .and_then(|connection| connection.name.as_deref())
    }

    /// Removes and returns the name of a connection.
    ///
    /// Returns `None` for anonymous connections and on every call after the
    /// first, so duplicate close signals cannot produce a second departure.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<String> {
        self.connections
            .get_mut(&id)
            .and_then(|connection| connection.name.take())
    }

    /// Forgets a connection entirely. Returns false if it was already gone.
    pub fn close(&mut self, id: ConnectionId) -> bool {
        if let Some(connection) = self.connections.remove(&id) {
            info!(
                "Connection {} closed after {:.1}s",
                id,
                connection.opened_at.elapsed().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    /// Outbound senders of every open connection other than `origin`
    pub fn recipients_except(
        &self,
        origin: ConnectionId,
    ) -> Vec<(ConnectionId, mpsc::UnboundedSender<ServerEvent>)> {
        self.connections
            .values()
            .filter(|connection| connection.id != origin)
            .map(|connection| (connection.id, connection.sender.clone()))
            .collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of connections that have completed the join handshake
    pub fn named_count(&self) -> usize {
        self.connections
            .values()
            .filter(|connection| connection.is_named())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(registry: &mut ConnectionRegistry, id: u64) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.open(ConnectionId(id), tx);
        rx
    }

    #[test]
    fn test_registry_creation() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.named_count(), 0);
    }

    #[test]
    fn test_open_connection_is_anonymous() {
        let mut registry = ConnectionRegistry::new();
        let _rx = open(&mut registry, 1);

        assert!(registry.contains(ConnectionId(1)));
        assert_eq!(registry.lookup(ConnectionId(1)), None);
        assert_eq!(registry.named_count(), 0);
    }

    #[test]
    fn test_register_then_lookup() {
        let mut registry = ConnectionRegistry::new();
        let _rx = open(&mut registry, 1);

        assert!(registry.register(ConnectionId(1), "Nova".to_string()).is_ok());
        assert_eq!(registry.lookup(ConnectionId(1)), Some("Nova"));
        assert_eq!(registry.named_count(), 1);
    }

    #[test]
    fn test_register_twice_keeps_first_name() {
        let mut registry = ConnectionRegistry::new();
        let _rx = open(&mut registry, 1);

        registry.register(ConnectionId(1), "Nova".to_string()).unwrap();
        let result = registry.register(ConnectionId(1), "Rin".to_string());

        assert_eq!(
            result,
            Err(RegistryError::AlreadyNamed {
                id: ConnectionId(1),
                name: "Nova".to_string()
            })
        );
        assert_eq!(registry.lookup(ConnectionId(1)), Some("Nova"));
    }

    #[test]
    fn test_register_unknown_connection() {
        let mut registry = ConnectionRegistry::new();
        let result = registry.register(ConnectionId(9), "Ghost".to_string());
        assert_eq!(result, Err(RegistryError::UnknownConnection(ConnectionId(9))));
    }

    #[test]
    fn test_unregister_is_one_shot() {
        let mut registry = ConnectionRegistry::new();
        let _rx = open(&mut registry, 1);
        registry.register(ConnectionId(1), "Nova".to_string()).unwrap();

        assert_eq!(registry.unregister(ConnectionId(1)), Some("Nova".to_string()));
        assert_eq!(registry.lookup(ConnectionId(1)), None);
        assert_eq!(registry.unregister(ConnectionId(1)), None);
    }

    #[test]
    fn test_unregister_anonymous() {
        let mut registry = ConnectionRegistry::new();
        let _rx = open(&mut registry, 1);
        assert_eq!(registry.unregister(ConnectionId(1)), None);
    }

    #[test]
    fn test_close_removes_connection() {
        let mut registry = ConnectionRegistry::new();
        let _rx = open(&mut registry, 1);

        assert!(registry.close(ConnectionId(1)));
        assert!(!registry.contains(ConnectionId(1)));
        assert!(!registry.close(ConnectionId(1)));
    }

    #[test]
    fn test_recipients_exclude_origin() {
        let mut registry = ConnectionRegistry::new();
        let _rx1 = open(&mut registry, 1);
        let _rx2 = open(&mut registry, 2);
        let _rx3 = open(&mut registry, 3);

        let mut ids: Vec<ConnectionId> = registry
            .recipients_except(ConnectionId(2))
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        ids.sort();

        assert_eq!(ids, vec![ConnectionId(1), ConnectionId(3)]);
    }

    #[test]
    fn test_recipients_include_anonymous_connections() {
        let mut registry = ConnectionRegistry::new();
        let _rx1 = open(&mut registry, 1);
        let _rx2 = open(&mut registry, 2);
        registry.register(ConnectionId(1), "Nova".to_string()).unwrap();

        let recipients = registry.recipients_except(ConnectionId(1));
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].0, ConnectionId(2));
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "conn-7");
    }
}
