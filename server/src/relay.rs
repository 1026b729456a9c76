//! Broadcast relay
//!
//! Socket tasks never touch the registry. They report what happens on their
//! connection as [`RelayMessage`]s over one channel, and a single relay task
//! applies them in arrival order. Every event a connection sends is forwarded
//! to all other open connections and never back to its origin.

use crate::registry::{ConnectionId, ConnectionRegistry, RegistryError};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ServerEvent, TypingSignal};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Messages sent from connection tasks to the relay loop
#[derive(Debug)]
pub enum RelayMessage {
    Opened {
        id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerEvent>,
    },
    Received {
        id: ConnectionId,
        event: ClientEvent,
    },
    Closed {
        id: ConnectionId,
    },
}

/// Cloneable entry point used by socket tasks to reach the relay
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::UnboundedSender<RelayMessage>,
    next_id: Arc<AtomicU64>,
}

impl RelayHandle {
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Queues a message for the relay. Fails only once the relay has stopped.
    pub fn send(&self, message: RelayMessage) -> Result<(), mpsc::error::SendError<RelayMessage>> {
        self.tx.send(message)
    }
}

/// Owns the registry and processes connection events one at a time
pub struct Relay {
    registry: ConnectionRegistry,
    rx: mpsc::UnboundedReceiver<RelayMessage>,
}

impl Relay {
    pub fn new() -> (Self, RelayHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let relay = Relay {
            registry: ConnectionRegistry::new(),
            rx,
        };
        let handle = RelayHandle {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (relay, handle)
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Runs until every [`RelayHandle`] has been dropped
    pub async fn run(mut self) {
        info!("Relay started");

        while let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }

        info!("Relay stopped with {} open connections", self.registry.len());
    }

    pub fn handle_message(&mut self, message: RelayMessage) {
        match message {
            RelayMessage::Opened { id, sender } => self.registry.open(id, sender),
            RelayMessage::Received { id, event } => self.handle_event(id, event),
            RelayMessage::Closed { id } => self.handle_close(id),
        }
    }

    fn handle_event(&mut self, id: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Join(name) => self.handle_join(id, name),
            ClientEvent::Message(body) => {
                let Some(name) = self.sender_name(id, "message") else {
                    return;
                };
                self.broadcast(id, ServerEvent::ChatMessage { name, message: body });
            }
            ClientEvent::Typing(signal) => {
                let Some(name) = self.sender_name(id, "typing") else {
                    return;
                };
                // The registry name wins over whatever name the client put in the payload
                let event = match signal {
                    TypingSignal::Started(_) => ServerEvent::TypingStarted(name),
                    TypingSignal::Stopped => ServerEvent::TypingStopped(name),
                };
                self.broadcast(id, event);
            }
        }
    }

    fn handle_join(&mut self, id: ConnectionId, name: String) {
        match self.registry.register(id, name.clone()) {
            Ok(()) => self.broadcast(id, ServerEvent::PresenceJoined(name)),
            Err(RegistryError::AlreadyNamed { name: existing, .. }) => {
                debug!(
                    "Ignoring repeated join from {} (already {:?}, asked for {:?})",
                    id, existing, name
                );
            }
            Err(e) => warn!("Join rejected: {}", e),
        }
    }

    fn handle_close(&mut self, id: ConnectionId) {
        let departed = self.registry.unregister(id);
        self.registry.close(id);

        if let Some(name) = departed {
            self.broadcast(id, ServerEvent::PresenceLeft(name));
        }
    }

    fn sender_name(&self, id: ConnectionId, kind: &str) -> Option<String> {
        let name = self.registry.lookup(id).map(str::to_string);
        if name.is_none() {
            debug!("Dropping {} event from anonymous connection {}", kind, id);
        }
        name
    }

    /// Fire-and-forget delivery to every connection except `origin`
    fn broadcast(&self, origin: ConnectionId, event: ServerEvent) {
        let recipients = self.registry.recipients_except(origin);
        debug!(
            "Broadcasting {} from {} to {} connections",
            event.name(),
            origin,
            recipients.len()
        );

        for (id, sender) in recipients {
            if let Err(e) = sender.send(event.clone()) {
                // The socket task is gone; its Closed message is still queued
                error!("Failed to queue {} for {}: {}", e.0.name(), id, e);
            }
        }
    }
}
