//! # Chat Relay Server Library
//!
//! This library implements the server half of a minimal real-time chat. Clients
//! hold one WebSocket each; the server remembers the display name each connection
//! joined with and forwards presence, message and typing events to every other
//! connected client. Nothing is persisted: when the process exits, all state is gone.
//!
//! ## Core Responsibilities
//!
//! ### Connection Registry
//! Maps each connection's opaque identifier to its display name. A connection is
//! anonymous until its join event arrives, and its name is discarded on disconnect.
//!
//! ### Broadcast Relay
//! Receives a named event from one connection and forwards it to every other open
//! connection, never back to the sender. Delivery is best effort: there are no
//! acknowledgements, retries or history.
//!
//! ### Static Assets
//! Any path other than the WebSocket endpoint and the health check is served
//! from a configurable directory, so a browser client can be hosted alongside.
//!
//! ## Architecture Design
//!
//! ### Single Relay Task
//! Socket tasks only translate frames. Everything that touches the registry goes
//! through one channel into one relay task, which handles connection events
//! sequentially. The registry therefore needs no locking and mutations are
//! naturally ordered.
//!
//! ### Per-Connection Lifecycle
//! `Connected(anonymous) -> Connected(named) -> Closed`. A second join on a named
//! connection is ignored, chat and typing events from anonymous connections are
//! dropped, and a departure is broadcast only for connections that had joined.
//!
//! ## Module Organization
//!
//! - `config`: listen address and static asset directory
//! - `registry`: connection identity to display name mapping
//! - `relay`: the sequential event processor and its handle
//! - `websocket`: socket task bridging frames to the relay
//! - `http`: axum router
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let server = ChatServer::bind(ServerConfig::default()).await?;
//!     println!("listening on {}", server.local_addr()?);
//!     server.run().await
//! }
//! ```

pub mod config;
pub mod http;
pub mod registry;
pub mod relay;
pub mod websocket;

pub use config::ServerConfig;
pub use registry::{ConnectionId, ConnectionRegistry, RegistryError};
pub use relay::{Relay, RelayHandle, RelayMessage};

use log::info;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A bound, not yet running chat server
pub struct ChatServer {
    listener: TcpListener,
    config: ServerConfig,
}

impl ChatServer {
    pub async fn bind(
        config: ServerConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(config.bind_address()).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(ChatServer { listener, config })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts the relay task and serves HTTP until the listener fails
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (relay, handle) = Relay::new();
        tokio::spawn(relay.run());

        let app = http::create_router(handle, &self.config.static_dir);
        info!(
            "Serving static assets from {}",
            self.config.static_dir.display()
        );

        axum::serve(self.listener, app).await?;
        Ok(())
    }
}
