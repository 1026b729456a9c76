//! WebSocket connection running on a background tokio runtime
//!
//! The window loop is not async-aware, so the socket lives in its own task
//! and talks to the loop over unbounded channels. The loop drains inbound
//! events once per frame with [`NetworkClient::poll`].

use crate::payload::{decode_frame, InboundEvent};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::ClientEvent;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Connected,
    Inbound(InboundEvent),
    /// The connection is gone for good; there is no automatic reconnect
    Disconnected { reason: String },
}

pub struct NetworkClient {
    outbound: mpsc::UnboundedSender<ClientEvent>,
    inbound: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl NetworkClient {
    /// Spawns the connection task. Events sent before the socket opens are queued.
    pub fn spawn(runtime: &Handle, url: String) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        runtime.spawn(async move {
            let reason = match run_connection(&url, outbound_rx, inbound_tx.clone()).await {
                Ok(()) => "connection closed".to_string(),
                Err(e) => {
                    error!("Connection to {} failed: {}", url, e);
                    e.to_string()
                }
            };
            let _ = inbound_tx.send(NetworkEvent::Disconnected { reason });
        });

        NetworkClient {
            outbound: outbound_tx,
            inbound: inbound_rx,
        }
    }

    pub fn send(&self, event: ClientEvent) {
        if self.outbound.send(event).is_err() {
            debug!("Dropping outbound event, connection task has exited");
        }
    }

    /// Drains everything received since the last call without blocking
    pub fn poll(&mut self) -> Vec<NetworkEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.inbound.try_recv() {
            events.push(event);
        }
        events
    }
}

async fn run_connection(
    url: &str,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
    inbound: mpsc::UnboundedSender<NetworkEvent>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Connecting to {}", url);
    let (ws_stream, _) = connect_async(url).await?;
    info!("Connected to {}", url);
    let _ = inbound.send(NetworkEvent::Connected);

    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            event = outbound.recv() => {
                let Some(event) = event else {
                    // The window loop dropped its handle
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(());
                };
                let frame = event.to_frame()?;
                sink.send(Message::Text(frame.into())).await?;
            }

            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        let event = decode_frame(text.as_str());
                        if inbound.send(NetworkEvent::Inbound(event)).is_err() {
                            return Ok(());
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("Server closed the connection: {:?}", frame);
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Socket error: {}", e);
                        return Err(e.into());
                    }
                    None => return Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Polls until the connection task reports that it has exited
    async fn wait_for_disconnect(client: &mut NetworkClient) -> Vec<NetworkEvent> {
        let mut seen = Vec::new();
        loop {
            let events = client.poll();
            let done = events
                .iter()
                .any(|event| matches!(event, NetworkEvent::Disconnected { .. }));
            seen.extend(events);
            if done {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn refused_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_unreachable_server_reports_disconnect() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let url = format!("ws://127.0.0.1:{}/ws", refused_port());
        let mut client = NetworkClient::spawn(runtime.handle(), url);

        let events = runtime.block_on(tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_disconnect(&mut client),
        ));

        let events = events.unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], NetworkEvent::Disconnected { .. }));
    }

    #[test]
    fn test_send_after_exit_is_harmless() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let mut client = NetworkClient::spawn(runtime.handle(), "not a url".to_string());

        runtime
            .block_on(tokio::time::timeout(
                Duration::from_secs(5),
                wait_for_disconnect(&mut client),
            ))
            .unwrap();

        client.send(ClientEvent::Join("Nova".to_string()));
        client.send(ClientEvent::Message("hello".to_string()));

        assert!(client.poll().is_empty());
    }
}
