//! WebSocket endpoint bridging sockets to the relay

use crate::relay::{RelayHandle, RelayMessage};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use log::{debug, error, warn};
use shared::ClientEvent;
use tokio::sync::mpsc;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(relay): State<RelayHandle>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, relay))
}

/// Pumps one connection until either side goes away, then reports the close
async fn handle_socket(socket: WebSocket, relay: RelayHandle) {
    let id = relay.next_connection_id();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    if relay
        .send(RelayMessage::Opened {
            id,
            sender: event_tx,
        })
        .is_err()
    {
        error!("Relay is not running, dropping connection {}", id);
        return;
    }

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outbound = event_rx.recv() => {
                let Some(event) = outbound else {
                    break;
                };
                match event.to_frame() {
                    Ok(frame) => {
                        if sink.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => error!("Failed to encode {} for {}: {}", event.name(), id, e),
                }
            }

            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match ClientEvent::from_frame(text.as_str()) {
                            Ok(event) => {
                                if relay.send(RelayMessage::Received { id, event }).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Ignoring malformed frame from {}: {}", id, e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Ping/pong are answered by axum; binary frames carry nothing we understand
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Socket error on {}: {}", id, e);
                        break;
                    }
                }
            }
        }
    }

    let _ = relay.send(RelayMessage::Closed { id });
}
