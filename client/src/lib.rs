//! # Chat Client Library
//!
//! This library provides the client side of the chat relay: it picks a display
//! name, holds a single WebSocket to the server, turns outbound UI actions into
//! events and renders inbound events into a scrolling transcript.
//!
//! ## Architecture Overview
//!
//! ### Local Echo
//! The relay never sends an event back to its origin, so the client appends its
//! own messages to the transcript immediately on submit instead of waiting for
//! the server.
//!
//! ### Decode at the Boundary
//! Inbound frames are untyped JSON. They are classified once, in `payload`, into
//! a closed set of variants before any rendering code sees them. Payloads of an
//! unexpected shape become a placeholder entry rather than an error.
//!
//! ### Clock-Free Controller
//! `session::ChatSession` takes the current instant as an argument and returns
//! the events to send. Typing debounce and indicator expiry are therefore plain
//! state transitions that can be tested without timers or sockets.
//!
//! ## Module Organization
//!
//! ### Session Module (`session`)
//! - Display name validation and the name-entry form state
//! - Outbound message and typing events, with the 2 second typing debounce
//! - Inbound dispatch to the transcript, online count and typing indicator
//!
//! ### Payload Module (`payload`)
//! - Frame parsing and classification of chat payloads
//!
//! ### Transcript Module (`transcript`)
//! - Width banding, alignment and badges for message entries
//! - Word wrapping and the append-only transcript
//!
//! ### Network Module (`network`)
//! - WebSocket task on a background tokio runtime
//! - Channel bridge to the frame loop, no reconnects
//!
//! ### Input and Rendering Modules (`input`, `rendering`)
//! - Line editing from macroquad key events
//! - Drawing the name prompt, transcript, typing indicator and input line
//!
//! ## Usage Example
//!
//! ```rust
//! use client::payload::decode_frame;
//! use client::session::ChatSession;
//! use std::time::Instant;
//!
//! let (mut session, join) = ChatSession::start("Nova").unwrap();
//! // send `join` over the socket, then feed frames back in:
//! let event = decode_frame(r#"{"event":"presence-joined","data":"Rin"}"#);
//! session.handle_inbound(event, Instant::now());
//! assert_eq!(session.others_online(), 1);
//! # let _ = join;
//! ```

pub mod input;
pub mod network;
pub mod payload;
pub mod rendering;
pub mod session;
pub mod transcript;
