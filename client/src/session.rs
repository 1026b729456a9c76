//! Chat session controller
//!
//! Owns the per-session state the window loop needs: who we are, the
//! transcript, the outgoing typing debounce and the incoming typing indicator.
//! Methods take the current instant and return the events to send, so the
//! controller itself never touches the network or the clock.

use crate::payload::InboundEvent;
use crate::transcript::{
    render_message, render_payload, PresenceKind, Transcript, TranscriptEntry,
};
use log::debug;
use shared::{ClientEvent, TypingSignal, FALLBACK_NAME, MAX_NAME_LEN, TYPING_TIMEOUT};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("name cannot be empty")]
    Empty,
    #[error("name is {len} characters long, the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Checks a display name entered by the user and returns it trimmed
pub fn validate_name(input: &str) -> Result<String, NameError> {
    let name = input.trim();
    let len = name.chars().count();

    if len == 0 {
        return Err(NameError::Empty);
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }
    Ok(name.to_string())
}

/// State of the name-entry form shown before the session starts
#[derive(Debug, Default)]
pub struct NamePrompt {
    pub error: Option<NameError>,
}

impl NamePrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accepted name, or keeps the prompt open with the validation error
    pub fn submit(&mut self, draft: &str) -> Option<String> {
        match validate_name(draft) {
            Ok(name) => {
                self.error = None;
                Some(name)
            }
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Name used when the user dismisses the prompt
    pub fn cancel(&mut self) -> String {
        self.error = None;
        FALLBACK_NAME.to_string()
    }
}

#[derive(Debug, Clone)]
struct TypingIndicator {
    name: String,
    expires_at: Instant,
}

pub struct ChatSession {
    username: String,
    transcript: Transcript,
    /// When our own typing signal lapses; `None` while idle
    typing_deadline: Option<Instant>,
    indicator: Option<TypingIndicator>,
    others_online: usize,
}

impl ChatSession {
    /// Validates the name and returns the session with the join event to send first
    pub fn start(name: &str) -> Result<(Self, ClientEvent), NameError> {
        let username = validate_name(name)?;
        let join = ClientEvent::Join(username.clone());

        let session = ChatSession {
            username,
            transcript: Transcript::new(),
            typing_deadline: None,
            indicator: None,
            others_online: 0,
        };
        Ok((session, join))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Users seen joining minus users seen leaving since we connected
    pub fn others_online(&self) -> usize {
        self.others_online
    }

    pub fn is_typing(&self) -> bool {
        self.typing_deadline.is_some()
    }

    /// Sends a message. Our own entry is appended right away since the relay never echoes.
    pub fn submit(&mut self, draft: &str, _now: Instant) -> Vec<ClientEvent> {
        let body = draft.trim();
        if body.is_empty() {
            return Vec::new();
        }

        let mut events = vec![ClientEvent::Message(body.to_string())];
        self.transcript
            .push(TranscriptEntry::Message(render_message(&self.username, body, true)));
        self.indicator = None;

        if self.typing_deadline.take().is_some() {
            events.push(ClientEvent::Typing(TypingSignal::Stopped));
        }
        events
    }

    /// Called whenever the input line changes
    pub fn input_changed(&mut self, draft: &str, now: Instant) -> Option<ClientEvent> {
        if draft.trim().is_empty() {
            return self
                .typing_deadline
                .take()
                .map(|_| ClientEvent::Typing(TypingSignal::Stopped));
        }

        self.typing_deadline = Some(now + TYPING_TIMEOUT);
        Some(ClientEvent::Typing(TypingSignal::Started(
            self.username.clone(),
        )))
    }

    /// Expires the typing debounce and the remote indicator
    pub fn tick(&mut self, now: Instant) -> Option<ClientEvent> {
        if self
            .indicator
            .as_ref()
            .is_some_and(|indicator| now >= indicator.expires_at)
        {
            self.indicator = None;
        }

        match self.typing_deadline {
            Some(deadline) if now >= deadline => {
                self.typing_deadline = None;
                Some(ClientEvent::Typing(TypingSignal::Stopped))
            }
            _ => None,
        }
    }

    pub fn handle_inbound(&mut self, event: InboundEvent, now: Instant) {
        match event {
            InboundEvent::PresenceJoined(name) => {
                self.others_online += 1;
                self.transcript
                    .push(TranscriptEntry::presence(&name, PresenceKind::Joined));
            }
            InboundEvent::PresenceLeft(name) => {
                self.others_online = self.others_online.saturating_sub(1);
                self.clear_indicator_for(&name);
                self.transcript
                    .push(TranscriptEntry::presence(&name, PresenceKind::Left));
            }
            InboundEvent::Chat(payload) => {
                let entry = render_payload(&payload, &self.username);
                self.transcript.push(TranscriptEntry::Message(entry));
            }
            InboundEvent::TypingStarted(name) => {
                if name != self.username {
                    self.indicator = Some(TypingIndicator {
                        name,
                        expires_at: now + TYPING_TIMEOUT,
                    });
                }
            }
            InboundEvent::TypingStopped(name) => self.clear_indicator_for(&name),
            InboundEvent::Ignored(reason) => debug!("Ignored inbound frame: {}", reason),
        }
    }

    /// Appends a local notice, e.g. on connection loss
    pub fn notice(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry::Notice(text.into()));
    }

    /// Text of the typing indicator, if someone is typing as of `now`
    pub fn typing_text(&self, now: Instant) -> Option<String> {
        self.indicator
            .as_ref()
            .filter(|indicator| now < indicator.expires_at)
            .map(|indicator| format!("{} is typing...", indicator.name))
    }

    fn clear_indicator_for(&mut self, name: &str) {
        if self
            .indicator
            .as_ref()
            .is_some_and(|indicator| indicator.name == name)
        {
            self.indicator = None;
        }
    }
}
