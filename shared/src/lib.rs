use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const WS_PATH: &str = "/ws";
pub const MAX_NAME_LEN: usize = 15;
pub const TYPING_TIMEOUT: Duration = Duration::from_secs(2);
pub const FALLBACK_NAME: &str = "Anonymous";
pub const SYSTEM_SENDER: &str = "System";
pub const UNKNOWN_SENDER: &str = "Unknown";
pub const UNRECOGNIZED_BODY: &str = "New message";

/// Events a client sends to the relay.
///
/// Every frame on the wire is a JSON object `{"event": <name>, "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    Join(String),
    Message(String),
    Typing(TypingSignal),
}

/// Events the relay forwards to every connection except the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    PresenceJoined(String),
    PresenceLeft(String),
    ChatMessage { name: String, message: String },
    #[serde(rename = "typing-broadcast")]
    TypingStarted(String),
    TypingStopped(String),
}

/// Payload of the `typing` event: the typist's name while typing, `false` once stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingSignal {
    Started(String),
    Stopped,
}

impl Serialize for TypingSignal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypingSignal::Started(name) => serializer.serialize_str(name),
            TypingSignal::Stopped => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for TypingSignal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTyping {
            Name(String),
            Flag(bool),
        }

        match RawTyping::deserialize(deserializer)? {
            RawTyping::Name(name) => Ok(TypingSignal::Started(name)),
            RawTyping::Flag(false) => Ok(TypingSignal::Stopped),
            RawTyping::Flag(true) => Err(D::Error::custom(
                "typing payload must be a name or false",
            )),
        }
    }
}

impl ClientEvent {
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_frame(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl ServerEvent {
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_frame(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Wire name of the event, as found in the frame's `event` field.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::PresenceJoined(_) => "presence-joined",
            ServerEvent::PresenceLeft(_) => "presence-left",
            ServerEvent::ChatMessage { .. } => "chat-message",
            ServerEvent::TypingStarted(_) => "typing-broadcast",
            ServerEvent::TypingStopped(_) => "typing-stopped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn frame_value(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_join_frame_layout() {
        let frame = ClientEvent::Join("Nova".to_string()).to_frame().unwrap();
        assert_eq!(frame_value(&frame), json!({"event": "join", "data": "Nova"}));
    }

    #[test]
    fn test_typing_stop_is_false_on_the_wire() {
        let frame = ClientEvent::Typing(TypingSignal::Stopped).to_frame().unwrap();
        assert_eq!(frame_value(&frame), json!({"event": "typing", "data": false}));
    }

    #[test]
    fn test_typing_frames_parse() {
        let started = ClientEvent::from_frame(r#"{"event":"typing","data":"Rin"}"#).unwrap();
        assert_eq!(started, ClientEvent::Typing(TypingSignal::Started("Rin".to_string())));

        let stopped = ClientEvent::from_frame(r#"{"event":"typing","data":false}"#).unwrap();
        assert_eq!(stopped, ClientEvent::Typing(TypingSignal::Stopped));
    }

    #[test]
    fn test_typing_true_is_rejected() {
        assert!(ClientEvent::from_frame(r#"{"event":"typing","data":true}"#).is_err());
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(ClientEvent::from_frame(r#"{"event":"new-user","data":"Nova"}"#).is_err());
        assert!(ClientEvent::from_frame("not json").is_err());
    }

    #[test]
    fn test_chat_message_frame_layout() {
        let event = ServerEvent::ChatMessage {
            name: "Nova".to_string(),
            message: "hello".to_string(),
        };
        let frame = event.to_frame().unwrap();
        assert_eq!(
            frame_value(&frame),
            json!({"event": "chat-message", "data": {"name": "Nova", "message": "hello"}})
        );
    }

    #[test]
    fn test_server_event_names_match_wire() {
        let events = vec![
            ServerEvent::PresenceJoined("a".to_string()),
            ServerEvent::PresenceLeft("a".to_string()),
            ServerEvent::ChatMessage {
                name: "a".to_string(),
                message: "b".to_string(),
            },
            ServerEvent::TypingStarted("a".to_string()),
            ServerEvent::TypingStopped("a".to_string()),
        ];

        for event in events {
            let value = frame_value(&event.to_frame().unwrap());
            assert_eq!(value["event"], event.name());
        }
    }

    #[test]
    fn test_server_frame_parses_back() {
        let parsed =
            ServerEvent::from_frame(r#"{"event":"typing-broadcast","data":"Nova"}"#).unwrap();
        assert_eq!(parsed, ServerEvent::TypingStarted("Nova".to_string()));
    }
}
