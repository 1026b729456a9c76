//! Decoding of inbound frames into tagged events
//!
//! Frames are parsed loosely as `{"event": <name>, "data": <any>}` and then
//! classified, so that odd payload shapes degrade to a placeholder entry
//! instead of breaking the session.

use log::warn;
use serde::Deserialize;
use serde_json::Value;
use shared::ServerEvent;

/// Shape of a `chat-message` payload after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatPayload {
    /// `{name, message}` with a non-empty string name
    Structured { name: String, message: String },
    /// A bare string, shown as a system message
    PlainSystem(String),
    /// Anything else
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    PresenceJoined(String),
    PresenceLeft(String),
    Chat(ChatPayload),
    TypingStarted(String),
    TypingStopped(String),
    /// Frame that carries nothing renderable; the reason is kept for logging
    Ignored(String),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

pub fn decode_frame(text: &str) -> InboundEvent {
    let frame: RawFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Unreadable frame from server: {}", e);
            return InboundEvent::Ignored(format!("unreadable frame: {}", e));
        }
    };

    match frame.event.as_str() {
        "presence-joined" => name_event(frame, InboundEvent::PresenceJoined),
        "presence-left" => name_event(frame, InboundEvent::PresenceLeft),
        "typing-broadcast" => name_event(frame, InboundEvent::TypingStarted),
        "typing-stopped" => name_event(frame, InboundEvent::TypingStopped),
        "chat-message" => InboundEvent::Chat(classify_chat(frame.data)),
        other => InboundEvent::Ignored(format!("unknown event {:?}", other)),
    }
}

fn name_event(frame: RawFrame, make: fn(String) -> InboundEvent) -> InboundEvent {
    match frame.data {
        Value::String(name) => make(name),
        other => InboundEvent::Ignored(format!(
            "{} carried a non-string payload: {}",
            frame.event, other
        )),
    }
}

pub fn classify_chat(data: Value) -> ChatPayload {
    match data {
        Value::Object(mut fields) => {
            let name = match fields.remove("name") {
                Some(Value::String(name)) if !name.is_empty() => name,
                _ => return ChatPayload::Unrecognized,
            };
            let message = match fields.remove("message") {
                Some(Value::String(message)) => message,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            ChatPayload::Structured { name, message }
        }
        Value::String(text) => ChatPayload::PlainSystem(text),
        _ => ChatPayload::Unrecognized,
    }
}

impl From<ServerEvent> for InboundEvent {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::PresenceJoined(name) => InboundEvent::PresenceJoined(name),
            ServerEvent::PresenceLeft(name) => InboundEvent::PresenceLeft(name),
            ServerEvent::ChatMessage { name, message } => {
                InboundEvent::Chat(ChatPayload::Structured { name, message })
            }
            ServerEvent::TypingStarted(name) => InboundEvent::TypingStarted(name),
            ServerEvent::TypingStopped(name) => InboundEvent::TypingStopped(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_chat_message() {
        let event = decode_frame(r#"{"event":"chat-message","data":{"name":"Nova","message":"hello"}}"#);
        assert_eq!(
            event,
            InboundEvent::Chat(ChatPayload::Structured {
                name: "Nova".to_string(),
                message: "hello".to_string()
            })
        );
    }

    #[test]
    fn test_bare_string_is_system_message() {
        let event = decode_frame(r#"{"event":"chat-message","data":"maintenance at noon"}"#);
        assert_eq!(
            event,
            InboundEvent::Chat(ChatPayload::PlainSystem("maintenance at noon".to_string()))
        );
    }

    #[test]
    fn test_other_shapes_are_unrecognized() {
        assert_eq!(classify_chat(json!(42)), ChatPayload::Unrecognized);
        assert_eq!(classify_chat(json!(null)), ChatPayload::Unrecognized);
        assert_eq!(classify_chat(json!(["a"])), ChatPayload::Unrecognized);
        assert_eq!(classify_chat(json!({"message": "no name"})), ChatPayload::Unrecognized);
        assert_eq!(classify_chat(json!({"name": "", "message": "x"})), ChatPayload::Unrecognized);
    }

    #[test]
    fn test_non_string_message_body_is_stringified() {
        let payload = classify_chat(json!({"name": "Nova", "message": {"nested": true}}));
        assert_eq!(
            payload,
            ChatPayload::Structured {
                name: "Nova".to_string(),
                message: r#"{"nested":true}"#.to_string()
            }
        );
    }

    #[test]
    fn test_presence_and_typing_events() {
        assert_eq!(
            decode_frame(r#"{"event":"presence-joined","data":"Rin"}"#),
            InboundEvent::PresenceJoined("Rin".to_string())
        );
        assert_eq!(
            decode_frame(r#"{"event":"presence-left","data":"Rin"}"#),
            InboundEvent::PresenceLeft("Rin".to_string())
        );
        assert_eq!(
            decode_frame(r#"{"event":"typing-broadcast","data":"Rin"}"#),
            InboundEvent::TypingStarted("Rin".to_string())
        );
        assert_eq!(
            decode_frame(r#"{"event":"typing-stopped","data":"Rin"}"#),
            InboundEvent::TypingStopped("Rin".to_string())
        );
    }

    #[test]
    fn test_garbage_is_ignored() {
        assert!(matches!(decode_frame("{{{"), InboundEvent::Ignored(_)));
        assert!(matches!(
            decode_frame(r#"{"event":"presence-joined","data":7}"#),
            InboundEvent::Ignored(_)
        ));
        assert!(matches!(
            decode_frame(r#"{"event":"mystery","data":"x"}"#),
            InboundEvent::Ignored(_)
        ));
    }

    #[test]
    fn test_server_encoding_decodes_identically() {
        let event = ServerEvent::ChatMessage {
            name: "Nova".to_string(),
            message: "hi".to_string(),
        };
        let frame = event.to_frame().unwrap();
        assert_eq!(decode_frame(&frame), InboundEvent::from(event));
    }
}
