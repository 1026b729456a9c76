//! Transcript model: turns chat events into positioned entries
//!
//! Everything here is independent of the window toolkit; the renderer only
//! reads the entries and lays them out.

use crate::payload::ChatPayload;
use shared::{SYSTEM_SENDER, UNKNOWN_SENDER, UNRECOGNIZED_BODY};

/// Bubble width band chosen from the body length in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthBand {
    Compact,
    Narrow,
    Medium,
    Wide,
}

impl WidthBand {
    pub fn for_body(body: &str) -> Self {
        match body.chars().count() {
            0..=14 => WidthBand::Compact,
            15..=29 => WidthBand::Narrow,
            30..=49 => WidthBand::Medium,
            _ => WidthBand::Wide,
        }
    }

    /// Fraction of the available width a bubble may take; `None` means fit to content
    pub fn max_fraction(self) -> Option<f32> {
        match self {
            WidthBand::Compact => None,
            WidthBand::Narrow => Some(0.65),
            WidthBand::Medium => Some(0.75),
            WidthBand::Wide => Some(0.85),
        }
    }

    pub fn max_width(self, available: f32) -> f32 {
        self.max_fraction()
            .map(|fraction| available * fraction)
            .unwrap_or(available)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub sender: String,
    /// "You" for self-authored entries, the sender otherwise
    pub label: String,
    pub body: String,
    pub band: WidthBand,
    pub alignment: Alignment,
    /// Uppercased first character of the sender; absent on self-authored entries
    pub badge: Option<String>,
}

impl MessageEntry {
    pub fn is_self(&self) -> bool {
        self.alignment == Alignment::Right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceKind {
    Joined,
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Message(MessageEntry),
    Presence { name: String, kind: PresenceKind },
    Notice(String),
}

impl TranscriptEntry {
    pub fn presence(name: &str, kind: PresenceKind) -> Self {
        TranscriptEntry::Presence {
            name: name.to_string(),
            kind,
        }
    }

    /// Single-line text for presence lines and notices
    pub fn summary(&self) -> String {
        match self {
            TranscriptEntry::Message(entry) => format!("{}: {}", entry.label, entry.body),
            TranscriptEntry::Presence { name, kind: PresenceKind::Joined } => {
                format!("{} joined", name)
            }
            TranscriptEntry::Presence { name, kind: PresenceKind::Left } => {
                format!("{} left", name)
            }
            TranscriptEntry::Notice(text) => text.clone(),
        }
    }
}

pub fn render_message(name: &str, body: &str, is_self: bool) -> MessageEntry {
    let (label, alignment, badge) = if is_self {
        ("You".to_string(), Alignment::Right, None)
    } else {
        (name.to_string(), Alignment::Left, Some(badge_for(name)))
    };

    MessageEntry {
        sender: name.to_string(),
        label,
        body: body.to_string(),
        band: WidthBand::for_body(body),
        alignment,
        badge,
    }
}

/// Renders an inbound chat payload; entries carrying our own name count as self-authored
pub fn render_payload(payload: &ChatPayload, own_name: &str) -> MessageEntry {
    match payload {
        ChatPayload::Structured { name, message } => {
            render_message(name, message, name == own_name)
        }
        ChatPayload::PlainSystem(text) => render_message(SYSTEM_SENDER, text, false),
        ChatPayload::Unrecognized => render_message(UNKNOWN_SENDER, UNRECOGNIZED_BODY, false),
    }
}

fn badge_for(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// Greedy word wrap. Words longer than a line are split across lines.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        while chars.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(max_chars);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        let word_len = chars.len();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += word_len;
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Append-only list of rendered entries for the lifetime of the session
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
