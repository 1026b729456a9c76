//! Single-line text entry driven by macroquad key events

use macroquad::prelude::*;

/// Keyboard events relevant to a line editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Char(char),
    Backspace,
    Enter,
    Escape,
}

/// What a frame's worth of keys did to the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    /// The draft changed; carries the new draft
    Edited(String),
    /// Enter was pressed; carries the draft, which is then cleared
    Submitted(String),
    Cancelled,
}

#[derive(Debug, Default)]
pub struct TextInput {
    buffer: String,
    max_chars: Option<usize>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_chars: usize) -> Self {
        Self {
            buffer: String::new(),
            max_chars: Some(max_chars),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn apply(&mut self, key: InputKey) -> InputAction {
        match key {
            InputKey::Char(c) if c.is_control() => InputAction::None,
            InputKey::Char(c) => {
                let full = self
                    .max_chars
                    .is_some_and(|max| self.buffer.chars().count() >= max);
                if full {
                    return InputAction::None;
                }
                self.buffer.push(c);
                InputAction::Edited(self.buffer.clone())
            }
            InputKey::Backspace => match self.buffer.pop() {
                Some(_) => InputAction::Edited(self.buffer.clone()),
                None => InputAction::None,
            },
            InputKey::Enter => InputAction::Submitted(std::mem::take(&mut self.buffer)),
            InputKey::Escape => InputAction::Cancelled,
        }
    }

    /// Feeds this frame's keyboard events through [`TextInput::apply`]
    pub fn poll(&mut self) -> Vec<InputAction> {
        let mut keys = Vec::new();
        while let Some(c) = get_char_pressed() {
            keys.push(InputKey::Char(c));
        }
        if is_key_pressed(KeyCode::Backspace) {
            keys.push(InputKey::Backspace);
        }
        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter) {
            keys.push(InputKey::Enter);
        }
        if is_key_pressed(KeyCode::Escape) {
            keys.push(InputKey::Escape);
        }

        keys.into_iter()
            .map(|key| self.apply(key))
            .filter(|action| *action != InputAction::None)
            .collect()
    }
}
