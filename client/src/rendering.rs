use crate::session::{ChatSession, NamePrompt};
use crate::transcript::{wrap_text, Alignment, MessageEntry, PresenceKind, TranscriptEntry};
use macroquad::prelude::*;
use std::time::Instant;

const FONT_SIZE: f32 = 18.0;
const SMALL_FONT_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 20.0;
const PADDING: f32 = 12.0;
const BUBBLE_PADDING: f32 = 8.0;
const BADGE_RADIUS: f32 = 12.0;
const HEADER_HEIGHT: f32 = 32.0;
const FOOTER_HEIGHT: f32 = 64.0;
const ENTRY_SPACING: f32 = 10.0;

const BACKGROUND: Color = Color::new(0.04, 0.05, 0.10, 1.0);
const PANEL: Color = Color::new(0.08, 0.09, 0.23, 1.0);
const SELF_BUBBLE: Color = Color::new(0.23, 0.25, 0.63, 1.0);
const OTHER_BUBBLE: Color = Color::new(0.12, 0.13, 0.31, 1.0);
const LABEL: Color = Color::new(0.65, 0.71, 0.99, 1.0);
const JOINED: Color = Color::new(0.53, 0.94, 0.67, 1.0);
const LEFT: Color = Color::new(0.99, 0.65, 0.65, 1.0);

pub struct Renderer {
    char_width: f32,
}

impl Renderer {
    pub fn new() -> Self {
        let char_width = measure_text("M", None, FONT_SIZE as u16, 1.0).width.max(1.0);
        Renderer { char_width }
    }

    pub fn render_prompt(&self, prompt: &NamePrompt, draft: &str) {
        clear_background(BACKGROUND);

        let x = PADDING * 2.0;
        let mut y = screen_height() / 3.0;
        draw_text(
            &format!("Enter your name (max {} characters):", shared::MAX_NAME_LEN),
            x,
            y,
            FONT_SIZE,
            WHITE,
        );

        y += LINE_HEIGHT;
        draw_rectangle(x, y, screen_width() - x * 2.0, LINE_HEIGHT + 8.0, PANEL);
        draw_text(&format!("{}_", draft), x + 6.0, y + LINE_HEIGHT, FONT_SIZE, WHITE);

        y += LINE_HEIGHT * 2.5;
        if let Some(error) = &prompt.error {
            draw_text(&error.to_string(), x, y, SMALL_FONT_SIZE, LEFT);
            y += LINE_HEIGHT;
        }
        draw_text(
            "Enter to join, Esc to join as Anonymous",
            x,
            y,
            SMALL_FONT_SIZE,
            LABEL,
        );
    }

    pub fn render_chat(&self, session: &ChatSession, draft: &str, connected: bool, now: Instant) {
        clear_background(BACKGROUND);

        let transcript_top = HEADER_HEIGHT;
        let transcript_bottom = screen_height() - FOOTER_HEIGHT;
        self.draw_transcript(session, transcript_top, transcript_bottom);

        self.draw_header(session, connected);
        self.draw_footer(session, draft, now);
    }

    fn draw_header(&self, session: &ChatSession, connected: bool) {
        draw_rectangle(0.0, 0.0, screen_width(), HEADER_HEIGHT, PANEL);

        let status = if connected { JOINED } else { LEFT };
        draw_circle(PADDING + 4.0, HEADER_HEIGHT / 2.0, 4.0, status);
        draw_text(session.username(), PADDING + 16.0, 21.0, FONT_SIZE, WHITE);

        let online = format!("online: {}", session.others_online());
        let width = measure_text(&online, None, SMALL_FONT_SIZE as u16, 1.0).width;
        draw_text(
            &online,
            screen_width() - width - PADDING,
            20.0,
            SMALL_FONT_SIZE,
            LABEL,
        );
    }

    fn draw_footer(&self, session: &ChatSession, draft: &str, now: Instant) {
        let top = screen_height() - FOOTER_HEIGHT;

        if let Some(typing) = session.typing_text(now) {
            draw_text(&typing, PADDING, top + 16.0, SMALL_FONT_SIZE, LABEL);
        }

        let box_y = top + 24.0;
        draw_rectangle(
            PADDING,
            box_y,
            screen_width() - PADDING * 2.0,
            LINE_HEIGHT + 12.0,
            PANEL,
        );
        draw_text(
            &format!("{}_", draft),
            PADDING + 6.0,
            box_y + LINE_HEIGHT + 2.0,
            FONT_SIZE,
            WHITE,
        );
    }

    /// Lays entries out from the newest upwards and stops once the top is reached
    fn draw_transcript(&self, session: &ChatSession, top: f32, bottom: f32) {
        let available = screen_width() - PADDING * 2.0 - BADGE_RADIUS * 2.0 - 8.0;
        let mut y = bottom - ENTRY_SPACING;

        for entry in session.transcript().entries().iter().rev() {
            if y <= top {
                break;
            }
            y = match entry {
                TranscriptEntry::Message(message) => self.draw_message(message, available, y),
                TranscriptEntry::Presence { kind, .. } => {
                    let color = match kind {
                        PresenceKind::Joined => JOINED,
                        PresenceKind::Left => LEFT,
                    };
                    self.draw_centered(&entry.summary(), y, color)
                }
                TranscriptEntry::Notice(text) => self.draw_centered(text, y, LEFT),
            };
        }
    }

    fn draw_centered(&self, text: &str, bottom: f32, color: Color) -> f32 {
        let width = measure_text(text, None, SMALL_FONT_SIZE as u16, 1.0).width;
        draw_text(text, (screen_width() - width) / 2.0, bottom, SMALL_FONT_SIZE, color);
        bottom - LINE_HEIGHT - ENTRY_SPACING
    }

    /// Draws one bubble whose bottom edge sits at `bottom`; returns the next free bottom edge
    fn draw_message(&self, message: &MessageEntry, available: f32, bottom: f32) -> f32 {
        let max_width = message.band.max_width(available);
        let max_chars = ((max_width - BUBBLE_PADDING * 2.0) / self.char_width).floor() as usize;
        let lines = wrap_text(&message.body, max_chars);

        let text_width = lines
            .iter()
            .map(|line| measure_text(line, None, FONT_SIZE as u16, 1.0).width)
            .fold(0.0_f32, f32::max);
        let bubble_width = (text_width + BUBBLE_PADDING * 2.0).min(max_width);
        let bubble_height = lines.len() as f32 * LINE_HEIGHT + BUBBLE_PADDING * 2.0;
        let bubble_top = bottom - bubble_height;

        let bubble_x = match message.alignment {
            Alignment::Right => screen_width() - PADDING - bubble_width,
            Alignment::Left => PADDING + BADGE_RADIUS * 2.0 + 8.0,
        };
        let color = if message.is_self() { SELF_BUBBLE } else { OTHER_BUBBLE };

        draw_rectangle(bubble_x, bubble_top, bubble_width, bubble_height, color);
        for (i, line) in lines.iter().enumerate() {
            draw_text(
                line,
                bubble_x + BUBBLE_PADDING,
                bubble_top + BUBBLE_PADDING + (i as f32 + 0.8) * LINE_HEIGHT,
                FONT_SIZE,
                WHITE,
            );
        }

        let label_y = bubble_top - 4.0;
        let label_x = match message.alignment {
            Alignment::Right => {
                let width = measure_text(&message.label, None, SMALL_FONT_SIZE as u16, 1.0).width;
                screen_width() - PADDING - width
            }
            Alignment::Left => bubble_x,
        };
        draw_text(&message.label, label_x, label_y, SMALL_FONT_SIZE, LABEL);

        if let Some(badge) = &message.badge {
            let cx = PADDING + BADGE_RADIUS;
            let cy = bubble_top + BADGE_RADIUS;
            draw_circle(cx, cy, BADGE_RADIUS, PANEL);
            draw_circle_lines(cx, cy, BADGE_RADIUS, 1.0, LABEL);
            draw_text(badge, cx - 5.0, cy + 5.0, FONT_SIZE, WHITE);
        }

        label_y - SMALL_FONT_SIZE - ENTRY_SPACING
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
