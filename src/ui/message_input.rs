//! Multi-line message box at the bottom of the chat screen.
//!
//! Enter submits, Shift+Enter (or Alt+Enter where the terminal cannot report
//! Shift) inserts a newline. The box grows with its content up to
//! `max_height` rows and scrolls past that.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use tui_textarea::TextArea;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Trimmed, non-empty text. The box has been cleared.
    Submitted(String),
    Edited,
    Ignored,
}

pub struct MessageInput {
    textarea: TextArea<'static>,
    max_height: u16,
    disabled: bool,
}

impl MessageInput {
    pub fn new(max_height: u16) -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            max_height: max_height.max(1),
            disabled: false,
        };
        input.configure();
        input
    }

    fn configure(&mut self) {
        self.textarea.set_cursor_line_style(Style::default());
        self.textarea
            .set_placeholder_text("Type a message (Enter to send, Shift+Enter for newline)");
        let (title, border) = if self.disabled {
            (" Coach is responding… ", Color::DarkGray)
        } else {
            (" Message ", Color::Cyan)
        };
        self.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
        let cursor = if self.disabled {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        };
        self.textarea.set_cursor_style(cursor);
    }

    /// While disabled, submission is suppressed but typing still works and
    /// the text is kept.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            self.disabled = disabled;
            self.configure();
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_text(&mut self, text: &str) {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        self.textarea.move_cursor(tui_textarea::CursorMove::End);
        self.configure();
    }

    pub fn clear(&mut self) {
        self.textarea = TextArea::default();
        self.configure();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        if key.code == KeyCode::Enter {
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
            {
                self.textarea.insert_newline();
                return InputOutcome::Edited;
            }
            return match self.submit() {
                Some(text) => InputOutcome::Submitted(text),
                None => InputOutcome::Ignored,
            };
        }

        if self.textarea.input(key) {
            InputOutcome::Edited
        } else {
            InputOutcome::Ignored
        }
    }

    pub fn insert_paste(&mut self, text: &str) {
        self.textarea.insert_str(sanitize_pasted_text(text));
    }

    /// Takes the current text if it is non-empty after trimming and the box
    /// is enabled.
    pub fn submit(&mut self) -> Option<String> {
        if self.disabled {
            return None;
        }
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let submitted = trimmed.to_string();
        self.clear();
        Some(submitted)
    }

    /// Rows needed including the border, capped by `max_height`.
    pub fn desired_height(&self) -> u16 {
        let rows = self.textarea.lines().len().max(1) as u16;
        rows.min(self.max_height) + 2
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(&self.textarea, area);
    }
}

/// Normalizes pasted text: tabs become four spaces, CR becomes LF, and other
/// control characters are dropped.
pub fn sanitize_pasted_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let mut sanitized = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => sanitized.push('\n'),
            '\n' => sanitized.push(c),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }
    sanitized
}
