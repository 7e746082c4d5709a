//! Modal editor for revising a draft before it is used.
//!
//! The modal edits its own copy of the text. The caller's content only
//! changes when the modal is saved; closing throws the copy away.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use tui_textarea::{CursorMove, TextArea};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    Saved(String),
    Closed,
    Pending,
}

#[derive(Default)]
pub struct EditDraftModal {
    textarea: Option<TextArea<'static>>,
}

impl EditDraftModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.textarea.is_some()
    }

    /// Shows the modal seeded with `initial`. Any unsaved edits from a
    /// previous opening are gone.
    pub fn open(&mut self, initial: &str) {
        let lines: Vec<String> = initial.split('\n').map(str::to_string).collect();
        let mut textarea = TextArea::from(lines);
        textarea.move_cursor(CursorMove::Bottom);
        textarea.move_cursor(CursorMove::End);
        textarea.set_cursor_line_style(Style::default());
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Edit draft "),
        );
        self.textarea = Some(textarea);
    }

    pub fn text(&self) -> Option<String> {
        self.textarea.as_ref().map(|t| t.lines().join("\n"))
    }

    pub fn save(&mut self) -> Option<String> {
        self.textarea.take().map(|t| t.lines().join("\n"))
    }

    pub fn close(&mut self) {
        self.textarea = None;
    }

    /// Ctrl+S saves, Esc closes, everything else edits.
    pub fn handle_key(&mut self, key: KeyEvent) -> ModalOutcome {
        let Some(textarea) = self.textarea.as_mut() else {
            return ModalOutcome::Closed;
        };
        match key.code {
            KeyCode::Esc => {
                self.close();
                ModalOutcome::Closed
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self
                .save()
                .map(ModalOutcome::Saved)
                .unwrap_or(ModalOutcome::Closed),
            _ => {
                textarea.input(key);
                ModalOutcome::Pending
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(textarea) = self.textarea.as_ref() else {
            return;
        };
        let popup = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(popup);
        frame.render_widget(textarea, chunks[0]);
        frame.render_widget(
            Paragraph::new(Line::from("Ctrl+S save · Esc cancel"))
                .style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
