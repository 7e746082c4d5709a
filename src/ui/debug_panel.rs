use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::core::debug::DebugReport;
use crate::ui::edit_modal::centered_rect;

/// Overlay listing the current client state, toggled with F2.
#[derive(Debug, Default)]
pub struct DebugPanel {
    visible: bool,
}

impl DebugPanel {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn build_lines(report: &DebugReport) -> Vec<Line<'static>> {
        let width = report
            .lines()
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);
        let mut lines: Vec<Line<'static>> = report
            .lines()
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(
                        format!("{label:<width$}  "),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value),
                ])
            })
            .collect();
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Ctrl+R reset all client state · F2 close",
            Style::default().fg(Color::DarkGray),
        )));
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, report: &DebugReport) {
        if !self.visible {
            return;
        }
        let popup = centered_rect(80, 60, area);
        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(Self::build_lines(report))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Magenta))
                    .title(" Debug "),
            );
        frame.render_widget(paragraph, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::SessionStore;
    use crate::core::token_store::TokenStore;

    #[test]
    fn toggles() {
        let mut panel = DebugPanel::default();
        panel.toggle();
        assert!(panel.is_visible());
        panel.toggle();
        assert!(!panel.is_visible());
    }

    #[test]
    fn lines_align_labels_and_end_with_hint() {
        let report = DebugReport::collect(
            "http://localhost:8000/api",
            &TokenStore::in_memory(),
            &SessionStore::default(),
            None,
        );
        let lines = DebugPanel::build_lines(&report);
        let first = lines[0].to_string();
        assert!(first.starts_with("API "), "{first}");
        assert!(first.ends_with("http://localhost:8000/api"));
        let last = lines.last().map(ToString::to_string).unwrap_or_default();
        assert!(last.contains("Ctrl+R"));
    }
}
