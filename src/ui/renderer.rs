use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::debug::DebugReport;
use crate::core::session::SessionStore;
use crate::ui::chat_loop::screen::{ChatScreen, Focus};
use crate::utils::scroll::prewrap_lines;

/// Everything a frame needs, gathered by the event loop before drawing.
pub struct ChatView<'a> {
    pub store: &'a SessionStore,
    pub screen: &'a ChatScreen,
    pub is_sending: bool,
    pub is_fetching: bool,
    pub last_error: Option<String>,
    pub debug_report: Option<&'a DebugReport>,
}

pub fn ui(f: &mut Frame, view: &ChatView<'_>) {
    let input_height = view.screen.input.desired_height();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(input_height),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(title_line(view)), chunks[0]);
    render_transcript(f, chunks[1], view);
    f.render_widget(Paragraph::new(status_line(view)), chunks[2]);
    view.screen.temperature.render(
        f,
        chunks[3],
        view.screen.focus == Focus::Temperature,
    );
    view.screen.input.render(f, chunks[4]);

    if let Some(report) = view.debug_report {
        view.screen.debug.render(f, f.area(), report);
    }
    view.screen.modal.render(f, f.area());
}

fn title_line(view: &ChatView<'_>) -> Line<'static> {
    let conversation = view
        .store
        .current_conversation()
        .map(|c| c.label())
        .unwrap_or_else(|| format!("{} · no conversation", view.screen.manager.display_name()));
    let user = view
        .store
        .user()
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| "signed out".into());
    Line::from(vec![
        Span::styled(
            format!("Huddle v{}", env!("CARGO_PKG_VERSION")),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" · {conversation} · {user}")),
    ])
}

pub fn build_transcript_lines(view: &ChatView<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let messages = view.store.messages();

    if messages.is_empty() {
        let placeholder = if view.is_fetching {
            "Loading conversation…".to_string()
        } else if let Some(conversation) = view.store.current_conversation() {
            format!(
                "Say hello to your {}.",
                conversation.manager_type.display_name()
            )
        } else {
            "Press Ctrl+N to start a conversation.".to_string()
        };
        lines.push(Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        )));
    }

    for message in messages {
        let (label, color) = if message.is_user() {
            ("You:", Color::Cyan)
        } else {
            ("Coach:", Color::Green)
        };
        lines.push(Line::from(vec![
            Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", message.created_at.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for content_line in message.content.lines() {
            lines.push(Line::from(content_line.to_string()));
        }
        lines.push(Line::default());
    }

    if view.is_sending {
        lines.push(Line::from(Span::styled(
            "Coach is typing…",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

fn render_transcript(f: &mut Frame, area: Rect, view: &ChatView<'_>) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    // Rendered without `Wrap` so the row count below matches what is drawn.
    let lines = prewrap_lines(&build_transcript_lines(view), inner.width);

    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_offset = total.saturating_sub(inner.height);
    let offset = max_offset.saturating_sub(view.screen.scroll_back);

    let paragraph = Paragraph::new(lines).block(block).scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn status_line(view: &ChatView<'_>) -> Line<'static> {
    if let Some(status) = &view.screen.status {
        return Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(error) = &view.last_error {
        return Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(Span::styled(
        "Enter send · Ctrl+E edit draft · Ctrl+N new · Tab temperature · F2 debug · Ctrl+C quit",
        Style::default().fg(Color::DarkGray),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::{Conversation, ManagerType};
    use crate::core::message::{Message, Role};
    use crate::core::temperature::Temperature;
    use chrono::Utc;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn store_with_messages() -> SessionStore {
        let mut store = SessionStore::default();
        store.set_current_conversation(Conversation {
            conversation_id: "c1".into(),
            user_id: "u1".into(),
            manager_type: ManagerType::ExecutiveCoach,
            created_at: Utc::now(),
            is_new: true,
            is_loading: false,
        });
        store.append_message(Message::optimistic_user("c1", "Hi there"));
        store.append_message(Message {
            id: "m2".into(),
            conversation_id: "c1".into(),
            role: Role::Assistant,
            content: "Hello! What is on your mind?".into(),
            created_at: Utc::now(),
            is_loading: false,
        });
        store
    }

    fn render(view: &ChatView<'_>) -> String {
        render_at(view, 80, 24)
    }

    fn render_at(view: &ChatView<'_>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui(f, view)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn transcript_labels_each_role() {
        let store = store_with_messages();
        let screen = ChatScreen::new(ManagerType::ExecutiveCoach, Temperature::default(), 6);
        let view = ChatView {
            store: &store,
            screen: &screen,
            is_sending: true,
            is_fetching: false,
            last_error: None,
            debug_report: None,
        };

        let output = render(&view);

        assert!(output.contains("You:"));
        assert!(output.contains("Hi there"));
        assert!(output.contains("Coach:"));
        assert!(output.contains("Coach is typing…"));
        assert!(output.contains("Temperature 0.70"));
        assert!(output.contains("Executive Coach"));
    }

    #[test]
    fn error_replaces_hint_line() {
        let store = SessionStore::default();
        let screen = ChatScreen::new(ManagerType::CareerCoach, Temperature::default(), 6);
        let view = ChatView {
            store: &store,
            screen: &screen,
            is_sending: false,
            is_fetching: false,
            last_error: Some("Failed to send message: network down".into()),
            debug_report: None,
        };

        let output = render(&view);

        assert!(output.contains("Failed to send message: network down"));
        assert!(output.contains("Press Ctrl+N to start a conversation."));
    }

    #[test]
    fn newest_message_stays_visible_after_word_wrap() {
        let mut store = store_with_messages();
        let long_reply = vec!["abcdef"; 30].join(" ");
        for n in 0..3 {
            store.append_message(Message {
                id: format!("a{n}"),
                conversation_id: "c1".into(),
                role: Role::Assistant,
                content: long_reply.clone(),
                created_at: Utc::now(),
                is_loading: false,
            });
        }
        store.append_message(Message::optimistic_user("c1", "LASTLINE"));
        let screen = ChatScreen::new(ManagerType::ExecutiveCoach, Temperature::default(), 6);
        let view = ChatView {
            store: &store,
            screen: &screen,
            is_sending: true,
            is_fetching: false,
            last_error: None,
            debug_report: None,
        };

        let output = render_at(&view, 12, 20);

        assert!(output.contains("LASTLINE"), "{output}");
        assert!(output.contains("typing…"), "{output}");
    }

    #[test]
    fn scroll_back_reveals_older_rows() {
        let mut store = store_with_messages();
        store.append_message(Message::optimistic_user("c1", vec!["word"; 40].join(" ")));
        store.append_message(Message::optimistic_user("c1", "LASTLINE"));
        let mut screen = ChatScreen::new(ManagerType::ExecutiveCoach, Temperature::default(), 6);
        screen.scroll_back = 200;
        let view = ChatView {
            store: &store,
            screen: &screen,
            is_sending: false,
            is_fetching: false,
            last_error: None,
            debug_report: None,
        };

        let output = render_at(&view, 12, 20);

        assert!(output.contains("Hi there"), "{output}");
        assert!(!output.contains("LASTLINE"), "{output}");
    }
}
