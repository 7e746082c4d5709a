//! Slider for the sampling temperature.
//!
//! The control keeps its own copy of the value so it can render without
//! locking the session; the chat loop writes every change back to the
//! session and calls [`TemperatureControl::sync_from`] when the session
//! changes underneath it.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::LineGauge;
use ratatui::Frame;

use crate::core::temperature::Temperature;

const FINE_STEP: i16 = 1;
const COARSE_STEP: i16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemperatureControl {
    value: Temperature,
}

impl TemperatureControl {
    pub fn new(value: Temperature) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Temperature {
        self.value
    }

    pub fn sync_from(&mut self, value: Temperature) {
        self.value = value;
    }

    /// Returns the new value when the key moved the slider.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Temperature> {
        let next = match key.code {
            KeyCode::Left | KeyCode::Down => self.value.step_by(-FINE_STEP),
            KeyCode::Right | KeyCode::Up => self.value.step_by(FINE_STEP),
            KeyCode::PageDown => self.value.step_by(-COARSE_STEP),
            KeyCode::PageUp => self.value.step_by(COARSE_STEP),
            KeyCode::Home => Temperature::min(),
            KeyCode::End => Temperature::max(),
            _ => return None,
        };
        if next == self.value {
            return None;
        }
        self.value = next;
        Some(next)
    }

    pub fn label(&self) -> String {
        format!("Temperature {}", self.value)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let accent = if focused { Color::Yellow } else { Color::Gray };
        let gauge = LineGauge::default()
            .filled_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .unfilled_style(Style::default().fg(Color::DarkGray))
            .line_set(symbols::line::THICK)
            .label(self.label())
            .ratio(f64::from(self.value.hundredths()) / 100.0);
        frame.render_widget(gauge, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::Terminal;

    fn press(control: &mut TemperatureControl, code: KeyCode) -> Option<Temperature> {
        control.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn arrows_move_by_one_hundredth() {
        let mut control = TemperatureControl::new(Temperature::new(0.5));
        assert_eq!(press(&mut control, KeyCode::Right), Some(Temperature::new(0.51)));
        assert_eq!(press(&mut control, KeyCode::Left), Some(Temperature::new(0.5)));
        assert_eq!(press(&mut control, KeyCode::Left), Some(Temperature::new(0.49)));
    }

    #[test]
    fn page_keys_move_coarsely_and_saturate() {
        let mut control = TemperatureControl::new(Temperature::new(0.95));
        assert_eq!(press(&mut control, KeyCode::PageUp), Some(Temperature::max()));
        assert_eq!(press(&mut control, KeyCode::PageUp), None);
        assert_eq!(press(&mut control, KeyCode::Home), Some(Temperature::min()));
        assert_eq!(press(&mut control, KeyCode::PageDown), None);
        assert_eq!(press(&mut control, KeyCode::Char('x')), None);
    }

    #[test]
    fn sync_clamps_and_label_has_two_decimals() {
        let mut control = TemperatureControl::default();
        assert_eq!(control.label(), "Temperature 0.70");
        control.sync_from(Temperature::new(3.0));
        assert_eq!(control.label(), "Temperature 1.00");
        control.sync_from(Temperature::new(0.1));
        assert_eq!(control.label(), "Temperature 0.10");
    }

    #[test]
    fn renders_label() {
        let control = TemperatureControl::new(Temperature::new(0.25));
        let mut terminal = Terminal::new(TestBackend::new(40, 1)).unwrap();
        terminal
            .draw(|f| control.render(f, f.area(), true))
            .unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Temperature 0.25"), "{rendered}");
    }
}
