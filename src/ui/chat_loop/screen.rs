//! Key handling for the chat screen.
//!
//! `ChatScreen` owns the widgets' local state and turns key presses into
//! [`ScreenAction`]s. Anything that talks to the API is left to the event
//! loop, which keeps this type synchronous and easy to test.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::conversation::ManagerType;
use crate::core::temperature::Temperature;
use crate::ui::debug_panel::DebugPanel;
use crate::ui::edit_modal::{EditDraftModal, ModalOutcome};
use crate::ui::message_input::{InputOutcome, MessageInput};
use crate::ui::temperature::TemperatureControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Temperature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    Redraw,
    Quit,
    Send(String),
    StartConversation(ManagerType),
    TemperatureChanged(Temperature),
    ResetRequested,
}

pub struct ChatScreen {
    pub input: MessageInput,
    pub modal: EditDraftModal,
    pub temperature: TemperatureControl,
    pub debug: DebugPanel,
    pub focus: Focus,
    pub manager: ManagerType,
    /// Transient notice shown in the status line until the next key press.
    pub status: Option<String>,
    /// Rows scrolled up from the bottom of the transcript.
    pub scroll_back: u16,
}

impl ChatScreen {
    pub fn new(manager: ManagerType, temperature: Temperature, input_max_height: u16) -> Self {
        Self {
            input: MessageInput::new(input_max_height),
            modal: EditDraftModal::new(),
            temperature: TemperatureControl::new(temperature),
            debug: DebugPanel::default(),
            focus: Focus::Input,
            manager,
            status: None,
            scroll_back: 0,
        }
    }

    pub fn set_sending(&mut self, sending: bool) {
        self.input.set_disabled(sending);
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn handle_paste(&mut self, text: &str) -> ScreenAction {
        if self.modal.is_visible() || self.debug.is_visible() {
            return ScreenAction::None;
        }
        self.input.insert_paste(text);
        ScreenAction::Redraw
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return ScreenAction::Quit;
        }
        self.status = None;

        if self.modal.is_visible() {
            if let ModalOutcome::Saved(text) = self.modal.handle_key(key) {
                self.input.set_text(&text);
                self.focus = Focus::Input;
            }
            return ScreenAction::Redraw;
        }

        if self.debug.is_visible() {
            return match key.code {
                KeyCode::F(2) | KeyCode::Esc => {
                    self.debug.hide();
                    ScreenAction::Redraw
                }
                KeyCode::Char('r') if ctrl => {
                    self.debug.hide();
                    ScreenAction::ResetRequested
                }
                _ => ScreenAction::None,
            };
        }

        match key.code {
            KeyCode::F(2) => {
                self.debug.toggle();
                return ScreenAction::Redraw;
            }
            KeyCode::Esc => return ScreenAction::Quit,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Input => Focus::Temperature,
                    Focus::Temperature => Focus::Input,
                };
                return ScreenAction::Redraw;
            }
            KeyCode::Char('n') if ctrl => {
                self.scroll_back = 0;
                return ScreenAction::StartConversation(self.manager);
            }
            KeyCode::Char('e') if ctrl => {
                self.modal.open(&self.input.text());
                return ScreenAction::Redraw;
            }
            _ => {}
        }

        match self.focus {
            Focus::Temperature => match self.temperature.handle_key(key) {
                Some(value) => ScreenAction::TemperatureChanged(value),
                None => ScreenAction::None,
            },
            Focus::Input => match key.code {
                KeyCode::PageUp => {
                    self.scroll_back = self.scroll_back.saturating_add(5);
                    ScreenAction::Redraw
                }
                KeyCode::PageDown => {
                    self.scroll_back = self.scroll_back.saturating_sub(5);
                    ScreenAction::Redraw
                }
                _ => match self.input.handle_key(key) {
                    InputOutcome::Submitted(text) => {
                        self.scroll_back = 0;
                        ScreenAction::Send(text)
                    }
                    InputOutcome::Edited => ScreenAction::Redraw,
                    InputOutcome::Ignored => ScreenAction::None,
                },
            },
        }
    }
}
