//! Interactive chat screen.
//!
//! The loop owns the terminal and a [`ChatScreen`]. API work runs in spawned
//! tokio tasks that report back as [`ChatEvent`]s on the same channel the
//! terminal reader uses, so the loop only ever waits in one place.

pub mod lifecycle;
pub mod screen;

use std::error::Error;
use std::time::Duration;

use ratatui::backend::Backend;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::core::controller::{
    ConversationController, FetchOutcome, MessagesQuery, SendMessageRequest,
};
use crate::core::conversation::{Conversation, ManagerType};
use crate::core::debug::{self as debug_tools, DebugReport};
use crate::core::message::Message;
use crate::core::routes::Route;
use crate::core::token_store::{TokenStore, TokenStoreError};
use crate::ui::renderer::{ui, ChatView};

use lifecycle::{restore_terminal, setup_terminal};
use screen::{ChatScreen, ScreenAction};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum ChatEvent {
    Terminal(Event),
    Started(Result<Conversation, ApiError>),
    Sent(Result<Message, ApiError>),
    Loaded(Result<FetchOutcome, ApiError>),
    ConversationNotFound(String),
    Reset(Result<Route, TokenStoreError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatExit {
    Quit,
    /// The server rejected the session; the user has been cleared.
    SignedOut,
    /// Client state was wiped from the debug panel.
    Reset,
}

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub api_base_url: String,
    pub conversation_id: Option<String>,
    pub manager: ManagerType,
    pub input_max_height: u16,
}

pub async fn run_chat(
    controller: ConversationController,
    tokens: TokenStore,
    options: ChatOptions,
) -> Result<ChatExit, Box<dyn Error>> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<ChatEvent>();
    spawn_open_conversation(
        controller.clone(),
        options.conversation_id.clone(),
        options.manager,
        event_tx.clone(),
    );

    let mut terminal = setup_terminal()?;
    let reader = spawn_event_reader(event_tx.clone());

    let result = drive(
        &mut terminal,
        &controller,
        &tokens,
        &options,
        event_tx,
        event_rx,
    )
    .await;

    reader.abort();
    restore_terminal(&mut terminal)?;
    result
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<ChatEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(ChatEvent::Terminal(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Resumes `requested` when it names one of the user's conversations,
/// otherwise starts a fresh one with `manager`.
fn spawn_open_conversation(
    controller: ConversationController,
    requested: Option<String>,
    manager: ManagerType,
    tx: mpsc::UnboundedSender<ChatEvent>,
) {
    tokio::spawn(async move {
        let event = match requested {
            Some(id) => match controller.list_conversations().await {
                Ok(conversations) => {
                    match conversations.into_iter().find(|c| c.conversation_id == id) {
                        Some(conversation) => {
                            ChatEvent::Loaded(controller.select_conversation(conversation).await)
                        }
                        None => ChatEvent::ConversationNotFound(id),
                    }
                }
                Err(err) => ChatEvent::Loaded(Err(err)),
            },
            None => ChatEvent::Started(controller.start_conversation(manager).await),
        };
        let _ = tx.send(event);
    });
}

fn spawn_send(
    controller: ConversationController,
    request: SendMessageRequest,
    tx: mpsc::UnboundedSender<ChatEvent>,
) {
    tokio::spawn(async move {
        let result = controller.send_message(request).await;
        let _ = tx.send(ChatEvent::Sent(result));
    });
}

fn spawn_start(
    controller: ConversationController,
    manager: ManagerType,
    tx: mpsc::UnboundedSender<ChatEvent>,
) {
    tokio::spawn(async move {
        let result = controller.start_conversation(manager).await;
        let _ = tx.send(ChatEvent::Started(result));
    });
}

fn spawn_fetch(
    controller: ConversationController,
    query: MessagesQuery,
    tx: mpsc::UnboundedSender<ChatEvent>,
) {
    tokio::spawn(async move {
        let result = controller.fetch_messages(&query).await;
        let _ = tx.send(ChatEvent::Loaded(result));
    });
}

fn spawn_reset(
    controller: ConversationController,
    tokens: TokenStore,
    tx: mpsc::UnboundedSender<ChatEvent>,
) {
    tokio::spawn(async move {
        let result = debug_tools::reset(controller.session(), &tokens).await;
        let _ = tx.send(ChatEvent::Reset(result));
    });
}

/// Runs the screen against any backend until the user leaves or the session
/// ends.
pub async fn drive<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &ConversationController,
    tokens: &TokenStore,
    options: &ChatOptions,
    event_tx: mpsc::UnboundedSender<ChatEvent>,
    mut event_rx: mpsc::UnboundedReceiver<ChatEvent>,
) -> Result<ChatExit, Box<dyn Error>> {
    let session = controller.session().clone();
    let initial_temperature = session.read(|store| store.temperature()).await;
    let mut screen = ChatScreen::new(
        options.manager,
        initial_temperature,
        options.input_max_height,
    );
    // Sends spawned but not yet reported back. Covers the gap before the
    // task reaches the controller.
    let mut pending_sends = 0usize;
    let mut reset_pending = false;

    loop {
        let store = session.snapshot().await;
        if !store.is_authenticated() && !reset_pending {
            info!("session ended; leaving chat");
            return Ok(ChatExit::SignedOut);
        }
        if store.temperature() != screen.temperature.value() {
            screen.temperature.sync_from(store.temperature());
        }
        screen.set_sending(pending_sends > 0 || controller.is_sending());

        let last_error = controller.last_error();
        let report = screen.debug.is_visible().then(|| {
            DebugReport::collect(&options.api_base_url, tokens, &store, last_error.as_ref())
        });
        let view = ChatView {
            store: &store,
            screen: &screen,
            is_sending: pending_sends > 0 || controller.is_sending(),
            is_fetching: controller.is_fetching(),
            last_error: last_error.as_ref().map(ToString::to_string),
            debug_report: report.as_ref(),
        };
        terminal.draw(|f| ui(f, &view))?;

        let event = match tokio::time::timeout(TICK, event_rx.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(ChatExit::Quit),
            Err(_) => continue,
        };

        match event {
            ChatEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                match screen.handle_key(key) {
                    ScreenAction::Quit => return Ok(ChatExit::Quit),
                    ScreenAction::Send(text) => match store.current_conversation_id() {
                        Some(conversation_id) => {
                            pending_sends += 1;
                            spawn_send(
                                controller.clone(),
                                SendMessageRequest {
                                    conversation_id: conversation_id.to_string(),
                                    user_query: text,
                                },
                                event_tx.clone(),
                            );
                        }
                        None => {
                            screen.input.set_text(&text);
                            screen.notify("No conversation yet. Press Ctrl+N to start one.");
                        }
                    },
                    ScreenAction::StartConversation(manager) => {
                        screen.notify(format!(
                            "Starting a conversation with your {}…",
                            manager.display_name()
                        ));
                        spawn_start(controller.clone(), manager, event_tx.clone());
                    }
                    ScreenAction::TemperatureChanged(value) => {
                        session.update(|store| store.set_temperature(value)).await;
                    }
                    ScreenAction::ResetRequested => {
                        reset_pending = true;
                        spawn_reset(controller.clone(), tokens.clone(), event_tx.clone());
                    }
                    ScreenAction::Redraw | ScreenAction::None => {}
                }
            }
            ChatEvent::Terminal(Event::Paste(text)) => {
                screen.handle_paste(&text);
            }
            ChatEvent::Terminal(Event::FocusGained) => {
                let query = MessagesQuery::new(store.current_conversation_id().map(str::to_string));
                if query.refetch_on_focus() && query.enabled() {
                    spawn_fetch(controller.clone(), query, event_tx.clone());
                }
            }
            ChatEvent::Terminal(_) => {}
            ChatEvent::Started(Ok(conversation)) => {
                screen.scroll_back = 0;
                screen.notify(format!(
                    "New conversation with your {}",
                    conversation.manager_type.display_name()
                ));
            }
            ChatEvent::Sent(result) => {
                pending_sends = pending_sends.saturating_sub(1);
                if let Ok(reply) = result {
                    debug!(message_id = %reply.id, "reply received");
                }
            }
            ChatEvent::Loaded(Ok(FetchOutcome::Replaced(count))) => {
                debug!(count, "history loaded");
            }
            ChatEvent::ConversationNotFound(id) => {
                warn!(conversation_id = %id, "requested conversation not found");
                screen.notify(format!(
                    "Conversation {id} was not found. Press Ctrl+N to start a new one."
                ));
            }
            ChatEvent::Reset(Ok(route)) => {
                info!(route = %route.path(), "state reset from chat");
                return Ok(ChatExit::Reset);
            }
            ChatEvent::Reset(Err(err)) => {
                reset_pending = false;
                screen.notify(format!("Reset failed: {err}"));
            }
            // Failures are already recorded by the controller and shown
            // from `last_error`.
            ChatEvent::Started(Err(_)) | ChatEvent::Loaded(_) => {}
        }
    }
}
