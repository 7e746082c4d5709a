//! Conversation flow: creating conversations, loading history and sending
//! messages, with the session store kept in step with each API result.
//!
//! Every failure is logged, recorded in [`ConversationController::last_error`]
//! and returned to the caller. An unauthenticated failure additionally clears
//! the session user so the UI falls back to the login screen.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::api::{ApiError, CoachApi};
use crate::core::conversation::{Conversation, ManagerType};
use crate::core::message::Message;
use crate::core::session::SessionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    StartConversation,
    SendMessage,
    FetchMessages,
    ListConversations,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::StartConversation => "start conversation",
            Operation::SendMessage => "send message",
            Operation::FetchMessages => "load messages",
            Operation::ListConversations => "list conversations",
        };
        f.write_str(label)
    }
}

/// The most recent failure, kept for display after the caller has handled
/// the `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowError {
    pub operation: Operation,
    pub message: String,
    pub unauthenticated: bool,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to {}: {}", self.operation, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub conversation_id: String,
    pub user_query: String,
}

/// Parameters for loading a conversation's history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagesQuery {
    pub conversation_id: Option<String>,
}

impl MessagesQuery {
    pub fn new(conversation_id: Option<String>) -> Self {
        Self { conversation_id }
    }

    pub fn enabled(&self) -> bool {
        self.conversation_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    /// History is not reloaded when the chat screen regains focus.
    pub fn refetch_on_focus(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No conversation id; nothing was requested.
    Disabled,
    /// The store now holds this many messages.
    Replaced(usize),
    /// The user switched conversations while the request was in flight; the
    /// result was dropped.
    Stale,
}

/// Decrements its counter when dropped so in-flight flags stay correct on
/// every exit path.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FlowState {
    sending: AtomicUsize,
    fetching: AtomicUsize,
    last_error: Mutex<Option<FlowError>>,
}

#[derive(Clone)]
pub struct ConversationController {
    api: Arc<dyn CoachApi>,
    session: SessionHandle,
    state: Arc<FlowState>,
}

impl ConversationController {
    pub fn new(api: Arc<dyn CoachApi>, session: SessionHandle) -> Self {
        Self {
            api,
            session,
            state: Arc::new(FlowState::default()),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// True while a `send_message` call is awaiting the API.
    pub fn is_sending(&self) -> bool {
        self.state.sending.load(Ordering::SeqCst) > 0
    }

    /// True while history is being loaded. Independent of `is_sending`.
    pub fn is_fetching(&self) -> bool {
        self.state.fetching.load(Ordering::SeqCst) > 0
    }

    pub fn last_error(&self) -> Option<FlowError> {
        self.lock_error().clone()
    }

    pub fn clear_error(&self) {
        *self.lock_error() = None;
    }

    pub async fn start_conversation(
        &self,
        manager_type: ManagerType,
    ) -> Result<Conversation, ApiError> {
        let token = self.token(Operation::StartConversation).await?;
        match self.api.create_conversation(&token, manager_type).await {
            Ok(conversation) => {
                let conversation = conversation.mark_new();
                info!(
                    conversation_id = %conversation.conversation_id,
                    manager_type = %manager_type,
                    "started conversation"
                );
                let current = conversation.clone();
                self.session
                    .update(move |store| store.set_current_conversation(current))
                    .await;
                self.clear_error();
                Ok(conversation)
            }
            Err(err) => Err(self.fail(Operation::StartConversation, err).await),
        }
    }

    /// Appends the user's message right away, then asks the API for the
    /// assistant reply and appends that too.
    ///
    /// If the request fails the user's message stays in the list. Messages
    /// for a conversation that is no longer current are not written to the
    /// store.
    pub async fn send_message(&self, request: SendMessageRequest) -> Result<Message, ApiError> {
        let SendMessageRequest {
            conversation_id,
            user_query,
        } = request;

        let optimistic = Message::optimistic_user(conversation_id.clone(), user_query.clone());
        let temperature = self
            .session
            .update(move |store| {
                if store.current_conversation_id() == Some(optimistic.conversation_id.as_str()) {
                    store.append_message(optimistic);
                }
                store.temperature()
            })
            .await;

        let _in_flight = InFlight::enter(&self.state.sending);
        let token = self.token(Operation::SendMessage).await?;
        debug!(%conversation_id, %temperature, "sending message");

        match self
            .api
            .send_message(&token, &conversation_id, &user_query, Some(temperature))
            .await
        {
            Ok(reply) => {
                let appended = reply.clone();
                self.session
                    .update(move |store| {
                        if store.current_conversation_id() == Some(conversation_id.as_str()) {
                            store.append_message(appended);
                        }
                    })
                    .await;
                self.clear_error();
                Ok(reply)
            }
            Err(err) => Err(self.fail(Operation::SendMessage, err).await),
        }
    }

    pub async fn fetch_messages(&self, query: &MessagesQuery) -> Result<FetchOutcome, ApiError> {
        let Some(conversation_id) = query.conversation_id.clone().filter(|_| query.enabled())
        else {
            return Ok(FetchOutcome::Disabled);
        };

        let _in_flight = InFlight::enter(&self.state.fetching);
        let token = self.token(Operation::FetchMessages).await?;

        match self
            .api
            .get_conversation_messages(&token, &conversation_id)
            .await
        {
            Ok(messages) => {
                let count = messages.len();
                let replaced = self
                    .session
                    .update(move |store| {
                        if store.current_conversation_id() == Some(conversation_id.as_str()) {
                            store.replace_messages(messages);
                            true
                        } else {
                            false
                        }
                    })
                    .await;
                if replaced {
                    debug!(count, "loaded conversation history");
                    Ok(FetchOutcome::Replaced(count))
                } else {
                    debug!("discarding history for a conversation that is no longer current");
                    Ok(FetchOutcome::Stale)
                }
            }
            Err(err) => Err(self.fail(Operation::FetchMessages, err).await),
        }
    }

    /// Makes an existing conversation current and loads its history.
    pub async fn select_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<FetchOutcome, ApiError> {
        let query = MessagesQuery::new(Some(conversation.conversation_id.clone()));
        self.session
            .update(move |store| store.set_current_conversation(conversation))
            .await;
        self.fetch_messages(&query).await
    }

    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let token = self.token(Operation::ListConversations).await?;
        match self.api.list_conversations(&token).await {
            Ok(mut conversations) => {
                conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(conversations)
            }
            Err(err) => Err(self.fail(Operation::ListConversations, err).await),
        }
    }

    async fn token(&self, operation: Operation) -> Result<String, ApiError> {
        let token = self
            .session
            .read(|store| store.token().map(str::to_string))
            .await;
        match token {
            Some(token) => Ok(token),
            None => Err(self.fail(operation, ApiError::MissingToken).await),
        }
    }

    async fn fail(&self, operation: Operation, err: ApiError) -> ApiError {
        let unauthenticated = err.is_unauthenticated();
        warn!(
            %operation,
            error = %err,
            status = ?err.status(),
            unauthenticated,
            "api call failed"
        );
        if unauthenticated {
            self.session.update(|store| store.clear_user()).await;
        }
        *self.lock_error() = Some(FlowError {
            operation,
            message: err.to_string(),
            unauthenticated,
        });
        err
    }

    fn lock_error(&self) -> std::sync::MutexGuard<'_, Option<FlowError>> {
        self.state
            .last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
