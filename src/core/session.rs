//! Client-side session state shared by every screen.
//!
//! [`SessionStore`] is plain data with the mutations the rest of the crate is
//! allowed to perform. [`SessionHandle`] wraps it for sharing between the UI
//! loop and spawned API tasks; callers go through short `read`/`update`
//! closures so the lock is never held across an HTTP round trip.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::conversation::Conversation;
use crate::core::message::Message;
use crate::core::temperature::Temperature;
use crate::core::user::User;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    user: Option<User>,
    token: Option<String>,
    current_conversation: Option<Conversation>,
    messages: Vec<Message>,
    temperature: Temperature,
}

impl SessionStore {
    pub fn new(temperature: Temperature) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn clear_user(&mut self) {
        self.user = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current_conversation.as_ref()
    }

    pub fn current_conversation_id(&self) -> Option<&str> {
        self.current_conversation
            .as_ref()
            .map(|conversation| conversation.conversation_id.as_str())
    }

    /// Makes `conversation` current. The message list always follows the
    /// current conversation, so it is emptied here rather than merged.
    pub fn set_current_conversation(&mut self, conversation: Conversation) {
        self.current_conversation = Some(conversation);
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: Temperature) {
        self.temperature = temperature;
    }

    /// Drops everything tied to the signed-in user. Temperature survives
    /// because it is a client preference.
    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        self.current_conversation = None;
        self.messages.clear();
    }
}

#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionStore>>,
}

impl SessionHandle {
    pub fn new(store: SessionStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&SessionStore) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut SessionStore) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    pub async fn snapshot(&self) -> SessionStore {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::ManagerType;
    use chrono::Utc;

    fn conversation(id: &str) -> Conversation {
        Conversation {
            conversation_id: id.to_string(),
            user_id: "u1".to_string(),
            manager_type: ManagerType::LifeCoach,
            created_at: Utc::now(),
            is_new: false,
            is_loading: false,
        }
    }

    #[test]
    fn switching_conversation_replaces_messages() {
        let mut store = SessionStore::default();
        store.set_current_conversation(conversation("a"));
        store.append_message(Message::optimistic_user("a", "first"));
        store.append_message(Message::optimistic_user("a", "second"));

        store.set_current_conversation(conversation("b"));

        assert_eq!(store.current_conversation_id(), Some("b"));
        assert!(store.messages().is_empty());
    }

    #[test]
    fn logout_keeps_temperature() {
        let mut store = SessionStore::new(Temperature::new(0.2));
        store.set_token("t");
        store.set_user(User {
            id: "u1".into(),
            email: "a@example.com".into(),
            full_name: "A".into(),
        });
        store.set_current_conversation(conversation("a"));

        store.logout();

        assert!(!store.is_authenticated());
        assert!(store.current_conversation().is_none());
        assert_eq!(store.temperature(), Temperature::new(0.2));
    }

    #[tokio::test]
    async fn handle_updates_are_visible_to_readers() {
        let handle = SessionHandle::default();
        let other = handle.clone();
        handle
            .update(|store| store.set_temperature(Temperature::new(0.33)))
            .await;
        let value = other.read(|store| store.temperature()).await;
        assert_eq!(value.to_string(), "0.33");
    }
}
