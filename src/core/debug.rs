//! State inspection and the "start over" reset.

use tracing::info;

use crate::core::controller::FlowError;
use crate::core::routes::Route;
use crate::core::session::{SessionHandle, SessionStore};
use crate::core::temperature::Temperature;
use crate::core::token_store::{TokenStore, TokenStoreError};
use crate::utils::mask::mask_secret;

/// A printable view of the client state. Secrets are masked.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugReport {
    pub api_base_url: String,
    pub token_storage: &'static str,
    pub token: Option<String>,
    pub user: Option<String>,
    pub conversation: Option<String>,
    pub message_count: usize,
    pub temperature: Temperature,
    pub last_error: Option<String>,
}

impl DebugReport {
    pub fn collect(
        api_base_url: &str,
        tokens: &TokenStore,
        store: &SessionStore,
        last_error: Option<&FlowError>,
    ) -> Self {
        let token = store
            .token()
            .map(str::to_string)
            .or_else(|| tokens.get_token().ok().flatten());

        Self {
            api_base_url: api_base_url.to_string(),
            token_storage: if tokens.is_persistent() {
                "keyring"
            } else {
                "memory"
            },
            token: token.map(|token| mask_secret(&token, 4)),
            user: store
                .user()
                .map(|user| format!("{} <{}>", user.display_name(), user.email)),
            conversation: store
                .current_conversation()
                .map(|c| format!("{} ({})", c.conversation_id, c.manager_type)),
            message_count: store.messages().len(),
            temperature: store.temperature(),
            last_error: last_error.map(ToString::to_string),
        }
    }

    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "(none)".into());
        vec![
            ("API", self.api_base_url.clone()),
            ("Token storage", self.token_storage.to_string()),
            ("Token", or_none(&self.token)),
            ("User", or_none(&self.user)),
            ("Conversation", or_none(&self.conversation)),
            ("Messages", self.message_count.to_string()),
            ("Temperature", self.temperature.to_string()),
            ("Last error", or_none(&self.last_error)),
        ]
    }
}

/// Clears the stored token and every piece of session state, including the
/// temperature, and routes to login.
pub async fn reset(session: &SessionHandle, tokens: &TokenStore) -> Result<Route, TokenStoreError> {
    tokens.clear()?;
    session
        .update(|store| *store = SessionStore::default())
        .await;
    info!("client state reset");
    Ok(Route::Login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::user::User;

    #[tokio::test]
    async fn reset_clears_everything() {
        let tokens = TokenStore::in_memory();
        tokens.set_token("secret-token").unwrap();
        let session = SessionHandle::new(SessionStore::new(Temperature::new(0.1)));
        session
            .update(|store| {
                store.set_token("secret-token");
                store.set_user(User {
                    id: "u".into(),
                    email: "e@example.com".into(),
                    full_name: String::new(),
                });
            })
            .await;

        let route = reset(&session, &tokens).await.unwrap();

        assert_eq!(route, Route::Login);
        assert_eq!(tokens.get_token().unwrap(), None);
        assert_eq!(session.snapshot().await, SessionStore::default());
    }

    #[test]
    fn report_masks_token() {
        let tokens = TokenStore::in_memory();
        let mut store = SessionStore::default();
        store.set_token("abcdefghijkl");

        let report = DebugReport::collect("http://localhost:8000/api", &tokens, &store, None);

        assert_eq!(report.token.as_deref(), Some("********ijkl"));
        assert_eq!(report.token_storage, "memory");
        let lines = report.lines();
        assert!(lines.contains(&("Temperature", "0.70".to_string())));
        assert!(lines.contains(&("User", "(none)".to_string())));
    }
}
