//! HTTP surface of the coaching service.
//!
//! [`CoachApi`] is the seam between the conversation flow and the network;
//! [`client::HttpCoachApi`] is the reqwest-backed implementation used at
//! runtime, tests substitute their own.

use async_trait::async_trait;

use crate::core::conversation::{Conversation, ManagerType};
use crate::core::message::Message;
use crate::core::routes::OAuthProvider;
use crate::core::temperature::Temperature;
use crate::core::user::User;

pub mod client;
pub mod error;
pub mod models;

pub use client::HttpCoachApi;
pub use error::ApiError;
pub use models::OAuthCallbackResponse;

#[async_trait]
pub trait CoachApi: Send + Sync {
    async fn get_conversation_messages(
        &self,
        token: &str,
        conversation_id: &str,
    ) -> Result<Vec<Message>, ApiError>;

    async fn create_conversation(
        &self,
        token: &str,
        manager_type: ManagerType,
    ) -> Result<Conversation, ApiError>;

    /// Posts the user's text and returns the assistant's reply.
    async fn send_message(
        &self,
        token: &str,
        conversation_id: &str,
        user_query: &str,
        temperature: Option<Temperature>,
    ) -> Result<Message, ApiError>;

    async fn oauth2_callback(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<OAuthCallbackResponse, ApiError>;

    async fn current_user(&self, token: &str) -> Result<User, ApiError>;

    async fn list_conversations(&self, token: &str) -> Result<Vec<Conversation>, ApiError>;
}
