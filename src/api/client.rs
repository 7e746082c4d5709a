use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ApiError;
use super::models::{
    CreateConversationRequest, OAuthCallbackRequest, OAuthCallbackResponse, SendMessageBody,
};
use super::CoachApi;
use crate::core::conversation::{Conversation, ManagerType};
use crate::core::message::Message;
use crate::core::routes::OAuthProvider;
use crate::core::temperature::Temperature;
use crate::core::user::User;
use crate::utils::url::{construct_api_url, normalize_base_url};

#[derive(Debug, Clone)]
pub struct HttpCoachApi {
    client: Client,
    base_url: String,
}

impl HttpCoachApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        construct_api_url(&self.base_url, endpoint)
    }

    /// `{base}/conversations/{id}/messages`, with the id percent-encoded as
    /// a single path segment.
    fn messages_url(&self, conversation_id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["conversations", conversation_id, "messages"]);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> Result<RequestBuilder, ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }
        Ok(request
            .header("Content-Type", "application/json")
            .bearer_auth(token))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        debug!(%status, url = %response.url(), "api response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, body));
        }

        response.json::<T>().await.map_err(ApiError::Decode)
    }
}

#[async_trait]
impl CoachApi for HttpCoachApi {
    async fn get_conversation_messages(
        &self,
        token: &str,
        conversation_id: &str,
    ) -> Result<Vec<Message>, ApiError> {
        let url = self.messages_url(conversation_id)?;
        let request = self.authorized(self.client.get(url), token)?;
        self.execute(request).await
    }

    async fn create_conversation(
        &self,
        token: &str,
        manager_type: ManagerType,
    ) -> Result<Conversation, ApiError> {
        let request = self
            .authorized(self.client.post(self.url("conversations")), token)?
            .json(&CreateConversationRequest { manager_type });
        self.execute(request).await
    }

    async fn send_message(
        &self,
        token: &str,
        conversation_id: &str,
        user_query: &str,
        temperature: Option<Temperature>,
    ) -> Result<Message, ApiError> {
        let url = self.messages_url(conversation_id)?;
        let request = self
            .authorized(self.client.post(url), token)?
            .json(&SendMessageBody {
                user_query,
                temperature,
            });
        self.execute(request).await
    }

    async fn oauth2_callback(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<OAuthCallbackResponse, ApiError> {
        let url = self.url(&format!("auth/{}/callback", provider.as_str()));
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&OAuthCallbackRequest { code, redirect_uri });
        self.execute(request).await
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let request = self.authorized(self.client.get(self.url("auth/me")), token)?;
        self.execute(request).await
    }

    async fn list_conversations(&self, token: &str) -> Result<Vec<Conversation>, ApiError> {
        let request = self.authorized(self.client.get(self.url("conversations")), token)?;
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn assistant_json(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "m2",
            "conversation_id": "c1",
            "role": "assistant",
            "content": content,
            "created_at": "2024-05-01T10:00:05Z"
        })
    }

    #[tokio::test]
    async fn send_message_posts_query_with_bearer_token() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/conversations/c1/messages"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({
                "user_query": "How do I ask for a raise?",
                "temperature": 0.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(assistant_json("Start with data.")))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpCoachApi::new(&format!("{}/api/", server.uri()));
        let reply = api
            .send_message(
                "tok",
                "c1",
                "How do I ask for a raise?",
                Some(Temperature::new(0.5)),
            )
            .await
            .expect("reply");

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Start with data.");
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_unauthenticated() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations/c1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let api = HttpCoachApi::new(&server.uri());
        let err = api
            .get_conversation_messages("stale", "c1")
            .await
            .expect_err("should fail");
        assert!(err.is_unauthenticated());
    }

    #[tokio::test]
    async fn server_errors_keep_status_and_body() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversations"))
            .and(body_json(serde_json::json!({ "manager_type": "life_coach" })))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let api = HttpCoachApi::new(&server.uri());
        let err = api
            .create_conversation("tok", ManagerType::LifeCoach)
            .await
            .expect_err("should fail");
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn oauth_callback_is_unauthenticated_request() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/github/callback"))
            .and(body_json(serde_json::json!({ "code": "xyz" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "fresh",
                "user": { "id": "u1", "email": "ada@example.com", "full_name": "Ada" }
            })))
            .mount(&server)
            .await;

        let api = HttpCoachApi::new(&server.uri());
        let response = api
            .oauth2_callback(OAuthProvider::Github, "xyz", None)
            .await
            .expect("exchange");
        assert_eq!(response.token, "fresh");
        assert_eq!(response.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let api = HttpCoachApi::new(&server.uri());
        let err = api.current_user("tok").await.expect_err("should fail");
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn conversation_id_is_encoded_as_one_path_segment() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations/a%2Fb%3Fc%23d/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpCoachApi::new(&server.uri());
        let messages = api
            .get_conversation_messages("tok", "a/b?c#d")
            .await
            .expect("messages");
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn base_without_path_support_is_invalid_url() {
        let api = HttpCoachApi::new("mailto:coach@example.com");
        let err = api
            .send_message("tok", "c1", "hi", None)
            .await
            .expect_err("should fail");
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn empty_token_is_rejected_before_sending() {
        let api = HttpCoachApi::new("http://127.0.0.1:9");
        let err = api.list_conversations("  ").await.expect_err("should fail");
        assert!(matches!(err, ApiError::MissingToken));
    }
}
