use serde::{Deserialize, Serialize};

use crate::core::conversation::ManagerType;
use crate::core::temperature::Temperature;
use crate::core::user::User;

#[derive(Debug, Serialize)]
pub struct CreateConversationRequest {
    pub manager_type: ManagerType,
}

#[derive(Debug, Serialize)]
pub struct SendMessageBody<'a> {
    pub user_query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
}

#[derive(Debug, Serialize)]
pub struct OAuthCallbackRequest<'a> {
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_body_omits_missing_temperature() {
        let body = SendMessageBody {
            user_query: "hi",
            temperature: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "user_query": "hi" })
        );
    }

    #[test]
    fn oauth_response_accepts_camel_case_user_name() {
        let response: OAuthCallbackResponse = serde_json::from_str(
            r#"{"token":"t","user":{"id":"u1","email":"a@example.com","fullName":"Ada"}}"#,
        )
        .unwrap();
        assert_eq!(response.user.full_name, "Ada");
    }
}
