//! Wire types and the gateway seam for the chat backend.
//!
//! Every backend response is wrapped in an [`Envelope`]. [`ChatBackend`] is
//! the async trait the controller talks to; [`client::ChatApi`] implements it
//! over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;
mod error;

pub use error::ApiError;

/// Standard `{success, data, error}` wrapper returned by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Data for list-style calls: a missing payload is an empty result, not a failure.
    pub fn into_data_or_default(self) -> T
    where
        T: Default,
    {
        self.data.unwrap_or_default()
    }

    /// Data for single-entity calls: `success:false` or a missing payload fails.
    pub fn into_required(self, fallback: &str) -> Result<T, ApiError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ApiError::Envelope(
                self.error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub session_id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

#[derive(Debug, Serialize)]
pub struct CreateChatRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
}

/// The four logical chat operations plus the liveness probe.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_chats(&self) -> Result<Vec<Chat>, ApiError>;

    async fn create_chat(&self, title: &str) -> Result<Chat, ApiError>;

    async fn get_history(&self, session_id: &str) -> Result<Vec<Message>, ApiError>;

    async fn send_message(&self, session_id: &str, content: &str) -> Result<Message, ApiError>;

    /// `true` only when the backend answered HTTP 200. Never fails.
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_data_defaults_for_lists() {
        let envelope: Envelope<Vec<Chat>> =
            serde_json::from_str(r#"{"success":true}"#).expect("valid envelope");
        assert!(envelope.into_data_or_default().is_empty());

        let envelope: Envelope<Vec<Chat>> =
            serde_json::from_str(r#"{"success":false,"error":"boom"}"#).expect("valid envelope");
        assert!(envelope.into_data_or_default().is_empty());
    }

    #[test]
    fn envelope_required_data_reports_backend_error_text() {
        let envelope: Envelope<Chat> =
            serde_json::from_str(r#"{"success":false,"error":"title too long"}"#)
                .expect("valid envelope");
        let err = envelope
            .into_required("Failed to create chat")
            .expect_err("unsuccessful envelope must fail");
        assert_eq!(err.to_string(), "title too long");
        assert!(!err.is_request_error());
    }

    #[test]
    fn envelope_missing_data_uses_fallback_message() {
        let envelope: Envelope<Message> =
            serde_json::from_str(r#"{"success":true}"#).expect("valid envelope");
        let err = envelope
            .into_required("Failed to send message")
            .expect_err("missing data must fail");
        assert_eq!(err.to_string(), "Failed to send message");
    }

    #[test]
    fn chat_deserializes_with_embedded_messages() {
        let raw = r#"{
            "id": 7,
            "session_id": "abc",
            "title": "Rust",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:05:00Z",
            "messages": [
                {"id": 1, "chat_id": 7, "role": "user", "content": "hi", "created_at": "2024-05-01T10:00:01Z"},
                {"id": 2, "chat_id": 7, "role": "assistant", "content": "**hello**", "created_at": "2024-05-01T10:00:02Z"}
            ]
        }"#;
        let chat: Chat = serde_json::from_str(raw).expect("chat should parse");
        let messages = chat.messages.expect("messages present");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let raw = r#"{"id":1,"chat_id":1,"role":"system","content":"x","created_at":""}"#;
        assert!(serde_json::from_str::<Message>(raw).is_err());
    }
}
