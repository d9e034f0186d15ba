use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{
    ApiError, Chat, ChatBackend, CreateChatRequest, Envelope, Message, SendMessageRequest,
};
use crate::utils::url::{endpoint_url, API_BASE_SEGMENTS};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP gateway to the chat backend.
#[derive(Clone, Debug)]
pub struct ChatApi {
    client: reqwest::Client,
    server: Url,
    timeout: Duration,
}

impl ChatApi {
    pub fn new(server: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::transport(server.as_str(), timeout, source))?;
        Ok(Self::with_client(client, server, timeout))
    }

    pub fn with_client(client: reqwest::Client, server: Url, timeout: Duration) -> Self {
        Self {
            client,
            server,
            timeout,
        }
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    fn api_url(&self, path: &[&str]) -> Url {
        let segments: Vec<&str> = API_BASE_SEGMENTS.iter().chain(path).copied().collect();
        endpoint_url(&self.server, &segments)
    }

    async fn get_envelope<T: DeserializeOwned>(&self, url: Url) -> Result<Envelope<T>, ApiError> {
        debug!(%url, "GET");
        let request = self.client.get(url.clone());
        self.execute(url, request).await
    }

    async fn post_envelope<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Envelope<T>, ApiError> {
        debug!(%url, "POST");
        let request = self.client.post(url.clone()).json(body);
        self.execute(url, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: Url,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| {
                warn!(%url, error = %source, "request failed");
                ApiError::transport(url.as_str(), self.timeout, source)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, %status, "server returned an error status");
            return Err(ApiError::status(url.as_str(), status, &body));
        }

        response
            .json::<Envelope<T>>()
            .await
            .map_err(|source| ApiError::transport(url.as_str(), self.timeout, source))
    }
}

#[async_trait]
impl ChatBackend for ChatApi {
    async fn list_chats(&self) -> Result<Vec<Chat>, ApiError> {
        let envelope: Envelope<Vec<Chat>> = self.get_envelope(self.api_url(&["chats"])).await?;
        Ok(envelope.into_data_or_default())
    }

    async fn create_chat(&self, title: &str) -> Result<Chat, ApiError> {
        let envelope: Envelope<Chat> = self
            .post_envelope(self.api_url(&["chats"]), &CreateChatRequest { title })
            .await?;
        envelope.into_required("Failed to create chat")
    }

    async fn get_history(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        let envelope: Envelope<Chat> = self
            .get_envelope(self.api_url(&["chats", session_id]))
            .await?;
        Ok(envelope
            .data
            .and_then(|chat| chat.messages)
            .unwrap_or_default())
    }

    async fn send_message(&self, session_id: &str, content: &str) -> Result<Message, ApiError> {
        let envelope: Envelope<Message> = self
            .post_envelope(
                self.api_url(&["chats", session_id, "messages"]),
                &SendMessageRequest { message: content },
            )
            .await?;
        envelope.into_required("Failed to send message")
    }

    async fn health_check(&self) -> bool {
        let url = endpoint_url(&self.server, &["health"]);
        match self.client.get(url.clone()).timeout(self.timeout).send().await {
            Ok(response) => {
                let online = response.status() == reqwest::StatusCode::OK;
                debug!(%url, status = %response.status(), online, "health probe");
                online
            }
            Err(e) => {
                debug!(%url, error = %e, "health probe failed");
                false
            }
        }
    }
}
