//! Client-side chat state and the operations that mutate it.
//!
//! [`ChatController`] is a cheap, clonable handle. Each operation takes the
//! state lock only for synchronous slices and never across a gateway call, so
//! operations started independently interleave and the last write wins. Every
//! operation replaces whole slices of state (the chat list or the transcript)
//! rather than patching them.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{ApiError, Chat, ChatBackend, Message, Role};

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    /// Most recently created first.
    pub chats: Vec<Chat>,
    pub current_chat: Option<Chat>,
    /// Transcript of `current_chat`, in backend order.
    pub messages: Vec<Message>,
    pub loading: bool,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub enum ChatError {
    NoChatSelected,
    Api(ApiError),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::NoChatSelected => f.write_str("No chat selected"),
            ChatError::Api(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for ChatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChatError::NoChatSelected => None,
            ChatError::Api(err) => Some(err),
        }
    }
}

impl From<ApiError> for ChatError {
    fn from(err: ApiError) -> Self {
        ChatError::Api(err)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    /// Drop results of list/history fetches that a newer fetch has superseded.
    pub discard_stale_responses: bool,
}

#[derive(Default)]
struct Inner {
    state: ChatState,
    list_generation: u64,
    history_generation: u64,
}

impl Inner {
    fn begin(&mut self) {
        self.state.loading = true;
        self.state.last_error = None;
    }

    fn fail(&mut self, err: &dyn fmt::Display) {
        self.state.last_error = Some(err.to_string());
    }
}

#[derive(Clone)]
pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    inner: Arc<Mutex<Inner>>,
    options: ControllerOptions,
}

impl ChatController {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self::with_options(backend, ControllerOptions::default())
    }

    pub fn with_options(backend: Arc<dyn ChatBackend>, options: ControllerOptions) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(Inner::default())),
            options,
        }
    }

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    pub async fn snapshot(&self) -> ChatState {
        self.inner.lock().await.state.clone()
    }

    /// Run `f` against the current state without cloning it.
    pub async fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&ChatState) -> T,
    {
        let guard = self.inner.lock().await;
        f(&guard.state)
    }

    pub async fn load_chats(&self) {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.begin();
            inner.list_generation += 1;
            inner.list_generation
        };

        let result = self.backend.list_chats().await;

        let mut inner = self.inner.lock().await;
        if self.is_stale(generation, inner.list_generation) {
            // The newer fetch owns `loading`.
            debug!(generation, "dropping superseded chat list");
            return;
        }
        match result {
            Ok(chats) => {
                debug!(count = chats.len(), "loaded chats");
                inner.state.chats = chats;
            }
            Err(err) => {
                warn!(error = %err, "failed to load chats");
                inner.fail(&err);
            }
        }
        inner.state.loading = false;
    }

    /// Create a chat, make it current, and start it with an empty transcript.
    /// A blank title is replaced by a timestamped default.
    pub async fn create_chat(&self, title: &str) -> Result<Chat, ChatError> {
        let title = resolve_chat_title(title, Local::now());
        self.inner.lock().await.begin();

        let result = self.backend.create_chat(&title).await;

        let mut inner = self.inner.lock().await;
        inner.state.loading = false;
        match result {
            Ok(chat) => {
                debug!(session_id = %chat.session_id, "created chat");
                inner.state.chats.insert(0, chat.clone());
                inner.state.current_chat = Some(chat.clone());
                inner.state.messages.clear();
                // A fresh chat supersedes any history fetch still in flight.
                inner.history_generation += 1;
                Ok(chat)
            }
            Err(err) => {
                warn!(error = %err, "failed to create chat");
                inner.fail(&err);
                Err(err.into())
            }
        }
    }

    /// Make `chat` current right away, then replace the transcript with its
    /// history. Re-fetches even when `chat` is already current.
    pub async fn select_chat(&self, chat: Chat) {
        let session_id = chat.session_id.clone();
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.begin();
            inner.state.current_chat = Some(chat);
            inner.history_generation += 1;
            inner.history_generation
        };

        let result = self.backend.get_history(&session_id).await;

        let mut inner = self.inner.lock().await;
        if self.is_stale(generation, inner.history_generation) {
            debug!(%session_id, generation, "dropping superseded history");
            return;
        }
        match result {
            Ok(history) => inner.state.messages = history,
            Err(err) => {
                warn!(%session_id, error = %err, "failed to load chat history");
                inner.fail(&err);
            }
        }
        inner.state.loading = false;
    }

    /// Append `content` optimistically, send it, then replace the transcript
    /// with the backend's history (which carries the assistant reply).
    ///
    /// The optimistic message is only reconciled or rolled back while its chat
    /// is still current, so switching chats mid-send never touches the new
    /// chat's transcript.
    pub async fn send_message(&self, content: &str) -> Result<(), ChatError> {
        let (session_id, optimistic, generation) = {
            let mut inner = self.inner.lock().await;
            let Some(chat) = inner.state.current_chat.as_ref() else {
                return Err(ChatError::NoChatSelected);
            };
            let session_id = chat.session_id.clone();
            let optimistic = optimistic_user_message(chat.id, content, Utc::now());
            inner.begin();
            inner.state.messages.push(optimistic.clone());
            inner.history_generation += 1;
            (session_id, optimistic, inner.history_generation)
        };

        let result = self
            .send_and_refresh(&session_id, content, optimistic, generation)
            .await;

        let mut inner = self.inner.lock().await;
        if self.is_stale(generation, inner.history_generation) {
            debug!(%session_id, generation, "dropping superseded send result");
            return match result {
                Ok(_) => Ok(()),
                Err(err) => {
                    warn!(%session_id, error = %err, "failed to send message");
                    inner.fail(&err);
                    Err(err.into())
                }
            };
        }
        inner.state.loading = false;
        match result {
            Ok(history) => {
                inner.state.messages = history;
                Ok(())
            }
            Err(err) => {
                warn!(%session_id, error = %err, "failed to send message");
                inner.fail(&err);
                if self.owns_transcript(&inner, &session_id, generation) {
                    inner.state.messages.pop();
                }
                Err(err.into())
            }
        }
    }

    async fn send_and_refresh(
        &self,
        session_id: &str,
        content: &str,
        optimistic: Message,
        generation: u64,
    ) -> Result<Vec<Message>, ApiError> {
        let confirmed = self.backend.send_message(session_id, content).await?;

        {
            let mut inner = self.inner.lock().await;
            if self.owns_transcript(&inner, session_id, generation) {
                if let Some(last) = inner.state.messages.last_mut() {
                    *last = Message {
                        id: confirmed.id,
                        ..optimistic
                    };
                }
            }
        }

        self.backend.get_history(session_id).await
    }

    pub async fn clear_error(&self) {
        self.inner.lock().await.state.last_error = None;
    }

    /// Hand the pending error to the caller exactly once.
    pub async fn take_error(&self) -> Option<String> {
        self.inner.lock().await.state.last_error.take()
    }

    fn is_stale(&self, generation: u64, latest: u64) -> bool {
        self.options.discard_stale_responses && generation != latest
    }

    /// Whether the transcript still holds the optimistic message of a send
    /// started at `generation` on `session_id`.
    fn owns_transcript(&self, inner: &Inner, session_id: &str, generation: u64) -> bool {
        let same_chat = inner
            .state
            .current_chat
            .as_ref()
            .is_some_and(|chat| chat.session_id == session_id);
        same_chat && !self.is_stale(generation, inner.history_generation)
    }
}

/// Build the local stand-in for a user message before the backend assigns an id.
pub fn optimistic_user_message(chat_id: i64, content: &str, now: DateTime<Utc>) -> Message {
    Message {
        id: now.timestamp_millis(),
        chat_id,
        role: Role::User,
        content: content.to_string(),
        created_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }
}

/// `title` as given, or `Chat <local date-time>` when it is blank.
pub fn resolve_chat_title(title: &str, now: DateTime<Local>) -> String {
    if title.trim().is_empty() {
        format!("Chat {}", now.format("%Y-%m-%d %H:%M:%S"))
    } else {
        title.to_string()
    }
}
