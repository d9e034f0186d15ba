//! TUI-less "say" command: send one message and print the reply.

use crate::api::{ApiError, ChatBackend, Message};

/// Messages that follow `sent` in `history`, i.e. the assistant's reply.
///
/// The sent message is located by id. A backend that re-numbers messages on
/// the history call is handled by falling back to the last user message with
/// the same content.
pub fn reply_after<'a>(history: &'a [Message], sent: &Message) -> &'a [Message] {
    let position = history
        .iter()
        .position(|m| m.id == sent.id && m.role == sent.role)
        .or_else(|| {
            history
                .iter()
                .rposition(|m| m.role.is_user() && m.content == sent.content)
        });
    match position {
        Some(idx) => &history[idx + 1..],
        None => &[],
    }
}

pub async fn run_say(
    backend: &dyn ChatBackend,
    session_id: &str,
    message: &str,
) -> Result<Vec<Message>, ApiError> {
    let sent = backend.send_message(session_id, message).await?;
    let history = backend.get_history(session_id).await?;
    Ok(reply_after(&history, &sent).to_vec())
}
