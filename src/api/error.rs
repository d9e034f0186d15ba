use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// Failures surfaced by the chat gateway.
#[derive(Debug)]
pub enum ApiError {
    /// No usable response: connection failure, timeout, or an unreadable body.
    Transport {
        url: String,
        timeout: Option<Duration>,
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    Status {
        url: String,
        status: reqwest::StatusCode,
        summary: Option<String>,
    },

    /// The envelope was marked unsuccessful or lacked required data.
    Envelope(String),
}

impl ApiError {
    pub(crate) fn transport(url: &str, timeout: Duration, source: reqwest::Error) -> Self {
        ApiError::Transport {
            url: url.to_string(),
            timeout: source.is_timeout().then_some(timeout),
            source,
        }
    }

    pub(crate) fn status(url: &str, status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Status {
            url: url.to_string(),
            status,
            summary: summarize_error_body(body),
        }
    }

    /// Transport and HTTP status failures, as opposed to envelope failures.
    pub fn is_request_error(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Status { .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport {
                timeout: Some(timeout),
                ..
            } => write!(f, "Request timed out after {}", format_duration(*timeout)),
            ApiError::Transport { source, .. } if source.is_connect() => {
                write!(f, "Could not reach the chat server")
            }
            ApiError::Transport { source, .. } if source.is_decode() => {
                write!(f, "Unexpected response from the chat server: {source}")
            }
            ApiError::Transport { source, .. } => write!(f, "Request failed: {source}"),
            ApiError::Status {
                status,
                summary: Some(summary),
                ..
            } => write!(f, "Server returned {status}: {summary}"),
            ApiError::Status { status, .. } => write!(f, "Server returned {status}"),
            ApiError::Envelope(message) => f.write_str(message),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 && duration.as_secs() > 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Pull a single-line summary out of an error body, preferring the envelope's
/// `error` field, then `error.message`, then `message`, then short plain text.
fn summarize_error_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let summary = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("error")
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str().map(str::to_owned))
            })?,
        Err(_) if trimmed.starts_with('<') => return None,
        Err(_) => trimmed.chars().take(200).collect(),
    };

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prefers_envelope_error_string() {
        let body = r#"{"success":false,"error":"chat   not\nfound"}"#;
        assert_eq!(summarize_error_body(body).as_deref(), Some("chat not found"));
    }

    #[test]
    fn summary_reads_nested_error_message() {
        let body = r#"{"error":{"message":"rate limited","type":"quota"}}"#;
        assert_eq!(summarize_error_body(body).as_deref(), Some("rate limited"));
    }

    #[test]
    fn summary_skips_html_and_empty_bodies() {
        assert_eq!(summarize_error_body("<html>502</html>"), None);
        assert_eq!(summarize_error_body("   "), None);
        assert_eq!(
            summarize_error_body("upstream unavailable").as_deref(),
            Some("upstream unavailable")
        );
    }

    #[test]
    fn durations_render_in_whole_units() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn status_errors_render_code_and_summary() {
        let err = ApiError::status(
            "http://localhost/api/v1/chats",
            reqwest::StatusCode::NOT_FOUND,
            r#"{"success":false,"error":"chat not found"}"#,
        );
        assert!(err.is_request_error());
        assert_eq!(err.to_string(), "Server returned 404 Not Found: chat not found");

        let bare = ApiError::status(
            "http://localhost/api/v1/chats",
            reqwest::StatusCode::BAD_GATEWAY,
            "",
        );
        assert_eq!(bare.to_string(), "Server returned 502 Bad Gateway");
    }
}
