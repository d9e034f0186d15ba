//! URL helpers for building backend endpoints.
//!
//! The backend serves its API under `/api/v1` and its liveness probe at the
//! server root, so both are derived from a single configured origin.

use reqwest::Url;

/// Path segments of the versioned API base (`/api/v1`).
pub const API_BASE_SEGMENTS: [&str; 2] = ["api", "v1"];

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use chatline::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8080/"), "http://localhost:8080");
/// assert_eq!(normalize_base_url("http://localhost:8080///"), "http://localhost:8080");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Parse a server origin, accepting bare `host:port` by assuming `http://`.
pub fn parse_server_url(server: &str) -> Result<Url, String> {
    let normalized = normalize_base_url(server);
    if normalized.is_empty() {
        return Err("server URL is empty".to_string());
    }
    let candidate = if normalized.contains("://") {
        normalized
    } else {
        format!("http://{normalized}")
    };
    let url = Url::parse(&candidate).map_err(|e| format!("invalid server URL '{server}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported URL scheme '{other}' in '{server}'")),
    }
}

/// Append path segments to `base`, percent-encoding each segment.
///
/// # Examples
///
/// ```
/// use chatline::utils::url::{endpoint_url, parse_server_url};
///
/// let base = parse_server_url("http://localhost:8080/").unwrap();
/// assert_eq!(
///     endpoint_url(&base, &["api", "v1", "chats", "a b"]).as_str(),
///     "http://localhost:8080/api/v1/chats/a%20b"
/// );
/// ```
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        // `extend` encodes '/' too, so a session id always stays one segment.
        path.extend(segments);
    }
    url
}
