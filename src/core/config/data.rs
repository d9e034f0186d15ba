use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;

/// Environment variable that overrides the configured server.
pub const SERVER_ENV_VAR: &str = "CHATLINE_SERVER";

/// Persisted settings. Every field is optional so an absent key falls back
/// to its default and `unset` can remove it from the file again.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend origin, e.g. `http://127.0.0.1:8080`
    pub server: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub health_interval_secs: Option<u64>,
    /// Enable markdown rendering in the transcript
    pub markdown: Option<bool>,
    /// Enable syntax highlighting for fenced code blocks when markdown is enabled
    pub syntax: Option<bool>,
    /// UI theme name ("dark" or "light")
    pub theme: Option<String>,
    /// Drop list/history results that a newer fetch has superseded
    pub discard_stale_responses: Option<bool>,
}

impl Config {
    pub fn server_or_default(&self) -> &str {
        self.server.as_deref().unwrap_or(DEFAULT_SERVER)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(
            self.health_interval_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_HEALTH_INTERVAL_SECS),
        )
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn theme_or_default(&self) -> &str {
        self.theme.as_deref().unwrap_or("dark")
    }

    pub fn discard_stale(&self) -> bool {
        self.discard_stale_responses.unwrap_or(false)
    }

    /// Pick the server to talk to: the `--server` flag, then the
    /// environment, then the config file, then the built-in default.
    pub fn resolve_server(&self, cli: Option<&str>, env: Option<&str>) -> String {
        [cli, env]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| self.server_or_default())
            .to_string()
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
