//! Key-based access to config values for the `set`, `unset` and `config`
//! commands.

use std::fmt;

use crate::core::config::data::{
    Config, DEFAULT_HEALTH_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER,
};
use crate::utils::url::parse_server_url;

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidBoolean(String),
    InvalidNumber(String),
    InvalidServer(String),
    UnknownTheme(String),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                write!(f, "Unknown config key: {key} (known keys: {})", KEYS.join(", "))
            }
            SettingError::InvalidBoolean(input) => write!(
                f,
                "Invalid boolean value: {input}. Use 'on' or 'off' (also accepts true/false, yes/no)"
            ),
            SettingError::InvalidNumber(input) => {
                write!(f, "Invalid value: {input}. Expected a whole number of seconds above zero")
            }
            SettingError::InvalidServer(reason) => write!(f, "Invalid server URL: {reason}"),
            SettingError::UnknownTheme(input) => {
                write!(f, "Unknown theme: {input}. Available themes: dark, light")
            }
        }
    }
}

impl std::error::Error for SettingError {}

pub const KEYS: [&str; 7] = [
    "server",
    "request_timeout_secs",
    "health_interval_secs",
    "markdown",
    "syntax",
    "theme",
    "discard_stale_responses",
];

/// Accept `request-timeout-secs` as well as `request_timeout_secs`.
fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn parse_secs(input: &str) -> Result<u64, SettingError> {
    input
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| SettingError::InvalidNumber(input.to_string()))
}

fn parse_flag(input: &str) -> Result<bool, SettingError> {
    parse_bool(input.trim()).ok_or_else(|| SettingError::InvalidBoolean(input.to_string()))
}

impl Config {
    /// Validate and store `value` under `key`, returning a confirmation line.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<String, SettingError> {
        let key = normalize_key(key);
        match key.as_str() {
            "server" => {
                let url = parse_server_url(value).map_err(SettingError::InvalidServer)?;
                let normalized = url.as_str().trim_end_matches('/').to_string();
                self.server = Some(normalized);
            }
            "request_timeout_secs" => self.request_timeout_secs = Some(parse_secs(value)?),
            "health_interval_secs" => self.health_interval_secs = Some(parse_secs(value)?),
            "markdown" => self.markdown = Some(parse_flag(value)?),
            "syntax" => self.syntax = Some(parse_flag(value)?),
            "discard_stale_responses" => self.discard_stale_responses = Some(parse_flag(value)?),
            "theme" => {
                let theme = value.trim().to_ascii_lowercase();
                if theme != "dark" && theme != "light" {
                    return Err(SettingError::UnknownTheme(value.to_string()));
                }
                self.theme = Some(theme);
            }
            _ => return Err(SettingError::UnknownKey(key)),
        }
        Ok(format!("✅ Set {key} to: {}", self.display_value(&key)))
    }

    /// Remove `key` from the file so its default applies again.
    pub fn unset_value(&mut self, key: &str) -> Result<String, SettingError> {
        let key = normalize_key(key);
        match key.as_str() {
            "server" => self.server = None,
            "request_timeout_secs" => self.request_timeout_secs = None,
            "health_interval_secs" => self.health_interval_secs = None,
            "markdown" => self.markdown = None,
            "syntax" => self.syntax = None,
            "theme" => self.theme = None,
            "discard_stale_responses" => self.discard_stale_responses = None,
            _ => return Err(SettingError::UnknownKey(key)),
        }
        Ok(format!(
            "✅ Unset {key} (will use default: {})",
            self.display_value(&key)
        ))
    }

    fn display_value(&self, key: &str) -> String {
        match key {
            "server" => self.server_or_default().to_string(),
            "request_timeout_secs" => format!("{}s", self.request_timeout().as_secs()),
            "health_interval_secs" => format!("{}s", self.health_interval().as_secs()),
            "markdown" => format_bool(self.markdown_enabled()).to_string(),
            "syntax" => format_bool(self.syntax_enabled()).to_string(),
            "theme" => self.theme_or_default().to_string(),
            "discard_stale_responses" => format_bool(self.discard_stale()).to_string(),
            _ => String::new(),
        }
    }

    /// One `key: value` line per setting, marking values that come from defaults.
    pub fn describe(&self) -> Vec<String> {
        let explicit = [
            self.server.is_some(),
            self.request_timeout_secs.is_some(),
            self.health_interval_secs.is_some(),
            self.markdown.is_some(),
            self.syntax.is_some(),
            self.theme.is_some(),
            self.discard_stale_responses.is_some(),
        ];
        KEYS.iter()
            .zip(explicit)
            .map(|(key, is_set)| {
                let value = self.display_value(key);
                if is_set {
                    format!("  {key}: {value}")
                } else {
                    format!("  {key}: {value} (default)")
                }
            })
            .collect()
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.describe() {
            println!("{line}");
        }
    }
}
