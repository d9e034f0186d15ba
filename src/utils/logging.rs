//! Diagnostic logging setup.
//!
//! The interactive UI owns the terminal, so it only ever logs to a file.
//! One-shot commands log to stderr unless a file was requested.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV_VAR: &str = "CHATLINE_LOG";

/// Where diagnostic output should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// No subscriber at all.
    Off,
    Stderr,
    File(&'a Path),
}

impl<'a> LogTarget<'a> {
    pub fn for_mode(log_file: Option<&'a Path>, interactive: bool) -> Self {
        match (log_file, interactive) {
            (Some(path), _) => LogTarget::File(path),
            (None, true) => LogTarget::Off,
            (None, false) => LogTarget::Stderr,
        }
    }

    fn default_level(self) -> &'static str {
        match self {
            LogTarget::File(_) => "debug",
            _ => "warn",
        }
    }
}

/// Build the level filter from `CHATLINE_LOG`, falling back to the target's
/// default when the variable is unset or not a valid directive.
pub fn build_filter(directive: Option<&str>, fallback: &str) -> EnvFilter {
    match directive.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directive) => match directive.parse::<EnvFilter>() {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "⚠️  {LOG_ENV_VAR}='{directive}' is not a valid log filter ({e}); using '{fallback}'"
                );
                EnvFilter::new(fallback)
            }
        },
        None => EnvFilter::new(fallback),
    }
}

/// Install the global subscriber for `target`. A second call is a no-op.
pub fn init(target: LogTarget<'_>) -> io::Result<()> {
    let directive = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(directive.as_deref(), target.default_level());

    match target {
        LogTarget::Off => {}
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(io::stderr)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn interactive_mode_without_file_is_silent() {
        assert_eq!(LogTarget::for_mode(None, true), LogTarget::Off);
        assert_eq!(LogTarget::for_mode(None, false), LogTarget::Stderr);

        let path = PathBuf::from("chatline.log");
        assert_eq!(
            LogTarget::for_mode(Some(&path), true),
            LogTarget::File(&path)
        );
    }

    #[test]
    fn file_logging_defaults_to_debug() {
        let path = PathBuf::from("chatline.log");
        assert_eq!(LogTarget::File(&path).default_level(), "debug");
        assert_eq!(LogTarget::Stderr.default_level(), "warn");
    }

    #[test]
    fn filter_uses_directive_or_fallback() {
        assert_eq!(build_filter(Some("chatline=trace"), "warn").to_string(), "chatline=trace");
        assert_eq!(build_filter(None, "warn").to_string(), "warn");
        assert_eq!(build_filter(Some("  "), "debug").to_string(), "debug");
    }
}
