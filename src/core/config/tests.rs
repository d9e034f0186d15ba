use super::data::{Config, DEFAULT_SERVER};
use super::io::ConfigError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.server_or_default(), DEFAULT_SERVER);
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.health_interval(), Duration::from_secs(30));
    assert!(config.markdown_enabled());
    assert!(config.syntax_enabled());
    assert_eq!(config.theme_or_default(), "dark");
    assert!(!config.discard_stale());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        server: Some("http://10.0.0.5:9000".to_string()),
        request_timeout_secs: Some(5),
        theme: Some("light".to_string()),
        ..Default::default()
    };
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);

    let mut modified = loaded;
    modified.unset_value("theme").expect("unset theme");
    modified.set_value("markdown", "off").expect("set markdown");
    modified
        .save_to_path(&config_path)
        .expect("Failed to save modified config");

    let reloaded = Config::load_from_path(&config_path).expect("Failed to reload config");
    assert_eq!(reloaded.theme, None);
    assert_eq!(reloaded.markdown, Some(false));
    assert_eq!(reloaded.request_timeout_secs, Some(5));
}

#[test]
fn unset_keys_are_omitted_from_the_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");

    Config {
        syntax: Some(false),
        ..Default::default()
    }
    .save_to_path(&config_path)
    .expect("Failed to save config");

    let contents = fs::read_to_string(&config_path).expect("read back");
    assert_eq!(contents.trim(), "syntax = false");
}

#[test]
fn partial_files_fill_in_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "server = \"https://chat.example.com\"\ndiscard_stale_responses = true\n",
    )
    .expect("write config");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(config.server_or_default(), "https://chat.example.com");
    assert!(config.discard_stale());
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
}

#[test]
fn zero_durations_fall_back_to_defaults() {
    let config = Config {
        request_timeout_secs: Some(0),
        health_interval_secs: Some(0),
        ..Default::default()
    };
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.health_interval(), Duration::from_secs(30));
}

#[test]
fn invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "server = [unterminated").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    let message = err.to_string();
    assert!(message.starts_with("Failed to parse config at "));
    assert!(message.contains("config.toml"));
}

#[test]
fn unreadable_path_reports_read_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    // A directory exists but cannot be read as a file.
    let config_path = temp_dir.path().join("config.toml");
    fs::create_dir(&config_path).expect("create dir");

    let err = Config::load_from_path(&config_path).expect_err("read should fail");
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn wrong_value_types_are_parse_errors() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "request_timeout_secs = \"soon\"\n").expect("write config");

    assert!(matches!(
        Config::load_from_path(&config_path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn server_resolution_precedence() {
    let file = Config {
        server: Some("http://from-file:1".to_string()),
        ..Default::default()
    };

    assert_eq!(
        file.resolve_server(Some("http://from-cli:1"), Some("http://from-env:1")),
        "http://from-cli:1"
    );
    assert_eq!(
        file.resolve_server(None, Some("http://from-env:1")),
        "http://from-env:1"
    );
    assert_eq!(file.resolve_server(Some("  "), None), "http://from-file:1");
    assert_eq!(file.resolve_server(None, None), "http://from-file:1");
    assert_eq!(
        Config::default().resolve_server(None, None),
        DEFAULT_SERVER
    );
}
