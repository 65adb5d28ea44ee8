//! Integration tests for config load/save.

use persona_chat_client::{config, Config, ConfigError};
use predicates::prelude::*;
use std::time::Duration;

#[test]
fn load_existing_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        r#"
server:
  base_url: "http://chat.example.com:5000"
  request_timeout_secs: 45
logging:
  filter: "persona_chat_client=debug"
"#,
    )
    .unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(cfg.base_url(), "http://chat.example.com:5000");
    assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(45)));
    assert_eq!(cfg.log_filter(), "persona_chat_client=debug");
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "server:\n  request_timeout_secs: 5\n").unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(cfg.base_url(), config::DEFAULT_BASE_URL);
    assert_eq!(cfg.log_filter(), config::DEFAULT_LOG_FILTER);

    std::fs::write(&config_path, "").unwrap();
    assert_eq!(config::load(&config_path).unwrap(), Config::default());
}

#[test]
fn load_reports_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(matches!(config::load(&missing), Err(ConfigError::Io(_))));

    let bad = dir.path().join("bad.yaml");
    std::fs::write(&bad, "server: [not, a, map]\n").unwrap();
    assert!(matches!(config::load(&bad), Err(ConfigError::Parse(_))));
}

#[test]
fn save_creates_directory_and_file_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("persona-chat");
    let config_path = config_dir.join("config.yaml");
    assert!(!config_dir.exists(), "config dir should not exist yet");

    let mut config = Config::default();
    config.server.base_url = Some("http://localhost:5000".into());
    config.server.request_timeout_secs = Some(60);

    config::save(&config_path, &config).expect("save should succeed");
    let pred = predicates::path::exists();
    assert!(pred.eval(&config_path), "config file should exist after save");

    let contents = std::fs::read_to_string(&config_path).unwrap();
    assert!(predicates::str::contains("base_url").eval(&contents));
    assert!(
        !predicates::str::contains("filter").eval(&contents),
        "unset fields should be omitted"
    );
    assert_eq!(config::load(&config_path).unwrap(), config);
}

/// Config path resolves to `~/.persona-chat/config.yaml` using the current platform's home dir.
#[test]
fn default_config_path_uses_home_directory() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap().to_string();

    let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let original = std::env::var(key).ok();

    std::env::set_var(key, &home);
    let path = config::default_config_path();
    match original {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }

    let path = path.expect("should resolve a config path");
    let expected = dir.path().join(".persona-chat").join("config.yaml");
    assert_eq!(path, expected);
}
