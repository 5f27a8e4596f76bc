//! Tests for client configuration loading.

use librato_client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, RetryConfig};
use librato_error::ConfigErrorKind;
use std::fs;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write config");
    (dir, path)
}

#[test]
fn test_file_with_credentials_uses_defaults() {
    let (_dir, path) = write_config(
        r#"
email = "ops@example.com"
token = "abc123"
"#,
    );

    let config = ClientConfig::from_file(&path).expect("valid config");
    assert_eq!(config.email(), "ops@example.com");
    assert_eq!(config.token(), "abc123");
    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    assert_eq!(*config.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    assert!(config.user_agent().starts_with("librato-rs/"));
    assert_eq!(*config.retry(), RetryConfig::default());
}

#[test]
fn test_file_overrides_and_retry_section() {
    let (_dir, path) = write_config(
        r#"
base_url = "http://localhost:9999/v1"
email = "ops@example.com"
token = "abc123"
timeout_secs = 5

[retry]
max_attempts = 5
initial_backoff_ms = 100
"#,
    );

    let config = ClientConfig::from_file(&path).expect("valid config");
    assert_eq!(config.base_url(), "http://localhost:9999/v1");
    assert_eq!(*config.timeout_secs(), 5);
    assert_eq!(config.retry().max_attempts, 5);
    assert_eq!(config.retry().initial_backoff_ms, 100);
    assert_eq!(config.retry().max_backoff_ms, RetryConfig::default().max_backoff_ms);
}

#[test]
fn test_missing_token_is_reported() {
    let (_dir, path) = write_config("email = \"ops@example.com\"\n");

    let err = ClientConfig::from_file(&path).unwrap_err();
    assert_eq!(
        err.kind,
        ConfigErrorKind::MissingCredential {
            field: "token",
            env_var: "LIBRATO_TOKEN",
        }
    );
}

#[test]
fn test_missing_file_is_load_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = ClientConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err.kind, ConfigErrorKind::Load(_)));
}

#[test]
fn test_malformed_file_is_load_error() {
    let (_dir, path) = write_config("email = [unterminated");
    let err = ClientConfig::from_file(&path).unwrap_err();
    assert!(matches!(err.kind, ConfigErrorKind::Load(_)));
}

#[test]
fn test_builder_defaults() {
    let config = ClientConfig::builder()
        .email("ops@example.com")
        .token("abc123")
        .build()
        .expect("complete config");

    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    assert_eq!(*config.timeout_secs(), DEFAULT_TIMEOUT_SECS);
}

#[test]
fn test_builder_requires_credentials() {
    assert!(ClientConfig::builder().email("ops@example.com").build().is_err());
}

#[test]
fn test_negative_backoff_multiplier_is_rejected() {
    let (_dir, path) = write_config(
        r#"
email = "ops@example.com"
token = "abc123"

[retry]
backoff_multiplier = -1.0
"#,
    );

    let err = ClientConfig::from_file(&path).unwrap_err();
    assert_eq!(
        err.kind,
        ConfigErrorKind::InvalidRetry {
            field: "backoff_multiplier",
            value: "-1".to_string(),
            reason: "must be a finite number of at least 1.0",
        }
    );
}

#[test]
fn test_client_rejects_shrinking_backoff() {
    let config = ClientConfig::builder()
        .email("ops@example.com")
        .token("abc123")
        .retry(RetryConfig {
            backoff_multiplier: 0.5,
            ..RetryConfig::default()
        })
        .build()
        .expect("complete config");

    let err = librato_client::LibratoClient::new(&config).unwrap_err();
    assert!(matches!(err.kind, ConfigErrorKind::InvalidRetry { .. }));
}
