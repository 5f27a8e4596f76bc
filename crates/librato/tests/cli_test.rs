//! Tests for CLI parsing, declaration files and command handling.

use clap::Parser;
use librato::cli::{
    Cli, Commands, MetricCommand, SettleArgs, handle_metric_command, load_declaration, load_state,
    save_state,
};
use librato::{
    InMemoryMetricsApi, MetricErrorKind, MetricKind, MetricResourceManager, MetricType,
    Reconciler, RemoteMetric, ResourceState, SettleStrategy,
};
use std::time::Duration;
use tempfile::TempDir;

const COUNTER_TOML: &str = r#"
name = "tftest-metric-abc123"
type = "counter"
description = "A test counter metric"

[attributes]
display_stacked = true
created_by_ua = "go-librato/0.1"
"#;

#[test]
fn test_parse_show() {
    let cli = Cli::try_parse_from(["librato", "metric", "show", "api.requests"]).unwrap();

    assert!(cli.config.is_none());
    assert_eq!(cli.log_format, "pretty");
    match cli.command {
        Commands::Metric(MetricCommand::Show { name }) => assert_eq!(name, "api.requests"),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_apply_with_global_flags() {
    let cli = Cli::try_parse_from([
        "librato",
        "metric",
        "apply",
        "metric.toml",
        "--state",
        "metric.state.json",
        "--config",
        "librato.toml",
        "--settle-attempts",
        "4",
        "--settle-delay-ms",
        "250",
    ])
    .unwrap();

    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("librato.toml")));
    assert_eq!(cli.settle.settle_attempts, Some(4));
    assert_eq!(cli.settle.settle_delay_ms, Some(250));
    assert!(matches!(
        cli.command,
        Commands::Metric(MetricCommand::Apply { state: Some(_), .. })
    ));
}

#[test]
fn test_parse_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["librato", "metric", "rename", "a", "b"]).is_err());
    assert!(Cli::try_parse_from(["librato", "metric", "show"]).is_err());
}

#[test]
fn test_settle_args_strategy() {
    assert_eq!(SettleArgs::default().strategy(), SettleStrategy::Immediate);

    let delay_only = SettleArgs {
        settle_delay_ms: Some(2000),
        settle_attempts: None,
    };
    assert_eq!(
        delay_only.strategy(),
        SettleStrategy::fixed(Duration::from_secs(2))
    );

    let polling = SettleArgs {
        settle_delay_ms: Some(250),
        settle_attempts: Some(4),
    };
    assert_eq!(
        polling.strategy(),
        SettleStrategy::poll(4, Duration::from_millis(250), Duration::from_secs(10))
    );

    let single = SettleArgs {
        settle_delay_ms: None,
        settle_attempts: Some(1),
    };
    assert_eq!(single.strategy(), SettleStrategy::Immediate);
}

#[test]
fn test_load_toml_declaration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metric.toml");
    std::fs::write(&path, COUNTER_TOML).unwrap();

    let spec = load_declaration(&path).unwrap();

    assert_eq!(spec.name(), "tftest-metric-abc123");
    assert_eq!(spec.metric_type(), MetricType::Counter);
    assert_eq!(spec.attributes().display_stacked(), Some(true));
}

#[test]
fn test_load_json_declaration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metric.json");
    std::fs::write(
        &path,
        r#"{"name": "tftest-metric-xyz", "type": "composite",
            "composite": "s(\"librato.cpu.percent.user\", {\"environment\":\"prod\"})"}"#,
    )
    .unwrap();

    let spec = load_declaration(&path).unwrap();

    assert!(matches!(spec.kind(), MetricKind::Composite { .. }));
}

#[test]
fn test_load_invalid_declaration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metric.toml");
    std::fs::write(&path, "name = \"tftest-metric-bad\"\ntype = \"composite\"\n").unwrap();

    let err = load_declaration(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid declaration"));

    assert!(load_declaration(&dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_state_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    assert_eq!(load_state(&path).unwrap(), None);

    let state = ResourceState::new("tftest-metric-abc123");
    save_state(&path, Some(&state)).unwrap();
    assert_eq!(load_state(&path).unwrap(), Some(state));

    save_state(&path, None).unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn test_apply_command_writes_state() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("metric.toml");
    let state = dir.path().join("state.json");
    std::fs::write(&file, COUNTER_TOML).unwrap();

    let api = InMemoryMetricsApi::new();
    let reconciler = Reconciler::new(
        MetricResourceManager::new(api.clone()),
        SettleStrategy::Immediate,
    );

    handle_metric_command(
        MetricCommand::Apply {
            file: file.clone(),
            state: Some(state.clone()),
        },
        &reconciler,
    )
    .await
    .unwrap();

    assert_eq!(api.len().await, 1);
    assert_eq!(
        load_state(&state).unwrap(),
        Some(ResourceState::new("tftest-metric-abc123"))
    );

    handle_metric_command(
        MetricCommand::Delete {
            name: "tftest-metric-abc123".to_string(),
        },
        &reconciler,
    )
    .await
    .unwrap();
    assert!(api.is_empty().await);
}

#[tokio::test]
async fn test_fresh_state_file_does_not_adopt_existing_metric() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("metric.toml");
    let state = dir.path().join("state.json");
    std::fs::write(&file, COUNTER_TOML).unwrap();

    let api = InMemoryMetricsApi::new();
    api.insert(
        RemoteMetric::builder()
            .name("tftest-metric-abc123")
            .metric_type(MetricType::Counter)
            .description("Owned by another team")
            .build()
            .unwrap(),
    )
    .await;
    let reconciler = Reconciler::new(
        MetricResourceManager::new(api.clone()),
        SettleStrategy::Immediate,
    );

    let err = handle_metric_command(
        MetricCommand::Apply {
            file,
            state: Some(state.clone()),
        },
        &reconciler,
    )
    .await
    .unwrap_err();

    let metric_err = err
        .downcast_ref::<librato::MetricError>()
        .expect("lifecycle error");
    assert_eq!(metric_err.kind, MetricErrorKind::Conflict);

    let stored = api.stored("tftest-metric-abc123").await.unwrap();
    assert_eq!(stored.description().as_deref(), Some("Owned by another team"));
    assert!(!state.exists());
}

#[tokio::test]
async fn test_apply_without_state_file_updates_declared_name() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("metric.toml");
    std::fs::write(&file, COUNTER_TOML).unwrap();

    let api = InMemoryMetricsApi::new();
    api.insert(
        RemoteMetric::builder()
            .name("tftest-metric-abc123")
            .metric_type(MetricType::Counter)
            .description("Old description")
            .build()
            .unwrap(),
    )
    .await;
    let reconciler = Reconciler::new(
        MetricResourceManager::new(api.clone()),
        SettleStrategy::Immediate,
    );

    handle_metric_command(MetricCommand::Apply { file, state: None }, &reconciler)
        .await
        .unwrap();

    let stored = api.stored("tftest-metric-abc123").await.unwrap();
    assert_eq!(stored.description().as_deref(), Some("A test counter metric"));
}
