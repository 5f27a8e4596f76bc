//! Tests for settling strategies.

use librato_error::{MetricError, MetricErrorKind, Operation};
use librato_resource::SettleStrategy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Check that reports a value from the `ready_on`-th call onward.
async fn check(calls: &AtomicUsize, ready_on: usize) -> Result<Option<usize>, MetricError> {
    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
    Ok((call >= ready_on).then_some(call))
}

#[tokio::test]
async fn test_immediate_checks_once() {
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    let value = SettleStrategy::Immediate
        .settle(Operation::Verify, "tftest-metric-a", move || check(calls, 1))
        .await
        .unwrap();
    assert_eq!(value, 1);

    let err = SettleStrategy::Immediate
        .settle(Operation::Verify, "tftest-metric-a", move || check(calls, 10))
        .await
        .unwrap_err();
    assert_eq!(err.kind, MetricErrorKind::NotSettled { attempts: 1 });
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_delay_waits_before_probing() {
    let calls = AtomicUsize::new(0);
    let calls = &calls;
    let start = Instant::now();

    let value = SettleStrategy::fixed(Duration::from_secs(5))
        .settle(Operation::Verify, "tftest-metric-b", move || check(calls, 1))
        .await
        .unwrap();

    assert_eq!(value, 1);
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_visible() {
    let calls = AtomicUsize::new(0);
    let calls = &calls;
    let start = Instant::now();

    let strategy = SettleStrategy::poll(5, Duration::from_millis(100), Duration::from_millis(250));
    let value = strategy
        .settle(Operation::Verify, "tftest-metric-c", move || check(calls, 4))
        .await
        .unwrap();

    assert_eq!(value, 4);
    // Waits of 100, 200 and 250 (capped) milliseconds.
    assert!(start.elapsed() >= Duration::from_millis(550));
}

#[tokio::test(start_paused = true)]
async fn test_poll_gives_up() {
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    let strategy = SettleStrategy::poll(3, Duration::from_millis(10), Duration::from_millis(100));
    let err = strategy
        .settle(Operation::Delete, "tftest-metric-d", move || check(calls, 99))
        .await
        .unwrap_err();

    assert_eq!(err.kind, MetricErrorKind::NotSettled { attempts: 3 });
    assert_eq!(err.operation, Operation::Delete);
    assert_eq!(err.name, "tftest-metric-d");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_huge_multiplier_saturates_at_max_backoff() {
    let calls = AtomicUsize::new(0);
    let calls = &calls;
    let start = Instant::now();

    let strategy = SettleStrategy::Poll {
        max_attempts: 4,
        initial_backoff_ms: 1000,
        max_backoff_ms: 5000,
        multiplier: 1e20,
    };
    let value = strategy
        .settle(Operation::Verify, "tftest-metric-f", move || check(calls, 4))
        .await
        .unwrap();

    assert_eq!(value, 4);
    // Waits of 1000, then 5000 twice.
    assert!(start.elapsed() >= Duration::from_millis(11_000));
}

#[test]
fn test_durations_beyond_u64_millis_saturate() {
    let strategy = SettleStrategy::fixed(Duration::MAX);
    assert_eq!(strategy, SettleStrategy::FixedDelay { delay_ms: u64::MAX });
}

#[tokio::test]
async fn test_check_error_stops_waiting() {
    let calls = AtomicUsize::new(0);
    let calls = &calls;

    let strategy = SettleStrategy::poll(5, Duration::from_millis(1), Duration::from_millis(1));
    let err = strategy
        .settle(Operation::Verify, "tftest-metric-e", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<Option<()>, _>(MetricError::new(
                MetricErrorKind::Missing,
                Operation::Verify,
                "tftest-metric-e",
            ))
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, MetricErrorKind::Missing);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_strategy_from_toml() {
    let strategy: SettleStrategy = toml::from_str(
        r#"
        strategy = "poll"
        max_attempts = 6
        initial_backoff_ms = 250
        max_backoff_ms = 4000
        multiplier = 1.5
        "#,
    )
    .unwrap();
    assert_eq!(
        strategy,
        SettleStrategy::Poll {
            max_attempts: 6,
            initial_backoff_ms: 250,
            max_backoff_ms: 4000,
            multiplier: 1.5,
        }
    );

    let strategy: SettleStrategy = toml::from_str(r#"strategy = "fixed_delay"
delay_ms = 2000"#)
        .unwrap();
    assert_eq!(strategy, SettleStrategy::fixed(Duration::from_secs(2)));

    assert_eq!(SettleStrategy::default(), SettleStrategy::Immediate);
}
