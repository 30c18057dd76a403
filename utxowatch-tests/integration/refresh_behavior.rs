//! Manual refresh behavior through the engine handle.
//!
//! Uses a configuration with slow periodic ticks so the only snapshot
//! publications observed come from the refresh itself.

use std::time::Duration;

use utxowatch_core::config::WatchConfig;
use utxowatch_core::engine::spawn_engine;

/// Ticks are pushed out far enough that they never fire during a test;
/// the refresh delay stays short.
fn refresh_only_config() -> WatchConfig {
    let mut config = WatchConfig::for_testing();
    config.engine.market_tick = Duration::from_secs(60);
    config.engine.rates_tick = Duration::from_secs(60);
    config.engine.refresh_delay = Duration::from_millis(200);
    config
}

#[tokio::test]
async fn test_refresh_regenerates_snapshot() {
    let handle = spawn_engine(refresh_only_config());
    let mut subscription = handle.subscribe();

    let initial = subscription.borrow_and_update().clone();
    assert_eq!(initial.sequence, 0);

    assert!(handle.refresh().await.unwrap());

    // The regenerated snapshot lands after the artificial delay
    subscription.changed().await.unwrap();
    let refreshed = subscription.borrow_and_update().clone();

    assert_eq!(refreshed.sequence, initial.sequence + 1);
    assert_ne!(
        refreshed.market.series, initial.market.series,
        "refresh must regenerate the series, not advance it"
    );

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.refreshes, 1);
    assert!(!stats.refresh_pending);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_refresh_is_ignored() {
    let handle = spawn_engine(refresh_only_config());
    let mut subscription = handle.subscribe();
    subscription.borrow_and_update();

    // First request starts the refresh; the second arrives while it is
    // still pending and must be dropped, not queued.
    assert!(handle.refresh().await.unwrap());
    assert!(!handle.refresh().await.unwrap());

    subscription.changed().await.unwrap();
    let snapshot = subscription.borrow_and_update().clone();
    assert_eq!(snapshot.sequence, 1, "only one refresh may land");

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.refreshes, 1);

    // Once it has landed, a new refresh is accepted again
    assert!(handle.refresh().await.unwrap());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_refresh_does_not_block_queries() {
    let mut config = refresh_only_config();
    // Long enough that the refresh cannot land between the commands below
    config.engine.refresh_delay = Duration::from_secs(10);
    let handle = spawn_engine(config);

    assert!(handle.refresh().await.unwrap());

    // The actor keeps serving commands while the refresh delay elapses
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.sequence, 0);
    let stats = handle.stats().await.unwrap();
    assert!(stats.refresh_pending);

    handle.shutdown().await.unwrap();
}
