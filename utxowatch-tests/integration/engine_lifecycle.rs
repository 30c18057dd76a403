//! Engine lifecycle tests.
//!
//! Runs the engine actor for several ticks and verifies that every
//! published snapshot upholds the dashboard invariants: bounded series,
//! floor-clamped metrics, capped feeds, and a strictly increasing
//! sequence number.

use utxowatch_core::config::WatchConfig;
use utxowatch_core::engine::spawn_engine;
use utxowatch_core::market::MarketSnapshot;

fn assert_snapshot_invariants(snapshot: &MarketSnapshot, config: &WatchConfig) {
    assert_eq!(snapshot.market.series.len(), config.market.series_len);
    for point in &snapshot.market.series {
        assert!(
            point.price >= config.market.price_floor,
            "series point {} below floor",
            point.price
        );
    }
    assert!(snapshot.market.current_price >= config.market.price_floor);
    assert!(snapshot.network.mempool_size >= config.network.mempool_floor);
    assert!(snapshot.network.avg_fee_rate >= config.network.fee_floor);
    assert!(snapshot.transactions.len() <= config.feeds.transaction_window);
    assert!(snapshot.blocks.len() <= config.feeds.block_window);
}

#[tokio::test]
async fn test_published_snapshots_uphold_invariants() {
    let config = WatchConfig::for_testing();
    let handle = spawn_engine(config.clone());
    let mut subscription = handle.subscribe();

    let initial = subscription.borrow_and_update().clone();
    assert_snapshot_invariants(&initial, &config);

    let mut last_sequence = initial.sequence;
    for _ in 0..10 {
        subscription.changed().await.unwrap();
        let snapshot = subscription.borrow_and_update().clone();

        assert!(
            snapshot.sequence > last_sequence,
            "sequence went from {last_sequence} to {}",
            snapshot.sequence
        );
        last_sequence = snapshot.sequence;
        assert_snapshot_invariants(&snapshot, &config);
    }

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stats_track_engine_activity() {
    let handle = spawn_engine(WatchConfig::for_testing());
    let mut subscription = handle.subscribe();

    for _ in 0..5 {
        subscription.changed().await.unwrap();
        subscription.borrow_and_update();
    }

    let stats = handle.stats().await.unwrap();
    assert!(stats.ticks >= 5, "expected at least 5 ticks, saw {}", stats.ticks);
    assert!(!stats.refresh_pending);
    assert_eq!(stats.refreshes, 0);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rates_subscription_sees_perturbations() {
    let handle = spawn_engine(WatchConfig::for_testing());
    let mut rates_subscription = handle.subscribe_rates();

    let initial = rates_subscription.borrow_and_update().clone();
    rates_subscription.changed().await.unwrap();
    let updated = rates_subscription.borrow_and_update().clone();

    assert_ne!(initial, updated, "rates tick published an unchanged table");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cloned_handles_share_one_engine() {
    let handle = spawn_engine(WatchConfig::for_testing());
    let other = handle.clone();

    let mut subscription = handle.subscribe();
    subscription.changed().await.unwrap();
    let seen = subscription.borrow_and_update().sequence;

    let queried = other.snapshot().await.unwrap();
    assert!(queried.sequence >= seen);

    handle.shutdown().await.unwrap();
    assert!(other.snapshot().await.is_err());
}

#[tokio::test]
async fn test_snapshot_serializes_to_json() {
    let handle = spawn_engine(WatchConfig::for_testing());

    let snapshot = handle.snapshot().await.unwrap();
    let json = serde_json::to_string(&*snapshot).unwrap();
    let parsed: MarketSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, *snapshot);

    handle.shutdown().await.unwrap();
}
