//! Market and network state data model.
//!
//! Snapshots are fabricated by [`MarketGenerator`], advanced by
//! [`MarketUpdater`], and replaced wholesale on every tick: consumers
//! always observe a complete, internally consistent state object and
//! never a half-applied update.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod generator;
pub mod updater;

pub use generator::MarketGenerator;
pub use updater::MarketUpdater;

/// One point of the 24-point price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Display label, `HH:MM`
    pub label: String,
    /// Price in display units, rounded to 2 decimals, never below the floor
    pub price: f64,
    /// Traded volume for this point
    pub volume: u64,
}

/// Headline market state: current price, 24h change, and the series window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub current_price: f64,
    pub price_change_24h: f64,
    /// Fixed-length window, oldest point first
    pub series: Vec<PricePoint>,
}

/// Simulated network-level metrics shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// Unconfirmed transaction count, floor-clamped
    pub mempool_size: u64,
    /// Average fee in sat/vB, floor-clamped
    pub avg_fee_rate: f64,
    /// Network hash rate in EH/s
    pub hash_rate: f64,
    /// Network difficulty in T
    pub difficulty: f64,
}

/// A recent transaction as shown in the activity feed.
///
/// Immutable once created. The hash is a display-only identifier with
/// best-effort uniqueness; it is not cryptographically meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: String,
    /// Amount in display units, [0, 10)
    pub amount: f64,
    /// Fee in display units, [0, 0.001)
    pub fee: f64,
    /// Confirmation count, [0, 6)
    pub confirmations: u32,
    pub timestamp: DateTime<Utc>,
}

/// A recent block as shown in the latest-blocks feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub height: u64,
    pub hash: String,
    /// Transactions included in the block
    pub transactions: u32,
    /// Block size in megabytes
    pub size_mb: f64,
    pub miner: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded most-recent-first feed.
///
/// Pushing a new entry at the front evicts the oldest entry once the
/// window capacity is exceeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedWindow<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> FeedWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts the newest entry, evicting the oldest beyond capacity.
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// Most-recent-first view of the window.
    pub fn entries(&self) -> &VecDeque<T> {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Newest entry, if any.
    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Complete simulated dashboard state.
///
/// The `sequence` number increases by one per updater tick, so consumers
/// can tell snapshots apart and detect missed updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub sequence: u64,
    pub generated_at: DateTime<Utc>,
    pub market: MarketState,
    pub network: NetworkMetrics,
    pub transactions: FeedWindow<TransactionSummary>,
    pub blocks: FeedWindow<BlockSummary>,
}

const ID_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a base-36 display identifier of the given length.
///
/// Matches the shape of `Math.random().toString(36)` identifiers in the
/// reference dashboard. Uniqueness is best-effort only.
pub fn random_id<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ID_CHARSET[rng.random_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Rounds to 2 decimal places, the display precision for prices.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to 8 decimal places, the display precision for amounts.
pub(crate) fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

/// Formats a timestamp as the series point label.
pub(crate) fn time_label(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_feed_window_evicts_oldest() {
        let mut feed = FeedWindow::new(3);
        for i in 0..5 {
            feed.push(i);
        }

        assert_eq!(feed.len(), 3);
        // Most recent first; 0 and 1 were evicted
        assert_eq!(feed.entries().iter().copied().collect::<Vec<_>>(), vec![
            4, 3, 2
        ]);
        assert_eq!(feed.latest(), Some(&4));
    }

    #[test]
    fn test_feed_window_under_capacity() {
        let mut feed = FeedWindow::new(10);
        feed.push("a");
        feed.push("b");

        assert_eq!(feed.len(), 2);
        assert_eq!(feed.latest(), Some(&"b"));
    }

    #[test]
    fn test_random_id_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let id = random_id(&mut rng, 13);

        assert_eq!(id.len(), 13);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_random_id_deterministic_per_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);

        assert_eq!(random_id(&mut a, 26), random_id(&mut b, 26));
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round2(45234.6749), 45234.67);
        assert_eq!(round2(2.346), 2.35);
        assert_eq!(round8(0.123456789), 0.12345679);
    }
}
