//! Initial state fabrication.
//!
//! Produces a complete synthetic snapshot from scratch using bounded
//! pseudo-random draws. Randomness is always supplied by the caller, so
//! a seeded source reproduces identical snapshots.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::{
    BlockSummary, FeedWindow, MarketSnapshot, MarketState, NetworkMetrics, PricePoint,
    TransactionSummary, random_id, round2, round8,
};
use crate::config::WatchConfig;

/// Length of feed identifiers (matches the reference base-36 ids).
const SUMMARY_ID_LEN: usize = 13;

/// Draws one bounded price perturbation: `value * volatility * (r - 0.5) * 2`.
///
/// The result is symmetric around zero with magnitude at most
/// `value * volatility`.
pub(crate) fn perturbation<R: Rng>(rng: &mut R, value: f64, volatility: f64) -> f64 {
    value * volatility * (rng.random::<f64>() - 0.5) * 2.0
}

/// Fabricates initial market snapshots.
#[derive(Debug, Clone)]
pub struct MarketGenerator {
    config: WatchConfig,
}

impl MarketGenerator {
    pub fn new(config: WatchConfig) -> Self {
        Self { config }
    }

    /// Generates the initial price series.
    ///
    /// Starts from the base price and applies one bounded multiplicative
    /// perturbation per point, clamped to the price floor and rounded to
    /// display precision. Labels are synthetic hours `00:00`..`23:00`.
    pub fn price_series<R: Rng>(&self, rng: &mut R) -> Vec<PricePoint> {
        let market = &self.config.market;
        let mut current = market.base_price;

        (0..market.series_len)
            .map(|hour| {
                let change = perturbation(rng, current, market.initial_volatility);
                current = (current + change).max(market.price_floor);

                PricePoint {
                    label: format!("{hour:02}:00"),
                    price: round2(current),
                    volume: rng.random_range(0..=market.max_volume),
                }
            })
            .collect()
    }

    /// Fabricates one feed transaction with a fresh display identifier.
    pub fn transaction<R: Rng>(&self, rng: &mut R, now: DateTime<Utc>) -> TransactionSummary {
        TransactionSummary {
            hash: random_id(rng, SUMMARY_ID_LEN),
            amount: round8(rng.random::<f64>() * 10.0),
            fee: round8(rng.random::<f64>() * 0.001),
            confirmations: rng.random_range(0..6),
            timestamp: now,
        }
    }

    /// Fabricates one feed block.
    pub fn block<R: Rng>(&self, rng: &mut R, now: DateTime<Utc>) -> BlockSummary {
        let feeds = &self.config.feeds;

        BlockSummary {
            height: feeds.block_height_base + rng.random_range(0..feeds.block_height_span),
            hash: random_id(rng, SUMMARY_ID_LEN),
            transactions: rng
                .random_range(feeds.min_block_transactions..feeds.max_block_transactions),
            size_mb: round2(rng.random::<f64>() * 2.0 + 1.0),
            miner: feeds.miners[rng.random_range(0..feeds.miners.len())].to_string(),
            timestamp: now,
        }
    }

    /// Generates a complete initial snapshot (sequence 0).
    pub fn snapshot<R: Rng>(&self, rng: &mut R, now: DateTime<Utc>) -> MarketSnapshot {
        let market = &self.config.market;
        let network = &self.config.network;
        let feeds = &self.config.feeds;

        let mut transactions = FeedWindow::new(feeds.transaction_window);
        for _ in 0..feeds.transaction_window {
            let tx = self.transaction(rng, now);
            transactions.push(tx);
        }

        let mut blocks = FeedWindow::new(feeds.block_window);
        for _ in 0..feeds.block_window {
            let block = self.block(rng, now);
            blocks.push(block);
        }

        MarketSnapshot {
            sequence: 0,
            generated_at: now,
            market: MarketState {
                current_price: market.initial_price,
                price_change_24h: market.initial_change_24h,
                series: self.price_series(rng),
            },
            network: NetworkMetrics {
                mempool_size: network.initial_mempool_size,
                avg_fee_rate: network.initial_avg_fee,
                hash_rate: network.hash_rate,
                difficulty: network.difficulty,
            },
            transactions,
            blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn generator() -> MarketGenerator {
        MarketGenerator::new(WatchConfig::default())
    }

    #[test]
    fn test_price_series_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let series = generator().price_series(&mut rng);

        assert_eq!(series.len(), 24);
        assert_eq!(series[0].label, "00:00");
        assert_eq!(series[23].label, "23:00");

        for point in &series {
            assert!(point.price >= 30_000.0, "price {} below floor", point.price);
            assert_eq!(point.price, round2(point.price));
            assert!(point.volume <= 1_000_000_000);
        }
    }

    #[test]
    fn test_price_series_deterministic_per_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);

        assert_eq!(generator().price_series(&mut a), generator().price_series(&mut b));
    }

    #[test]
    fn test_transaction_field_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let market_gen = generator();

        for _ in 0..100 {
            let tx = market_gen.transaction(&mut rng, Utc::now());
            assert_eq!(tx.hash.len(), 13);
            assert!((0.0..10.0).contains(&tx.amount));
            assert!((0.0..0.001).contains(&tx.fee));
            assert!(tx.confirmations < 6);
        }
    }

    #[test]
    fn test_block_field_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let market_gen = generator();
        let config = WatchConfig::default();

        for _ in 0..100 {
            let block = market_gen.block(&mut rng, Utc::now());
            assert!((800_000..801_000).contains(&block.height));
            assert!((1_000..4_000).contains(&block.transactions));
            assert!((1.0..3.01).contains(&block.size_mb));
            assert!(config.feeds.miners.contains(&block.miner.as_str()));
        }
    }

    #[test]
    fn test_initial_snapshot() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let snapshot = generator().snapshot(&mut rng, Utc::now());

        assert_eq!(snapshot.sequence, 0);
        assert_eq!(snapshot.market.current_price, 45_234.67);
        assert_eq!(snapshot.market.price_change_24h, 1_234.56);
        assert_eq!(snapshot.market.series.len(), 24);
        assert_eq!(snapshot.transactions.len(), 10);
        assert_eq!(snapshot.blocks.len(), 5);
        assert_eq!(snapshot.network.mempool_size, 150_000);
        assert_eq!(snapshot.network.avg_fee_rate, 25.12345);
    }

    #[test]
    fn test_snapshot_deterministic_per_seed() {
        let now = Utc::now();
        let mut a = ChaCha8Rng::seed_from_u64(21);
        let mut b = ChaCha8Rng::seed_from_u64(21);

        assert_eq!(
            generator().snapshot(&mut a, now),
            generator().snapshot(&mut b, now)
        );
    }
}
