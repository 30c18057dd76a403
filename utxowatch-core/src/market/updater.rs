//! Per-tick state advancement.
//!
//! Given the previous snapshot, produces its successor: a small bounded
//! price step, a slide of the series window, clamped random walks for
//! the mempool metrics, and probabilistic feed growth. The previous
//! snapshot is never mutated; consumers swap to the new one atomically.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::generator::{MarketGenerator, perturbation};
use super::{MarketSnapshot, MarketState, NetworkMetrics, PricePoint, round2, time_label};
use crate::config::WatchConfig;

/// Applies a signed step to a value, clamping at the floor.
pub fn clamped_step(value: f64, delta: f64, floor: f64) -> f64 {
    (value + delta).max(floor)
}

/// Integer variant of [`clamped_step`] for the mempool size walk.
pub fn clamped_step_u64(value: u64, delta: i64, floor: u64) -> u64 {
    let stepped = value as i64 + delta;
    if stepped < floor as i64 {
        floor
    } else {
        stepped as u64
    }
}

/// Advances snapshots tick by tick.
#[derive(Debug, Clone)]
pub struct MarketUpdater {
    config: WatchConfig,
    generator: MarketGenerator,
}

impl MarketUpdater {
    pub fn new(config: WatchConfig) -> Self {
        let generator = MarketGenerator::new(config.clone());
        Self { config, generator }
    }

    /// Produces the successor of `prev`.
    ///
    /// One price delta is drawn per tick and applied to the headline
    /// price, the 24h change accumulator, and the freshly appended
    /// series point, matching the reference dashboard.
    pub fn tick<R: Rng>(
        &self,
        rng: &mut R,
        prev: &MarketSnapshot,
        now: DateTime<Utc>,
    ) -> MarketSnapshot {
        let market = &self.config.market;
        let network = &self.config.network;
        let feeds = &self.config.feeds;

        let delta = perturbation(rng, prev.market.current_price, market.tick_volatility);

        let current_price = round2(clamped_step(
            prev.market.current_price,
            delta,
            market.price_floor,
        ));
        let price_change_24h = prev.market.price_change_24h + delta;

        // Slide the series window: drop the oldest point, append one
        // derived from the last point plus this tick's delta.
        let mut series = prev.market.series.clone();
        let last_price = series
            .last()
            .map_or(current_price, |point| point.price);
        if !series.is_empty() {
            series.remove(0);
        }
        series.push(PricePoint {
            label: time_label(now),
            price: round2(clamped_step(last_price, delta, market.price_floor)),
            volume: rng.random_range(0..=market.max_volume),
        });

        let mempool_delta =
            rng.random_range(-(network.mempool_step as i64)..=network.mempool_step as i64);
        let mempool_size =
            clamped_step_u64(prev.network.mempool_size, mempool_delta, network.mempool_floor);

        let fee_delta = (rng.random::<f64>() - 0.5) * (network.fee_step * 2.0);
        let avg_fee_rate = clamped_step(prev.network.avg_fee_rate, fee_delta, network.fee_floor);

        let mut transactions = prev.transactions.clone();
        if rng.random_bool(feeds.transaction_probability) {
            let tx = self.generator.transaction(rng, now);
            transactions.push(tx);
        }

        let mut blocks = prev.blocks.clone();
        if rng.random_bool(feeds.block_probability) {
            let block = self.generator.block(rng, now);
            blocks.push(block);
        }

        MarketSnapshot {
            sequence: prev.sequence + 1,
            generated_at: now,
            market: MarketState {
                current_price,
                price_change_24h,
                series,
            },
            network: NetworkMetrics {
                mempool_size,
                avg_fee_rate,
                hash_rate: prev.network.hash_rate,
                difficulty: prev.network.difficulty,
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

    fn seeded_snapshot(seed: u64) -> MarketSnapshot {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        MarketGenerator::new(WatchConfig::default()).snapshot(&mut rng, Utc::now())
    }

    #[test]
    fn test_mempool_step_without_clamp() {
        assert_eq!(clamped_step_u64(150_000, 7_000, 50_000), 157_000);
    }

    #[test]
    fn test_mempool_step_clamps_at_floor() {
        assert_eq!(clamped_step_u64(52_000, -10_000, 50_000), 50_000);
    }

    #[test]
    fn test_fee_step_clamps_at_floor() {
        let clamped = clamped_step(5.1, -0.25, 5.00001);
        assert_eq!(clamped, 5.00001);

        let unclamped = clamped_step(25.0, 0.25, 5.00001);
        assert_eq!(unclamped, 25.25);
    }

    #[test]
    fn test_tick_preserves_shape_and_bounds() {
        let updater = MarketUpdater::new(WatchConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut snapshot = seeded_snapshot(11);

        for _ in 0..500 {
            snapshot = updater.tick(&mut rng, &snapshot, Utc::now());

            assert_eq!(snapshot.market.series.len(), 24);
            assert!(snapshot.market.current_price >= 30_000.0);
            assert!(snapshot.network.mempool_size >= 50_000);
            assert!(snapshot.network.avg_fee_rate >= 5.00001);
            assert!(snapshot.transactions.len() <= 10);
            assert!(snapshot.blocks.len() <= 5);
        }
    }

    #[test]
    fn test_tick_increments_sequence() {
        let updater = MarketUpdater::new(WatchConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let prev = seeded_snapshot(12);

        let next = updater.tick(&mut rng, &prev, Utc::now());
        assert_eq!(next.sequence, prev.sequence + 1);

        let after = updater.tick(&mut rng, &next, Utc::now());
        assert_eq!(after.sequence, 2);
    }

    #[test]
    fn test_tick_slides_series_window() {
        let updater = MarketUpdater::new(WatchConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let prev = seeded_snapshot(13);

        let dropped = prev.market.series[0].clone();
        let now = Utc::now();
        let next = updater.tick(&mut rng, &prev, now);

        assert!(!next.market.series.contains(&dropped));
        assert_eq!(next.market.series[0], prev.market.series[1]);
        assert_eq!(next.market.series.last().unwrap().label, time_label(now));
    }

    #[test]
    fn test_tick_deterministic_per_seed() {
        let updater = MarketUpdater::new(WatchConfig::default());
        let prev = seeded_snapshot(14);
        let now = Utc::now();

        let mut a = ChaCha8Rng::seed_from_u64(77);
        let mut b = ChaCha8Rng::seed_from_u64(77);

        assert_eq!(updater.tick(&mut a, &prev, now), updater.tick(&mut b, &prev, now));
    }

    #[test]
    fn test_feeds_stay_newest_first() {
        let updater = MarketUpdater::new(WatchConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let mut snapshot = seeded_snapshot(15);

        for _ in 0..200 {
            snapshot = updater.tick(&mut rng, &snapshot, Utc::now());
        }

        let timestamps: Vec<_> = snapshot.transactions.iter().map(|tx| tx.timestamp).collect();
        assert!(timestamps.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
