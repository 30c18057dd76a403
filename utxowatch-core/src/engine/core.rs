//! Engine state and transition logic.

use std::sync::Arc;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::watch;

use super::commands::EngineStats;
use crate::config::WatchConfig;
use crate::market::{MarketGenerator, MarketSnapshot, MarketUpdater};
use crate::rates::RateTable;

/// Owns the live simulation state.
///
/// All mutation happens here, driven by the actor loop. The snapshot is
/// replaced wholesale on every transition and published through a
/// `watch` channel, so readers never see a partial update.
pub struct ExplorerEngine {
    rng: ChaCha8Rng,
    generator: MarketGenerator,
    updater: MarketUpdater,
    snapshot: Arc<MarketSnapshot>,
    rates: RateTable,
    snapshot_tx: watch::Sender<Arc<MarketSnapshot>>,
    rates_tx: watch::Sender<RateTable>,
    refresh_pending: bool,
    stats: EngineStats,
}

impl ExplorerEngine {
    /// Creates the engine with its initial snapshot and the receiver
    /// halves of the publication channels.
    ///
    /// The random source is seeded from the configuration when a
    /// deterministic seed is set, otherwise from entropy.
    pub fn new(
        config: WatchConfig,
    ) -> (
        Self,
        watch::Receiver<Arc<MarketSnapshot>>,
        watch::Receiver<RateTable>,
    ) {
        let seed = config
            .simulation
            .deterministic_seed
            .unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let generator = MarketGenerator::new(config.clone());
        let updater = MarketUpdater::new(config.clone());
        let snapshot = Arc::new(generator.snapshot(&mut rng, Utc::now()));
        let rates = RateTable::default();

        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::clone(&snapshot));
        let (rates_tx, rates_rx) = watch::channel(rates.clone());

        tracing::debug!(seed, "explorer engine initialized");

        let engine = Self {
            rng,
            generator,
            updater,
            snapshot,
            rates,
            snapshot_tx,
            rates_tx,
            refresh_pending: false,
            stats: EngineStats::default(),
        };

        (engine, snapshot_rx, rates_rx)
    }

    /// Advances the snapshot by one market tick and publishes it.
    pub fn tick(&mut self) {
        let next = Arc::new(self.updater.tick(&mut self.rng, &self.snapshot, Utc::now()));
        tracing::trace!(
            sequence = next.sequence,
            price = next.market.current_price,
            mempool = next.network.mempool_size,
            "market tick"
        );

        self.snapshot = Arc::clone(&next);
        self.stats.ticks += 1;
        let _ = self.snapshot_tx.send(next);
    }

    /// Perturbs the exchange-rate table and publishes it.
    pub fn rates_tick(&mut self) {
        self.rates.perturb(&mut self.rng);
        self.stats.rate_updates += 1;
        let _ = self.rates_tx.send(self.rates.clone());
    }

    /// Marks a refresh as pending. Returns `false` if one is already in
    /// flight; the caller must then drop the request.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refresh_pending {
            tracing::debug!("refresh ignored, one already pending");
            return false;
        }
        self.refresh_pending = true;
        true
    }

    /// Completes a pending refresh: regenerates the full snapshot from
    /// scratch and publishes it. The sequence number keeps increasing
    /// across refreshes.
    pub fn finish_refresh(&mut self) {
        let mut regenerated = self.generator.snapshot(&mut self.rng, Utc::now());
        regenerated.sequence = self.snapshot.sequence + 1;

        let next = Arc::new(regenerated);
        self.snapshot = Arc::clone(&next);
        self.refresh_pending = false;
        self.stats.refreshes += 1;
        tracing::debug!(sequence = next.sequence, "refresh completed");
        let _ = self.snapshot_tx.send(next);
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<MarketSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Current exchange-rate table.
    pub fn rates(&self) -> RateTable {
        self.rates.clone()
    }

    /// Current activity counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            refresh_pending: self.refresh_pending,
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ExplorerEngine {
        ExplorerEngine::new(WatchConfig::for_testing()).0
    }

    #[test]
    fn test_tick_replaces_snapshot() {
        let mut engine = engine();
        let before = engine.snapshot();

        engine.tick();
        let after = engine.snapshot();

        assert_eq!(after.sequence, before.sequence + 1);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(engine.stats().ticks, 1);
    }

    #[test]
    fn test_deterministic_seed_reproduces_state() {
        let mut a = engine();
        let mut b = engine();

        for _ in 0..10 {
            a.tick();
            b.tick();
        }

        // Wall-clock timestamps differ between the two engines; every
        // randomized field must not.
        let (snap_a, snap_b) = (a.snapshot(), b.snapshot());
        assert_eq!(snap_a.market.current_price, snap_b.market.current_price);
        assert_eq!(snap_a.network, snap_b.network);
        let prices = |snap: &MarketSnapshot| -> Vec<f64> {
            snap.market.series.iter().map(|p| p.price).collect()
        };
        assert_eq!(prices(&snap_a), prices(&snap_b));
        let hashes = |snap: &MarketSnapshot| -> Vec<String> {
            snap.transactions.iter().map(|tx| tx.hash.clone()).collect()
        };
        assert_eq!(hashes(&snap_a), hashes(&snap_b));
        assert_eq!(a.rates(), b.rates());
    }

    #[test]
    fn test_refresh_is_exclusive() {
        let mut engine = engine();

        assert!(engine.begin_refresh());
        assert!(!engine.begin_refresh());
        assert!(engine.stats().refresh_pending);

        engine.finish_refresh();
        assert!(!engine.stats().refresh_pending);
        assert_eq!(engine.stats().refreshes, 1);

        // A new refresh may start once the previous one landed
        assert!(engine.begin_refresh());
    }

    #[test]
    fn test_finish_refresh_keeps_sequence_monotonic() {
        let mut engine = engine();
        engine.tick();
        engine.tick();

        let before = engine.snapshot().sequence;
        engine.begin_refresh();
        engine.finish_refresh();

        assert_eq!(engine.snapshot().sequence, before + 1);
    }

    #[test]
    fn test_rates_tick_publishes_new_table() {
        let (mut engine, _snapshot_rx, rates_rx) =
            ExplorerEngine::new(WatchConfig::for_testing());
        let before = rates_rx.borrow().clone();

        engine.rates_tick();

        assert_ne!(*rates_rx.borrow(), before);
        assert_eq!(engine.stats().rate_updates, 1);
    }
}
