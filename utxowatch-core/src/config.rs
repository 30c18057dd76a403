//! Centralized configuration for utxowatch.
//!
//! All tunable simulation parameters are defined here to avoid
//! hard-coded values scattered throughout the codebase. The defaults
//! reproduce the reference dashboard behavior exactly.

use std::time::Duration;

/// Central configuration for all utxowatch components.
///
/// Groups related settings into logical sections. Supports environment
/// variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct WatchConfig {
    pub market: MarketConfig,
    pub network: NetworkConfig,
    pub feeds: FeedConfig,
    pub engine: EngineConfig,
    pub simulation: SimulationConfig,
}

/// Price series simulation parameters.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Starting price for freshly generated series
    pub base_price: f64,
    /// Headline price shown before the first tick lands
    pub initial_price: f64,
    /// Starting value of the 24h change accumulator
    pub initial_change_24h: f64,
    /// Price never drops below this floor
    pub price_floor: f64,
    /// Multiplicative volatility for initial series generation
    pub initial_volatility: f64,
    /// Smaller volatility applied on each live tick
    pub tick_volatility: f64,
    /// Number of points in the price series window
    pub series_len: usize,
    /// Upper bound for per-point volume draws
    pub max_volume: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_price: 45_000.0,
            initial_price: 45_234.67,
            initial_change_24h: 1_234.56,
            price_floor: 30_000.0,
            initial_volatility: 0.02, // 2% per generated point
            tick_volatility: 0.001,   // 0.1% per live tick
            series_len: 24,
            max_volume: 1_000_000_000,
        }
    }
}

/// Mempool and network metric simulation parameters.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Mempool size at session start
    pub initial_mempool_size: u64,
    /// Mempool size never drops below this floor
    pub mempool_floor: u64,
    /// Half-span of the per-tick mempool random walk
    pub mempool_step: u64,
    /// Average fee rate at session start, in sat/vB
    pub initial_avg_fee: f64,
    /// Fee rate never drops below this floor
    pub fee_floor: f64,
    /// Half-span of the per-tick fee random walk
    pub fee_step: f64,
    /// Network hash rate in EH/s (static in the reference)
    pub hash_rate: f64,
    /// Network difficulty in T (static in the reference)
    pub difficulty: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            initial_mempool_size: 150_000,
            mempool_floor: 50_000,
            mempool_step: 5_000,
            initial_avg_fee: 25.12345,
            fee_floor: 5.00001,
            fee_step: 0.25,
            hash_rate: 450.0,
            difficulty: 62.46,
        }
    }
}

/// Transaction and block feed parameters.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Maximum entries in the recent-transaction feed
    pub transaction_window: usize,
    /// Maximum entries in the recent-block feed
    pub block_window: usize,
    /// Probability of a new transaction arriving on a tick
    pub transaction_probability: f64,
    /// Probability of a new block arriving on a tick
    pub block_probability: f64,
    /// Lowest fabricated block height
    pub block_height_base: u64,
    /// Height draws fall in [base, base + span)
    pub block_height_span: u64,
    /// Transaction counts fall in [min, max)
    pub min_block_transactions: u32,
    pub max_block_transactions: u32,
    /// Miner labels attached to fabricated blocks
    pub miners: &'static [&'static str],
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            transaction_window: 10,
            block_window: 5,
            transaction_probability: 0.3,
            block_probability: 0.1,
            block_height_base: 800_000,
            block_height_span: 1_000,
            min_block_transactions: 1_000,
            max_block_transactions: 4_000,
            miners: &["Antpool", "F2Pool", "Foundry USA", "ViaBTC"],
        }
    }
}

/// Engine cadence configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval between market/network snapshot ticks
    pub market_tick: Duration,
    /// Interval between exchange-rate perturbations
    pub rates_tick: Duration,
    /// Artificial delay before a manual refresh lands
    pub refresh_delay: Duration,
    /// Command channel buffer size
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            market_tick: Duration::from_millis(3000),
            rates_tick: Duration::from_millis(5000),
            refresh_delay: Duration::from_millis(1000),
            command_buffer: 100,
        }
    }
}

/// Simulation determinism configuration.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    /// Deterministic seed for reproducible runs (None = entropy)
    pub deterministic_seed: Option<u64>,
}

impl WatchConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(tick) = std::env::var("UTXOWATCH_MARKET_TICK_MS") {
            if let Ok(ms) = tick.parse::<u64>() {
                config.engine.market_tick = Duration::from_millis(ms);
            }
        }

        if let Ok(tick) = std::env::var("UTXOWATCH_RATES_TICK_MS") {
            if let Ok(ms) = tick.parse::<u64>() {
                config.engine.rates_tick = Duration::from_millis(ms);
            }
        }

        if let Ok(delay) = std::env::var("UTXOWATCH_REFRESH_DELAY_MS") {
            if let Ok(ms) = delay.parse::<u64>() {
                config.engine.refresh_delay = Duration::from_millis(ms);
            }
        }

        if let Ok(seed) = std::env::var("UTXOWATCH_SEED") {
            if let Ok(seed_value) = seed.parse::<u64>() {
                config.simulation.deterministic_seed = Some(seed_value);
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Uses a fixed seed and aggressively shortened cadences so
    /// integration tests observe several ticks in milliseconds.
    pub fn for_testing() -> Self {
        Self {
            engine: EngineConfig {
                market_tick: Duration::from_millis(10),
                rates_tick: Duration::from_millis(15),
                refresh_delay: Duration::from_millis(20),
                command_buffer: 100,
            },
            simulation: SimulationConfig {
                deterministic_seed: Some(42),
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = WatchConfig::default();

        assert_eq!(config.market.base_price, 45_000.0);
        assert_eq!(config.market.price_floor, 30_000.0);
        assert_eq!(config.market.series_len, 24);
        assert_eq!(config.network.initial_mempool_size, 150_000);
        assert_eq!(config.network.mempool_floor, 50_000);
        assert_eq!(config.network.fee_floor, 5.00001);
        assert_eq!(config.feeds.transaction_window, 10);
        assert_eq!(config.feeds.block_window, 5);
        assert_eq!(config.engine.market_tick, Duration::from_millis(3000));
        assert_eq!(config.engine.rates_tick, Duration::from_millis(5000));
        assert!(config.simulation.deterministic_seed.is_none());
    }

    #[test]
    fn test_testing_preset() {
        let config = WatchConfig::for_testing();

        assert_eq!(config.simulation.deterministic_seed, Some(42));
        assert!(config.engine.market_tick < Duration::from_millis(100));
        assert!(config.engine.refresh_delay < Duration::from_millis(100));
        // Simulation constants are unchanged by the preset
        assert_eq!(config.market.series_len, 24);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("UTXOWATCH_MARKET_TICK_MS", "50");
            std::env::set_var("UTXOWATCH_RATES_TICK_MS", "75");
            std::env::set_var("UTXOWATCH_SEED", "12345");
        }

        let config = WatchConfig::from_env();

        assert_eq!(config.engine.market_tick, Duration::from_millis(50));
        assert_eq!(config.engine.rates_tick, Duration::from_millis(75));
        assert_eq!(config.simulation.deterministic_seed, Some(12345));

        // Cleanup
        unsafe {
            std::env::remove_var("UTXOWATCH_MARKET_TICK_MS");
            std::env::remove_var("UTXOWATCH_RATES_TICK_MS");
            std::env::remove_var("UTXOWATCH_SEED");
        }
    }
}
