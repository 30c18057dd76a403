//! utxowatch Core - Synthetic market and network state simulation
//!
//! This crate provides the fundamental building blocks for the utxowatch
//! dashboard: fabricated market snapshots (price series, transaction and
//! block feeds, mempool metrics), a simulated exchange-rate table with a
//! pure currency-conversion engine, and the timer-driven engine that
//! replaces the live snapshot on a fixed cadence.
//!
//! All data is pseudo-random and display-only. There is no network
//! communication, no persistence, and no cryptographic validation.

pub mod config;
pub mod details;
pub mod engine;
pub mod market;
pub mod rates;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::WatchConfig;
pub use details::DetailGenerator;
pub use engine::{EngineError, EngineHandle, spawn_engine};
pub use market::{MarketGenerator, MarketSnapshot, MarketUpdater};
pub use rates::{Currency, RateTable, RatesError};

/// Core errors that can bubble up from any utxowatch subsystem.
#[derive(Debug, thiserror::Error)]
pub enum UtxoWatchError {
    #[error("Rates error: {0}")]
    Rates(#[from] RatesError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl UtxoWatchError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            UtxoWatchError::Rates(e) => match e {
                RatesError::NonPositiveRate { currency, rate } => {
                    format!("Exchange rate for {currency} is not positive ({rate})")
                }
                RatesError::NegativeAmount { .. } => {
                    "Amounts must not be negative".to_string()
                }
                RatesError::UnknownCurrency { .. } => "Unknown currency code".to_string(),
            },
            UtxoWatchError::Engine(_) => "Simulation engine is not running".to_string(),
            UtxoWatchError::Configuration { reason } => {
                format!("Configuration error: {reason}")
            }
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            UtxoWatchError::Configuration { .. }
                | UtxoWatchError::Rates(RatesError::UnknownCurrency { .. })
                | UtxoWatchError::Rates(RatesError::NegativeAmount { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, UtxoWatchError>;
