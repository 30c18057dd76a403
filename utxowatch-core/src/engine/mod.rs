//! Timer-driven simulation engine.
//!
//! The engine runs as an actor on the tokio runtime. It owns the live
//! snapshot, the exchange-rate table, and the seeded random source, and
//! advances them on two independent cadences: the market tick and the
//! rates tick. Commands arrive over a channel and are processed
//! sequentially, so state transitions never interleave. Consumers
//! observe state through `watch` channels: each publication replaces the
//! whole snapshot atomically.

mod actor;
mod commands;
mod core;
mod handle;

pub use actor::spawn_engine;
pub use commands::{EngineCommand, EngineStats};
pub use core::ExplorerEngine;
pub use handle::EngineHandle;

/// Errors from engine communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The actor task is gone; no further commands can be processed.
    #[error("engine has shut down")]
    Shutdown,
}
