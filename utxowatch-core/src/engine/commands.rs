//! Command types processed by the engine actor.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::market::MarketSnapshot;
use crate::rates::RateTable;

/// Commands sent from handles to the engine actor.
#[derive(Debug)]
pub enum EngineCommand {
    /// Returns the current snapshot.
    Snapshot {
        responder: oneshot::Sender<Arc<MarketSnapshot>>,
    },

    /// Returns the current exchange-rate table.
    Rates {
        responder: oneshot::Sender<RateTable>,
    },

    /// Starts a manual refresh. Responds `true` if the refresh was
    /// started, `false` if one is already pending (the request is
    /// ignored, not queued).
    Refresh { responder: oneshot::Sender<bool> },

    /// Returns counters for ticks, rate updates, and refreshes.
    Stats {
        responder: oneshot::Sender<EngineStats>,
    },

    /// Stops the actor loop.
    Shutdown { responder: oneshot::Sender<()> },
}

/// Engine activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Market ticks applied since start
    pub ticks: u64,
    /// Exchange-rate perturbations applied since start
    pub rate_updates: u64,
    /// Completed manual refreshes
    pub refreshes: u64,
    /// Whether a refresh is currently in flight
    pub refresh_pending: bool,
}
