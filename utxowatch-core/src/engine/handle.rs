//! Handle for communicating with the engine actor.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use super::EngineError;
use super::commands::{EngineCommand, EngineStats};
use crate::market::MarketSnapshot;
use crate::rates::RateTable;

/// Handle for communicating with the engine actor.
///
/// Provides an ergonomic async API for sending commands to the engine.
/// It can be cloned and shared across tasks safely; the actor stops when
/// every handle has been dropped.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineCommand>,
    snapshot_rx: watch::Receiver<Arc<MarketSnapshot>>,
    rates_rx: watch::Receiver<RateTable>,
}

impl EngineHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<EngineCommand>,
        snapshot_rx: watch::Receiver<Arc<MarketSnapshot>>,
        rates_rx: watch::Receiver<RateTable>,
    ) -> Self {
        Self {
            sender,
            snapshot_rx,
            rates_rx,
        }
    }

    /// Subscribes to snapshot publications.
    ///
    /// Each market tick and completed refresh replaces the watched value
    /// with the full successor snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MarketSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Subscribes to exchange-rate publications.
    pub fn subscribe_rates(&self) -> watch::Receiver<RateTable> {
        self.rates_rx.clone()
    }

    /// Gets the current snapshot from the actor.
    ///
    /// # Errors
    /// - `EngineError::Shutdown` - Actor is no longer running
    pub async fn snapshot(&self) -> Result<Arc<MarketSnapshot>, EngineError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(EngineCommand::Snapshot { responder })
            .await
            .map_err(|_| EngineError::Shutdown)?;

        rx.await.map_err(|_| EngineError::Shutdown)
    }

    /// Gets the current exchange-rate table from the actor.
    ///
    /// # Errors
    /// - `EngineError::Shutdown` - Actor is no longer running
    pub async fn rates(&self) -> Result<RateTable, EngineError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(EngineCommand::Rates { responder })
            .await
            .map_err(|_| EngineError::Shutdown)?;

        rx.await.map_err(|_| EngineError::Shutdown)
    }

    /// Requests a manual refresh.
    ///
    /// Returns `true` if the refresh was started, `false` if one was
    /// already pending and this request was ignored. The regenerated
    /// snapshot arrives through the subscription after the configured
    /// artificial delay.
    ///
    /// # Errors
    /// - `EngineError::Shutdown` - Actor is no longer running
    pub async fn refresh(&self) -> Result<bool, EngineError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(EngineCommand::Refresh { responder })
            .await
            .map_err(|_| EngineError::Shutdown)?;

        rx.await.map_err(|_| EngineError::Shutdown)
    }

    /// Gets engine activity counters.
    ///
    /// # Errors
    /// - `EngineError::Shutdown` - Actor is no longer running
    pub async fn stats(&self) -> Result<EngineStats, EngineError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(EngineCommand::Stats { responder })
            .await
            .map_err(|_| EngineError::Shutdown)?;

        rx.await.map_err(|_| EngineError::Shutdown)
    }

    /// Stops the engine actor. Both periodic tasks stop with it.
    ///
    /// # Errors
    /// - `EngineError::Shutdown` - Actor had already stopped
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(EngineCommand::Shutdown { responder })
            .await
            .map_err(|_| EngineError::Shutdown)?;

        rx.await.map_err(|_| EngineError::Shutdown)
    }
}
