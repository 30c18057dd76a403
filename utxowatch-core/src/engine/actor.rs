//! Actor implementation for the simulation engine.

use std::time::Duration;

use tokio::sync::mpsc;

use super::commands::EngineCommand;
use super::core::ExplorerEngine;
use super::handle::EngineHandle;
use crate::config::{EngineConfig, WatchConfig};

/// Spawns the engine actor and returns its handle.
///
/// The actor owns all simulation state and processes commands
/// sequentially, interleaved with its two periodic tasks: the market
/// tick and the exchange-rate tick. The actor stops when a shutdown
/// command arrives or every handle has been dropped.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() {
/// use utxowatch_core::config::WatchConfig;
/// use utxowatch_core::engine::spawn_engine;
///
/// let handle = spawn_engine(WatchConfig::default());
/// let snapshot = handle.snapshot().await.unwrap();
/// println!("price: {}", snapshot.market.current_price);
/// # }
/// ```
pub fn spawn_engine(config: WatchConfig) -> EngineHandle {
    let timing = config.engine.clone();
    let (sender, receiver) = mpsc::channel(timing.command_buffer);
    let (engine, snapshot_rx, rates_rx) = ExplorerEngine::new(config);

    tokio::spawn(async move {
        run_actor_loop(engine, receiver, timing).await;
    });

    EngineHandle::new(sender, snapshot_rx, rates_rx)
}

/// Runs the main actor loop.
///
/// Commands, refresh completions, and both interval timers are
/// multiplexed on one task, so every state transition is applied in
/// order and the consumer-visible snapshot is always consistent.
async fn run_actor_loop(
    mut engine: ExplorerEngine,
    mut receiver: mpsc::Receiver<EngineCommand>,
    timing: EngineConfig,
) {
    tracing::debug!("engine actor started");

    let mut market_interval = tokio::time::interval(timing.market_tick);
    let mut rates_interval = tokio::time::interval(timing.rates_tick);
    // Both intervals fire immediately on creation; consume those so the
    // generated initial snapshot stands until the first real tick.
    market_interval.tick().await;
    rates_interval.tick().await;

    // Refresh completions come in on a dedicated channel so that closing
    // the command channel (all handles dropped) still stops the loop.
    let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);

    loop {
        tokio::select! {
            command = receiver.recv() => match command {
                Some(command) => {
                    if !handle_command(&mut engine, command, &refresh_tx, timing.refresh_delay) {
                        break;
                    }
                }
                None => break,
            },
            Some(()) = refresh_rx.recv() => {
                engine.finish_refresh();
            }
            _ = market_interval.tick() => {
                engine.tick();
            }
            _ = rates_interval.tick() => {
                engine.rates_tick();
            }
        }
    }

    tracing::debug!("engine actor stopped");
}

/// Handles a single command. Returns true to continue, false to shut down.
fn handle_command(
    engine: &mut ExplorerEngine,
    command: EngineCommand,
    refresh_tx: &mpsc::Sender<()>,
    refresh_delay: Duration,
) -> bool {
    match command {
        EngineCommand::Snapshot { responder } => {
            let _ = responder.send(engine.snapshot());
        }

        EngineCommand::Rates { responder } => {
            let _ = responder.send(engine.rates());
        }

        EngineCommand::Refresh { responder } => {
            let started = engine.begin_refresh();
            if started {
                // Simulated upstream latency before the regenerated
                // snapshot lands.
                let done = refresh_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(refresh_delay).await;
                    let _ = done.send(()).await;
                });
            }
            let _ = responder.send(started);
        }

        EngineCommand::Stats { responder } => {
            let _ = responder.send(engine.stats());
        }

        EngineCommand::Shutdown { responder } => {
            let _ = responder.send(());
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_engine_answers_queries() {
        let handle = spawn_engine(WatchConfig::for_testing());

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.market.series.len(), 24);

        let rates = handle.rates().await.unwrap();
        assert!(rates.usd > 0.0);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_subscription_sees_ticks() {
        let handle = spawn_engine(WatchConfig::for_testing());
        let mut subscription = handle.subscribe();

        let first = subscription.borrow_and_update().sequence;
        subscription.changed().await.unwrap();
        let second = subscription.borrow_and_update().sequence;

        assert!(second > first);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_commands_fail_after_shutdown() {
        let handle = spawn_engine(WatchConfig::for_testing());
        handle.shutdown().await.unwrap();

        // The actor task exits asynchronously; retry until the channel
        // reports closure.
        let mut subscription = handle.subscribe();
        let _ = subscription.changed().await;
        assert_eq!(handle.snapshot().await, Err(super::super::EngineError::Shutdown));
    }
}
