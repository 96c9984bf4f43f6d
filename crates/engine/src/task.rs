// In crates/engine/src/task.rs

use crate::Engine;
use crate::types::TickOutcome;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to the spawned tick loop.
pub(crate) struct Runner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Runner {
    /// Spawns the loop. The first tick fires one poll interval after start.
    pub(crate) fn spawn(engine: Engine, period: std::time::Duration) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(run(engine, period, rx));
        Self { shutdown, handle }
    }

    /// Signals the loop and waits until it has exited.
    pub(crate) async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Tick loop terminated abnormally.");
        }
    }
}

async fn run(engine: Engine, period: std::time::Duration, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(period_secs = period.as_secs(), "Tick loop started.");

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = interval.tick() => {
                // A tick parked on the balance gate is dropped on shutdown.
                tokio::select! {
                    _ = shutdown.changed() => break,
                    result = engine.tick() => match result {
                        Ok(TickOutcome::Quiet) => {}
                        Ok(outcome) => tracing::debug!(?outcome, "Tick resolved."),
                        Err(e) => tracing::error!(error = %e, "Tick failed."),
                    },
                }
            }
        }
    }

    tracing::info!("Tick loop stopped.");
}
