//! Reclaimer Task
//!
//! Background task that shrinks a cache back to its low watermark when asked
//! and periodically removes expired entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::Shared;

/// Longest sweep period the timer is armed with; longer intervals are capped.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Owner's side of a running reclaimer.
#[derive(Debug)]
pub(crate) struct ReclaimerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ReclaimerHandle {
    /// Signals shutdown and waits for the task to exit.
    pub(crate) async fn stop(self) {
        // The task may already be gone if the runtime is shutting down
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            warn!(error = %err, "reclaimer task did not exit cleanly");
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns the reclaimer for one cache.
///
/// The task waits for whichever comes first of a shrink request, the sweep
/// timer and shutdown. Shutdown is also assumed when the handle is dropped.
/// The first sweep happens one full interval after spawning.
pub(crate) fn spawn_reclaimer<V>(
    runtime: &Handle,
    shared: Arc<Shared<V>>,
    mut shrink_rx: mpsc::Receiver<()>,
) -> ReclaimerHandle
where
    V: Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let period = shared.config.interval.min(FAR_FUTURE);

    let task = runtime.spawn(async move {
        let name = shared.config.name.clone();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(cache = %name, "reclaimer started");

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => break,

                Some(()) = shrink_rx.recv() => {
                    let reclaimed = shared.shrink().await;
                    if reclaimed.entries > 0 {
                        info!(
                            cache = %name,
                            entries = reclaimed.entries,
                            size = reclaimed.size,
                            "shrink: evicted least recently used entries"
                        );
                    } else {
                        debug!(cache = %name, "shrink: already below low watermark");
                    }
                }

                _ = ticker.tick() => {
                    let reclaimed = shared.sweep_expired().await;
                    if reclaimed.entries > 0 {
                        info!(
                            cache = %name,
                            entries = reclaimed.entries,
                            size = reclaimed.size,
                            "sweep: removed expired entries"
                        );
                    } else {
                        debug!(cache = %name, "sweep: no expired entries found");
                    }
                }
            }
        }

        debug!(cache = %name, "reclaimer stopped");
    });

    ReclaimerHandle {
        shutdown: shutdown_tx,
        task,
    }
}
