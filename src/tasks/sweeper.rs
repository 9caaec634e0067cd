//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::MemCache;
use crate::error::{CacheError, Result};

/// Shortest interval the sweeper will tick at.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

// == Sweeper Handle ==
/// Owns a running sweeper task.
///
/// Call [`stop`](Self::stop) for an orderly shutdown. Dropping the handle
/// aborts the task.
#[derive(Debug)]
#[must_use = "dropping the handle stops the sweeper"]
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits until it has exited.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // Receiver is gone only if the task already exited
            let _ = shutdown.send(());
        }
        let _ = (&mut self.task).await;
    }

    /// Returns true once the sweeper task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a background task that periodically purges expired cache entries.
///
/// The first sweep happens one `interval` after spawning. Each sweep runs
/// [`MemCache::purge_expired`], which only holds exclusive access per removal.
///
/// # Errors
/// Returns [`CacheError::NoRuntime`] when called outside a tokio runtime.
///
/// # Example
/// ```ignore
/// let cache: MemCache<String> = MemCache::new();
/// let sweeper = spawn_sweeper(cache.clone(), Duration::from_secs(1))?;
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweeper<V>(cache: MemCache<V>, interval: Duration) -> Result<SweeperHandle>
where
    V: Send + Sync + 'static,
{
    let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = runtime.spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Expiry sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = cache.purge_expired();
                    if removed > 0 {
                        info!("Expiry sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Expiry sweep: no expired entries found");
                    }
                }
            }
        }
    });

    Ok(SweeperHandle {
        shutdown: Some(shutdown_tx),
        task,
    })
}
