//! Stale-game reaper for Roundkeep.
//!
//! Games are rarely cleared explicitly: players close the tab and walk away.
//! The reaper wakes up on a fixed interval (default: hourly) and evicts every
//! game that has been idle longer than a horizon (default: 24 hours).
//!
//! # Fault isolation
//!
//! Each sweep runs in its own Tokio task. If a sweep panics, the panic is
//! caught at the task boundary, logged, and the next sweep runs on schedule.
//! The store lock is a `tokio::sync::Mutex`, which does not poison, so a
//! panicked sweep leaves the store usable.
//!
//! # Integration
//!
//! ```ignore
//! let store = Arc::new(Mutex::new(SessionStore::default()));
//! let reaper = StaleSessionReaper::new(Arc::clone(&store), ReaperConfig::default());
//! let handle = reaper.spawn();
//! // ... serve requests ...
//! handle.shutdown().await;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use roundkeep_protocol::GameId;
use roundkeep_session::{SessionStore, STALE_AFTER};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the reaper.
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// Time between sweeps. Default: 1 hour.
    pub interval: Duration,
    /// Idle time after which a game is evicted. Default: 24 hours.
    pub stale_after: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            stale_after: STALE_AFTER,
        }
    }
}

impl ReaperConfig {
    /// Shortest interval accepted by [`validated`](Self::validated).
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// `interval` is raised to [`Self::MIN_INTERVAL`]; a zero period would
    /// make the ticker panic.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                "reaper interval too short, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from a single sweep. None of them stop the reaper loop.
#[derive(Debug, thiserror::Error)]
pub enum ReaperError {
    /// The sweep task panicked.
    #[error("sweep {0} panicked")]
    SweepPanicked(u64),

    /// The sweep task was cancelled before finishing (runtime shutdown).
    #[error("sweep {0} was cancelled")]
    SweepCancelled(u64),
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

/// Something that can evict idle games.
///
/// The server's `Mutex<SessionStore>` implements this. Tests plug in their
/// own implementations to simulate slow or failing sweeps.
pub trait Sweep: Send + Sync + 'static {
    /// Evicts every game idle for longer than `horizon` as of `now` and
    /// returns the evicted codes.
    fn sweep(
        &self,
        now: Instant,
        horizon: Duration,
    ) -> impl Future<Output = Vec<GameId>> + Send;
}

impl Sweep for Mutex<SessionStore> {
    async fn sweep(&self, now: Instant, horizon: Duration) -> Vec<GameId> {
        self.lock().await.sweep_stale_at(now, horizon)
    }
}

/// Result of one successful sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Sweep number, starting at 1.
    pub sweep: u64,
    /// Codes evicted by this sweep, sorted.
    pub evicted: Vec<GameId>,
}

// ---------------------------------------------------------------------------
// Reaper
// ---------------------------------------------------------------------------

/// Periodically evicts idle games from a shared store.
pub struct StaleSessionReaper<S: Sweep = Mutex<SessionStore>> {
    store: Arc<S>,
    config: ReaperConfig,
    sweeps: u64,
}

impl<S: Sweep> StaleSessionReaper<S> {
    /// Creates a reaper over `store`. Nothing runs until
    /// [`run`](Self::run) or [`spawn`](Self::spawn).
    pub fn new(store: Arc<S>, config: ReaperConfig) -> Self {
        Self {
            store,
            config: config.validated(),
            sweeps: 0,
        }
    }

    /// The validated configuration.
    pub fn config(&self) -> &ReaperConfig {
        &self.config
    }

    /// Number of sweeps attempted so far.
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Runs one sweep right now, isolated in its own task.
    ///
    /// # Errors
    /// Returns [`ReaperError::SweepPanicked`] if the sweep panicked.
    pub async fn sweep_once(&mut self) -> Result<SweepReport, ReaperError> {
        self.sweeps += 1;
        let sweep = self.sweeps;
        let store = Arc::clone(&self.store);
        let horizon = self.config.stale_after;
        let now = Instant::now();

        let evicted = tokio::spawn(async move { store.sweep(now, horizon).await })
            .await
            .map_err(|e| {
                if e.is_panic() {
                    ReaperError::SweepPanicked(sweep)
                } else {
                    ReaperError::SweepCancelled(sweep)
                }
            })?;

        Ok(SweepReport { sweep, evicted })
    }

    /// Sweeps every `interval` until `stop` flips to `true` or its sender
    /// is dropped. The first sweep happens one interval after start.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let period = self.config.interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        // A late sweep already covers everything a missed one would have.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            interval_s = period.as_secs(),
            stale_after_s = self.config.stale_after.as_secs(),
            "reaper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep_once().await {
                        Ok(report) if report.evicted.is_empty() => {
                            debug!(sweep = report.sweep, "sweep found no stale games");
                        }
                        Ok(report) => {
                            info!(
                                sweep = report.sweep,
                                evicted = report.evicted.len(),
                                "sweep evicted stale games"
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "stale sweep failed, will retry next interval");
                        }
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        debug!(sweeps = self.sweeps, "reaper stopped");
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    ///
    /// Dropping the returned handle also stops the reaper.
    pub fn spawn(self) -> ReaperHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        ReaperHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Handle to a spawned reaper.
pub struct ReaperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the reaper to stop and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "reaper task ended abnormally");
        }
    }

    /// Whether the reaper task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_hourly_with_day_horizon() {
        let cfg = ReaperConfig::default();
        assert_eq!(cfg.interval, Duration::from_secs(3600));
        assert_eq!(cfg.stale_after, Duration::from_secs(86_400));
    }

    #[test]
    fn test_validated_clamps_zero_interval() {
        let cfg = ReaperConfig {
            interval: Duration::ZERO,
            ..ReaperConfig::default()
        }
        .validated();
        assert_eq!(cfg.interval, ReaperConfig::MIN_INTERVAL);
    }

    #[test]
    fn test_validated_keeps_sane_interval() {
        let cfg = ReaperConfig::default().validated();
        assert_eq!(cfg.interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ReaperError::SweepPanicked(3).to_string(), "sweep 3 panicked");
    }
}
