//! Periodic cache sweeps.
//!
//! Each tier gets its own timer task. A sweep runs inline in its loop, so a
//! slow sweep delays the next tick instead of overlapping it, and missed
//! ticks are skipped rather than queued.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::cache::TieredCache;
use crate::config::AppConfig;

/// Sweep intervals for [`CacheMaintenance`].
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceSchedule {
    pub memory_every: Duration,
    pub filesystem_every: Duration,
}

impl MaintenanceSchedule {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { memory_every: config.memory_sweep_interval(), filesystem_every: config.filesystem_sweep_interval() }
    }
}

/// Running sweep timers. Stop them with [`CacheMaintenance::stop`].
#[derive(Debug)]
pub struct CacheMaintenance {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl CacheMaintenance {
    /// Start the timers. The first sweep of each tier happens one interval
    /// after start. Must be called inside a tokio runtime.
    pub fn start(cache: TieredCache, schedule: MaintenanceSchedule) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(2);

        let memory = cache.clone();
        tasks.push(tokio::spawn(run_every("memory", schedule.memory_every, rx.clone(), move || {
            let memory = memory.clone();
            async move {
                memory.sweep_memory().await;
            }
        })));

        if cache.filesystem().is_enabled() {
            tasks.push(tokio::spawn(run_every("filesystem", schedule.filesystem_every, rx, move || {
                let cache = cache.clone();
                async move {
                    cache.sweep_filesystem().await;
                }
            })));
        }

        tracing::info!(
            memory_every_secs = schedule.memory_every.as_secs(),
            filesystem_every_secs = schedule.filesystem_every.as_secs(),
            "Cache maintenance started"
        );

        Self { shutdown, tasks }
    }

    /// Signal every timer and wait for in-progress sweeps to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Cache maintenance task ended abnormally");
            }
        }
        tracing::info!("Cache maintenance stopped");
    }
}

async fn run_every<F, Fut>(tier: &'static str, period: Duration, mut shutdown: watch::Receiver<bool>, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let period = period.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::debug!(tier, "Running scheduled cache sweep");
                job().await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
