//! Background eviction of idle buckets.
//!
//! Every tick visits each context and drops keys idle for longer than that
//! context's window span. A fresh bucket is equivalent to zero utilization, so
//! forgetting idle keys never changes a decision. Each store is swept shard
//! by shard under its own locks; no lock is held across contexts, and the
//! task yields to the runtime between contexts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use quotalink_core::ConfigError;
use quotalink_core::ports::Clock;

use crate::engine::{Context, Registry};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Contexts visited.
    pub contexts: usize,
    /// Keys evicted across all contexts.
    pub removed: usize,
}

impl SweepReport {
    fn record(&mut self, removed: usize) {
        self.contexts += 1;
        self.removed += removed;
    }
}

/// Periodic sweeper over a registry.
pub struct Sweeper {
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(
        registry: Arc<Registry>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidSweep);
        }

        Ok(Self {
            registry,
            clock,
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sweep every context once, synchronously.
    pub fn run_once(&self) -> SweepReport {
        let now = self.clock.now_millis();
        let mut report = SweepReport::default();

        for ctx in self.registry.iter() {
            report.record(sweep_context(ctx, now));
        }

        report
    }

    async fn run_pass(&self) -> SweepReport {
        let now = self.clock.now_millis();
        let mut report = SweepReport::default();

        for ctx in self.registry.iter() {
            report.record(sweep_context(ctx, now));
            tokio::task::yield_now().await;
        }

        report
    }

    /// Spawn the periodic sweep on the current tokio runtime.
    ///
    /// The first pass runs one interval after start. The task runs until
    /// [`SweeperHandle::stop`] is called or the handle is dropped.
    pub fn start(self) -> SweeperHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            tracing::info!(?interval, "Sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = self.run_pass().await;
                        if report.removed > 0 {
                            tracing::debug!(
                                contexts = report.contexts,
                                removed = report.removed,
                                "Sweep pass finished"
                            );
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            tracing::info!("Sweeper stopped");
        });

        SweeperHandle {
            stop: stop_tx,
            task,
        }
    }
}

fn sweep_context(ctx: &Context, now: u64) -> usize {
    let removed = ctx.store().sweep(now);
    if removed > 0 {
        tracing::debug!(
            context = ctx.name(),
            removed,
            remaining = ctx.store().len(),
            "Evicted idle keys"
        );
    }
    removed
}

/// Control handle for a running sweeper task.
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(self) {
        // Err only means the task already exited.
        let _ = self.stop.send(true);

        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Sweeper task did not shut down cleanly");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
