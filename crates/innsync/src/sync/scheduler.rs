//! Periodic trigger for the sync pipeline.
//!
//! The scheduler owns a single tokio task driving an interval ticker. Ticks
//! are serialized by construction: the loop awaits the injected sync future
//! before polling the ticker again, and missed ticks are delayed rather
//! than queued, so two runs never overlap.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::types::SyncError;

#[derive(Debug)]
struct SchedulerState {
    running: bool,
    next_run: Option<DateTime<Utc>>,
    stop_tx: Option<watch::Sender<bool>>,
}

/// Drives the periodic sync tick.
pub struct Scheduler {
    interval: Duration,
    state: RwLock<SchedulerState>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: RwLock::new(SchedulerState {
                running: false,
                next_run: None,
                stop_tx: None,
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.state.read().unwrap_or_else(|e| e.into_inner()).running
    }

    /// The next scheduled tick, `None` while stopped.
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .next_run
    }

    /// Start the tick loop.
    ///
    /// `sync_fn` is invoked on every tick and awaited to completion before
    /// the next tick is considered. The loop exits when [`stop`](Self::stop)
    /// is called or the caller's `cancel` signal fires.
    ///
    /// Returns `AlreadyRunning` on double-start.
    pub fn start<F, Fut>(
        self: &Arc<Self>,
        mut cancel: watch::Receiver<bool>,
        sync_fn: F,
    ) -> Result<(), SyncError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            if state.running {
                return Err(SyncError::AlreadyRunning);
            }
            state.running = true;
            state.next_run = Some(Utc::now() + self.interval);
            state.stop_tx = Some(stop_tx);
        }

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + scheduler.interval,
                scheduler.interval,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_secs = scheduler.interval.as_secs(),
                "Scheduler started"
            );

            // A dropped cancel sender is not a cancellation; stop watching it.
            let mut cancel_open = true;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tracing::info!("Starting scheduled synchronization");
                        sync_fn().await;
                        scheduler.advance_next_run();
                    }
                    _ = stop_rx.changed() => {
                        tracing::info!("Scheduler stopped manually");
                        break;
                    }
                    changed = cancel.changed(), if cancel_open => {
                        match changed {
                            Ok(()) if *cancel.borrow() => {
                                tracing::info!("Scheduler stopped due to cancellation");
                                break;
                            }
                            Ok(()) => {}
                            Err(_) => cancel_open = false,
                        }
                    }
                }
            }

            let mut state = scheduler.state.write().unwrap_or_else(|e| e.into_inner());
            state.running = false;
            state.next_run = None;
        });

        Ok(())
    }

    fn advance_next_run(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let next = Utc::now() + self.interval;
        state.next_run = Some(next);
        tracing::debug!(next_run = %next, "Next sync scheduled");
    }

    /// Stop the tick loop. Double-stop is a no-op.
    pub fn stop(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.running {
            return;
        }

        state.running = false;
        state.next_run = None;
        if let Some(stop_tx) = state.stop_tx.take() {
            let _ = stop_tx.send(true);
        }

        tracing::info!("Scheduler stopped");
    }
}
