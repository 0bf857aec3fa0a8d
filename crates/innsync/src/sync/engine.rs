//! Sync orchestrator: drives one run end-to-end and owns the scheduler.
//!
//! One run is fetch → batch → compare → persist. Shared state (`running`,
//! `last_sync`, rolling stats) sits behind a readers-writer lock; the
//! status surface takes snapshots, the run path writes only at run start
//! and run end. A tokio mutex serializes runs so a manual trigger can never
//! overlap a scheduled tick.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tokio::sync::{watch, Mutex, Semaphore};

use crate::entity::run_status::RunStatus;
use crate::http::HttpTransport;
use crate::store::{self, RunTotals, StoreError};
use crate::upstream::{PropertyBundle, UpstreamClient, PROPERTY_IDS};

use super::compare::compare_bundles;
use super::fetch::{fetch_all, FetchOptions};
use super::scheduler::Scheduler;
use super::types::{
    format_interval, SyncConfig, SyncError, SyncResult, SyncStats, SyncStatus,
};

/// Sync service state shared with the status surface.
#[derive(Debug, Default)]
struct ServiceState {
    running: bool,
    last_sync: Option<DateTime<Utc>>,
    stats: SyncStats,
}

/// Orchestrates synchronization between the upstream API and the store.
pub struct SyncService<T> {
    client: UpstreamClient<T>,
    db: DatabaseConnection,
    config: SyncConfig,
    fetch_options: FetchOptions,
    property_ids: Vec<i64>,
    scheduler: RwLock<Option<Arc<Scheduler>>>,
    state: RwLock<ServiceState>,
    /// Serializes runs: a tick and a manual trigger can never overlap.
    run_lock: Mutex<()>,
}

/// Outcome for one property inside a batch.
enum PropertyOutcome {
    Updated,
    Unchanged,
    Failed,
    Cancelled,
}

impl<T> SyncService<T>
where
    T: HttpTransport + Clone + 'static,
{
    pub fn new(client: UpstreamClient<T>, db: DatabaseConnection, config: SyncConfig) -> Self {
        Self {
            client,
            db,
            config,
            fetch_options: FetchOptions::default(),
            property_ids: PROPERTY_IDS.to_vec(),
            scheduler: RwLock::new(None),
            state: RwLock::new(ServiceState::default()),
            run_lock: Mutex::new(()),
        }
    }

    /// Override the tracked property ids (defaults to the full fixed set).
    pub fn with_property_ids(mut self, ids: Vec<i64>) -> Self {
        self.property_ids = ids;
        self
    }

    /// Override the fetch fan-out options.
    pub fn with_fetch_options(mut self, options: FetchOptions) -> Self {
        self.fetch_options = options;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Start the automatic scheduler.
    ///
    /// A no-op success when auto sync is disabled; `AlreadyRunning` when the
    /// scheduler is already active. `interval_override` replaces the
    /// configured period for this activation.
    pub fn start(
        self: &Arc<Self>,
        cancel: watch::Receiver<bool>,
        interval_override: Option<Duration>,
    ) -> Result<(), SyncError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.running {
            return Err(SyncError::AlreadyRunning);
        }

        if !self.config.enable_auto {
            tracing::info!("Automatic sync is disabled");
            return Ok(());
        }

        let interval = interval_override.unwrap_or(self.config.interval);
        let scheduler = Arc::new(Scheduler::new(interval));

        let service = Arc::clone(self);
        let run_cancel = cancel.clone();
        scheduler.start(cancel, move || {
            let service = Arc::clone(&service);
            let run_cancel = run_cancel.clone();
            async move {
                match service.sync_now(run_cancel, "scheduled").await {
                    Ok(result) => tracing::info!(
                        sync_id = %result.sync_id,
                        status = %result.status,
                        total_properties = result.total_properties,
                        updated_properties = result.updated_properties,
                        failed_properties = result.failed_properties,
                        duration_ms = result.duration_ms,
                        "Scheduled sync finished"
                    ),
                    Err(e) => tracing::error!(error = %e, "Scheduled sync failed"),
                }
            }
        })?;

        *self.scheduler.write().unwrap_or_else(|e| e.into_inner()) = Some(scheduler);
        state.running = true;

        tracing::info!(
            interval = %format_interval(interval),
            batch_size = self.config.batch_size,
            max_concurrent = self.config.max_concurrent,
            "Sync service started"
        );

        Ok(())
    }

    /// Stop the automatic scheduler. `NotRunning` when it isn't active.
    pub fn stop(&self) -> Result<(), SyncError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.running {
            return Err(SyncError::NotRunning);
        }

        if let Some(scheduler) = self
            .scheduler
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            scheduler.stop();
        }

        state.running = false;

        tracing::info!("Sync service stopped");
        Ok(())
    }

    /// Fire-and-forget manual trigger. Returns the trigger timestamp
    /// immediately; observers poll [`status`](Self::status).
    pub fn trigger(self: &Arc<Self>) -> DateTime<Utc> {
        let triggered_at = Utc::now();
        tracing::info!("Manual sync triggered");

        let service = Arc::clone(self);
        tokio::spawn(async move {
            let (_tx, cancel) = watch::channel(false);
            match service.sync_now(cancel, "manual").await {
                Ok(result) => tracing::info!(
                    sync_id = %result.sync_id,
                    status = %result.status,
                    updated_properties = result.updated_properties,
                    "Manual sync finished"
                ),
                Err(e) => tracing::error!(error = %e, "Manual sync failed"),
            }
        });

        triggered_at
    }

    /// Run one complete synchronization now.
    ///
    /// Individual property failures are counted, not fatal. The run fails
    /// wholesale only when the fetch produced nothing but errors, or when
    /// the cancel signal fired.
    pub async fn sync_now(
        &self,
        cancel: watch::Receiver<bool>,
        sync_type: &str,
    ) -> Result<SyncResult, SyncError> {
        let _run_guard = self.run_lock.lock().await;

        let start_time = Utc::now();
        let sync_id = format!("sync_{}", start_time.format("%Y%m%d_%H%M%S%3f"));

        if let Err(e) =
            store::create_sync_log(&self.db, &sync_id, sync_type, start_time.fixed_offset()).await
        {
            tracing::warn!(sync_id = %sync_id, error = %e, "Failed to create sync log");
        }

        tracing::info!(sync_id = %sync_id, "Fetching properties from upstream");
        let fetched = fetch_all(
            &self.client,
            &self.property_ids,
            &self.fetch_options,
            cancel.clone(),
        )
        .await;

        let total_properties = fetched.success_count();

        // Nothing fetched and at least one error means the upstream (or the
        // network) is down wholesale; there is no point diffing.
        if !fetched.cancelled && total_properties == 0 && fetched.failure_count() > 0 {
            let error = SyncError::Fetch(format!(
                "all {} property fetches failed",
                fetched.failure_count()
            ));
            return Ok(self
                .finish_failed(&sync_id, start_time, &error.to_string(), RunTotals::default())
                .await);
        }

        let mut updated = 0usize;
        let mut unchanged = 0usize;
        let mut failed = 0usize;
        let mut run_cancelled = fetched.cancelled;

        let mut bundles = fetched.bundles;
        while !bundles.is_empty() {
            if *cancel.borrow() {
                run_cancelled = true;
                break;
            }

            let take = self.config.batch_size.max(1).min(bundles.len());
            let batch: Vec<PropertyBundle> = bundles.drain(..take).collect();
            let (batch_updated, batch_unchanged, batch_failed, batch_cancelled) =
                self.process_batch(batch, cancel.clone()).await;

            updated += batch_updated;
            unchanged += batch_unchanged;
            failed += batch_failed;
            if batch_cancelled {
                run_cancelled = true;
                break;
            }
        }

        let totals = RunTotals {
            total_properties: total_properties as i32,
            updated_properties: updated as i32,
            failed_properties: failed as i32,
        };

        if run_cancelled {
            tracing::warn!(sync_id = %sync_id, "Sync run cancelled; partial results committed");
            return Ok(self
                .finish_failed(&sync_id, start_time, &SyncError::Cancelled.to_string(), totals)
                .await);
        }

        if let Err(e) = store::complete_sync_log(&self.db, &sync_id, totals).await {
            tracing::warn!(sync_id = %sync_id, error = %e, "Failed to complete sync log");
        }

        let end_time = Utc::now();
        {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.last_sync = Some(end_time);
            state.stats = SyncStats {
                total_properties,
                updated_properties: updated,
                failed_properties: failed,
                last_error: None,
            };
        }

        tracing::info!(
            sync_id = %sync_id,
            total_properties,
            updated_properties = updated,
            unchanged_properties = unchanged,
            failed_properties = failed,
            fetch_errors = fetched.errors.len(),
            "Sync run completed"
        );

        Ok(SyncResult {
            sync_id,
            status: RunStatus::Completed,
            start_time,
            end_time,
            duration_ms: (end_time - start_time).num_milliseconds().max(0) as u64,
            total_properties,
            updated_properties: updated,
            failed_properties: failed,
            error: None,
        })
    }

    async fn finish_failed(
        &self,
        sync_id: &str,
        start_time: DateTime<Utc>,
        message: &str,
        totals: RunTotals,
    ) -> SyncResult {
        if let Err(e) = store::fail_sync_log(&self.db, sync_id, message, totals).await {
            tracing::warn!(sync_id = %sync_id, error = %e, "Failed to update sync log");
        }

        let end_time = Utc::now();
        {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.stats = SyncStats {
                total_properties: totals.total_properties as usize,
                updated_properties: totals.updated_properties as usize,
                failed_properties: totals.failed_properties as usize,
                last_error: Some(message.to_string()),
            };
        }

        tracing::error!(sync_id = %sync_id, error = %message, "Sync run failed");

        SyncResult {
            sync_id: sync_id.to_string(),
            status: RunStatus::Failed,
            start_time,
            end_time,
            duration_ms: (end_time - start_time).num_milliseconds().max(0) as u64,
            total_properties: totals.total_properties as usize,
            updated_properties: totals.updated_properties as usize,
            failed_properties: totals.failed_properties as usize,
            error: Some(message.to_string()),
        }
    }

    /// Process one batch with bounded parallelism.
    ///
    /// Each worker paces itself off the configured rate limit before
    /// touching the database, bounding write pressure.
    async fn process_batch(
        &self,
        batch: Vec<PropertyBundle>,
        cancel: watch::Receiver<bool>,
    ) -> (usize, usize, usize, bool) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let pacing = self.config.persist_pacing();

        let mut outcomes = Vec::with_capacity(batch.len());
        {
            let futures: Vec<_> = batch
                .into_iter()
                .map(|bundle| {
                    let semaphore = Arc::clone(&semaphore);
                    let cancel = cancel.clone();
                    async move {
                        let Ok(_permit) = semaphore.acquire().await else {
                            return PropertyOutcome::Cancelled;
                        };

                        if *cancel.borrow() {
                            return PropertyOutcome::Cancelled;
                        }

                        tokio::time::sleep(pacing).await;
                        self.process_property(&bundle).await
                    }
                })
                .collect();

            for outcome in futures::future::join_all(futures).await {
                outcomes.push(outcome);
            }
        }

        let mut updated = 0;
        let mut unchanged = 0;
        let mut failed = 0;
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                PropertyOutcome::Updated => updated += 1,
                PropertyOutcome::Unchanged => unchanged += 1,
                PropertyOutcome::Failed => failed += 1,
                PropertyOutcome::Cancelled => cancelled = true,
            }
        }

        (updated, unchanged, failed, cancelled)
    }

    /// Diff one fetched bundle against the store and persist if needed.
    async fn process_property(&self, bundle: &PropertyBundle) -> PropertyOutcome {
        let hotel_id = bundle.hotel_id();

        let stored = match store::load_bundle(&self.db, hotel_id).await {
            Ok(stored) => Some(stored),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                tracing::error!(hotel_id, error = %e, "Failed to read stored bundle");
                return PropertyOutcome::Failed;
            }
        };

        let changes = compare_bundles(bundle, stored.as_ref());
        if !changes.has_changes() {
            return match store::touch_last_synced(&self.db, hotel_id).await {
                Ok(()) => PropertyOutcome::Unchanged,
                Err(e) => {
                    tracing::error!(hotel_id, error = %e, "Failed to advance last_synced");
                    PropertyOutcome::Failed
                }
            };
        }

        tracing::debug!(
            hotel_id,
            changed_fields = ?changes.changed_fields,
            reviews_changed = changes.reviews_changed,
            translations_changed = changes.translations_changed,
            "Property changed, persisting"
        );

        match self.persist_with_retry(bundle).await {
            Ok(()) => PropertyOutcome::Updated,
            Err(e) => {
                tracing::error!(hotel_id, error = %e, "Failed to persist property");
                if let Err(mark_err) = store::mark_sync_failed(&self.db, hotel_id).await {
                    tracing::warn!(hotel_id, error = %mark_err, "Failed to mark property failed");
                }
                PropertyOutcome::Failed
            }
        }
    }

    /// Persist a bundle, retrying transient database failures with a fixed
    /// delay. Validation errors are not retried.
    async fn persist_with_retry(&self, bundle: &PropertyBundle) -> Result<(), StoreError> {
        let hotel_id = bundle.hotel_id();
        let backoff = ConstantBuilder::default()
            .with_delay(self.config.retry_delay)
            .with_max_times(self.config.retry_attempts);

        (|| async { store::upsert_bundle(&self.db, bundle).await })
            .retry(backoff)
            .when(|e: &StoreError| matches!(e, StoreError::Database(_)))
            .notify(|e, dur| {
                tracing::warn!(
                    hotel_id,
                    retry_in_ms = dur.as_millis() as u64,
                    error = %e,
                    "Persist failed, retrying"
                );
            })
            .await
    }

    /// Snapshot of the current sync status.
    pub fn status(&self) -> SyncStatus {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let scheduler = self.scheduler.read().unwrap_or_else(|e| e.into_inner());

        let (next_sync, interval) = match scheduler.as_ref() {
            Some(s) => (s.next_run(), s.interval()),
            None => (None, self.config.interval),
        };

        SyncStatus {
            is_running: state.running,
            last_sync: state.last_sync,
            next_sync,
            total_properties: state.stats.total_properties,
            updated_properties: state.stats.updated_properties,
            failed_properties: state.stats.failed_properties,
            sync_interval: format_interval(interval),
            last_error: state.stats.last_error.clone(),
        }
    }

    /// Health report for the health endpoint.
    pub fn health(&self) -> super::types::SyncHealth {
        super::types::SyncHealth::from(&self.status())
    }
}
