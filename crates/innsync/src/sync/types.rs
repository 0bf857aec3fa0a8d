//! Shared types, configuration and error taxonomy for the sync pipeline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::entity::run_status::RunStatus;
use crate::store::StoreError;

/// Default upstream fan-out parallelism.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 5;

/// Leading delay each fetch worker sleeps to pace upstream bursts.
pub const DEFAULT_FETCH_PACING: Duration = Duration::from_millis(100);

/// How many individual fetch errors are logged before summarizing.
pub const DEFAULT_MAX_ERRORS_LOGGED: usize = 5;

/// Synchronization configuration.
///
/// Defaults match the seeded `sync_settings` rows; persisted overrides are
/// applied on top by `store::effective_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Scheduler period.
    pub interval: Duration,
    /// Properties per batch handed to the persist workers.
    pub batch_size: usize,
    /// Persist-side parallelism within a batch.
    pub max_concurrent: usize,
    /// Per-property persist retries.
    pub retry_attempts: usize,
    /// Delay between persist retries.
    pub retry_delay: Duration,
    /// Upstream request ceiling in requests per second.
    pub rate_limit_per_sec: u32,
    /// When false, `start` is a no-op success.
    pub enable_auto: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(12 * 3600),
            batch_size: 10,
            max_concurrent: 5,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(5),
            rate_limit_per_sec: 10,
            enable_auto: true,
        }
    }
}

impl SyncConfig {
    /// Leading delay each persist worker sleeps, derived from the rate limit.
    pub fn persist_pacing(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.rate_limit_per_sec.max(1)))
    }
}

/// Errors raised by the sync orchestration layer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync service is already running")]
    AlreadyRunning,

    #[error("sync service is not running")]
    NotRunning,

    #[error("invalid configuration: {message}")]
    ConfigInvalid { message: String },

    #[error("sync run cancelled")]
    Cancelled,

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }
}

/// Parse a duration literal like `12h`, `30m`, `90s`, `500ms` or `1h30m`.
///
/// Rejects empty input, unknown units, and zero totals.
pub fn parse_interval(input: &str) -> Result<Duration, SyncError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SyncError::config_invalid("empty duration"));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| SyncError::config_invalid(format!("missing unit in '{input}'")))?;
        if digits_end == 0 {
            return Err(SyncError::config_invalid(format!(
                "expected a number in '{input}'"
            )));
        }

        let value: u64 = rest[..digits_end]
            .parse()
            .map_err(|_| SyncError::config_invalid(format!("bad number in '{input}'")))?;
        rest = &rest[digits_end..];

        let (unit, remaining) = match rest {
            r if r.starts_with("ms") => ("ms", &r[2..]),
            r if r.starts_with('h') => ("h", &r[1..]),
            r if r.starts_with('m') => ("m", &r[1..]),
            r if r.starts_with('s') => ("s", &r[1..]),
            _ => {
                return Err(SyncError::config_invalid(format!(
                    "unknown unit in '{input}'; use h, m, s or ms"
                )));
            }
        };
        rest = remaining;

        total += match unit {
            "h" => Duration::from_secs(value * 3600),
            "m" => Duration::from_secs(value * 60),
            "s" => Duration::from_secs(value),
            _ => Duration::from_millis(value),
        };
    }

    if total.is_zero() {
        return Err(SyncError::config_invalid("zero duration"));
    }

    Ok(total)
}

/// Render a duration the way `parse_interval` reads it (e.g. `12h`, `5s`).
pub fn format_interval(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    if secs % 3600 == 0 {
        return format!("{}h", secs / 3600);
    }
    if secs % 60 == 0 {
        return format!("{}m", secs / 60);
    }
    format!("{secs}s")
}

/// Result of one sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub sync_id: String,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    pub total_properties: usize,
    pub updated_properties: usize,
    pub failed_properties: usize,
    pub error: Option<String>,
}

impl SyncResult {
    pub fn is_successful(&self) -> bool {
        self.status == RunStatus::Completed && self.error.is_none()
    }

    /// Share of fetched properties that resulted in a write, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_properties == 0 {
            return 0.0;
        }
        self.updated_properties as f64 / self.total_properties as f64 * 100.0
    }

    pub fn failure_rate(&self) -> f64 {
        if self.total_properties == 0 {
            return 0.0;
        }
        self.failed_properties as f64 / self.total_properties as f64 * 100.0
    }
}

/// Rolling statistics from the most recent run.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub total_properties: usize,
    pub updated_properties: usize,
    pub failed_properties: usize,
    pub last_error: Option<String>,
}

/// Snapshot of the sync service for the status surface.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub is_running: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub next_sync: Option<DateTime<Utc>>,
    pub total_properties: usize,
    pub updated_properties: usize,
    pub failed_properties: usize,
    /// Scheduler period as a duration literal (e.g. `12h`).
    pub sync_interval: String,
    pub last_error: Option<String>,
}

impl SyncStatus {
    /// Time since the last completed run, zero when none has completed.
    pub fn sync_age(&self) -> chrono::Duration {
        match self.last_sync {
            Some(last) => Utc::now().signed_duration_since(last),
            None => chrono::Duration::zero(),
        }
    }

    /// Time until the next scheduled run, zero when the scheduler is idle.
    pub fn next_sync_in(&self) -> chrono::Duration {
        match self.next_sync {
            Some(next) => next.signed_duration_since(Utc::now()),
            None => chrono::Duration::zero(),
        }
    }

    /// Overdue means: not running, and more than two intervals have passed
    /// since the last completed run.
    pub fn is_overdue(&self) -> bool {
        if self.is_running || self.last_sync.is_none() {
            return false;
        }
        match parse_interval(&self.sync_interval) {
            Ok(interval) => {
                let threshold =
                    chrono::Duration::from_std(interval * 2).unwrap_or(chrono::Duration::MAX);
                self.sync_age() > threshold
            }
            Err(_) => false,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.is_running || !self.is_overdue()
    }

    pub fn summary(&self) -> &'static str {
        if self.is_running {
            return "Sync service is running";
        }
        if self.is_overdue() {
            return "Sync service is overdue";
        }
        if self.last_sync.is_none() {
            return "Sync service has never run";
        }
        "Sync service is healthy"
    }
}

/// Health report derived from a status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SyncHealth {
    pub status: &'static str,
    pub is_running: bool,
    pub is_healthy: bool,
    pub is_overdue: bool,
    /// Seconds since the last completed run.
    pub last_sync_age_secs: i64,
    /// Seconds until the next scheduled run.
    pub next_sync_in_secs: i64,
    pub summary: &'static str,
}

impl From<&SyncStatus> for SyncHealth {
    fn from(status: &SyncStatus) -> Self {
        let healthy = status.is_healthy();
        Self {
            status: if healthy { "healthy" } else { "unhealthy" },
            is_running: status.is_running,
            is_healthy: healthy,
            is_overdue: status.is_overdue(),
            last_sync_age_secs: status.sync_age().num_seconds(),
            next_sync_in_secs: status.next_sync_in().num_seconds(),
            summary: status.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_handles_plain_units() {
        assert_eq!(parse_interval("12h").unwrap(), Duration::from_secs(12 * 3600));
        assert_eq!(parse_interval("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_interval("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn parse_interval_handles_compound_literals() {
        assert_eq!(
            parse_interval("1h30m").unwrap(),
            Duration::from_secs(3600 + 1800)
        );
    }

    #[test]
    fn parse_interval_rejects_garbage() {
        for bad in ["", "h", "12", "12x", "12.5h", "-3h", "0s"] {
            assert!(parse_interval(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn format_interval_round_trips_common_values() {
        for literal in ["12h", "24h", "30m", "90s", "5s"] {
            let parsed = parse_interval(literal).unwrap();
            assert_eq!(format_interval(parsed), literal);
        }
    }

    #[test]
    fn persist_pacing_derives_from_rate_limit() {
        let config = SyncConfig::default();
        assert_eq!(config.persist_pacing(), Duration::from_millis(100));

        let slow = SyncConfig {
            rate_limit_per_sec: 2,
            ..SyncConfig::default()
        };
        assert_eq!(slow.persist_pacing(), Duration::from_millis(500));
    }

    #[test]
    fn sync_result_rates() {
        let result = SyncResult {
            sync_id: "sync_20250601_120000".to_string(),
            status: RunStatus::Completed,
            start_time: Utc::now(),
            end_time: Utc::now(),
            duration_ms: 1200,
            total_properties: 10,
            updated_properties: 4,
            failed_properties: 1,
            error: None,
        };
        assert!(result.is_successful());
        assert_eq!(result.success_rate(), 40.0);
        assert_eq!(result.failure_rate(), 10.0);
    }

    #[test]
    fn status_overdue_requires_stopped_and_stale() {
        let fresh = SyncStatus {
            is_running: false,
            last_sync: Some(Utc::now() - chrono::Duration::hours(1)),
            next_sync: None,
            total_properties: 0,
            updated_properties: 0,
            failed_properties: 0,
            sync_interval: "12h".to_string(),
            last_error: None,
        };
        assert!(!fresh.is_overdue());
        assert!(fresh.is_healthy());

        let stale = SyncStatus {
            last_sync: Some(Utc::now() - chrono::Duration::hours(30)),
            ..fresh.clone()
        };
        assert!(stale.is_overdue());
        assert!(!stale.is_healthy());
        assert_eq!(stale.summary(), "Sync service is overdue");

        let running = SyncStatus {
            is_running: true,
            ..stale
        };
        assert!(!running.is_overdue());
        assert!(running.is_healthy());
    }

    #[test]
    fn health_report_mirrors_status() {
        let status = SyncStatus {
            is_running: true,
            last_sync: None,
            next_sync: None,
            total_properties: 5,
            updated_properties: 2,
            failed_properties: 0,
            sync_interval: "12h".to_string(),
            last_error: None,
        };
        let health = SyncHealth::from(&status);
        assert_eq!(health.status, "healthy");
        assert!(health.is_running);
        assert!(!health.is_overdue);
        assert_eq!(health.summary, "Sync service is running");
    }
}
