//! Concurrent fan-out over the property id list.
//!
//! One task per property, gated by a counting semaphore so at most
//! `concurrency` upstream fetches are in flight, each preceded by a short
//! pacing sleep. Individual failures are collected, never fatal.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Semaphore};

use crate::http::HttpTransport;
use crate::upstream::{PropertyBundle, UpstreamClient, UpstreamError};

use super::types::{DEFAULT_FETCH_CONCURRENCY, DEFAULT_FETCH_PACING, DEFAULT_MAX_ERRORS_LOGGED};

/// Tuning knobs for the fan-out.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum concurrent upstream fetches.
    pub concurrency: usize,
    /// Leading sleep per worker, pacing request bursts.
    pub pacing: Duration,
    /// How many individual errors to log before summarizing.
    pub max_errors_logged: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            pacing: DEFAULT_FETCH_PACING,
            max_errors_logged: DEFAULT_MAX_ERRORS_LOGGED,
        }
    }
}

/// Aggregated outcome of one fan-out pass.
///
/// `bundles` carries every successfully fetched property in no particular
/// order; `errors` the per-property failures.
#[derive(Debug, Default)]
pub struct FetchResult {
    pub bundles: Vec<PropertyBundle>,
    pub errors: Vec<(i64, UpstreamError)>,
    pub duration: Duration,
    /// True when the stop signal fired before every worker ran.
    pub cancelled: bool,
}

impl FetchResult {
    pub fn success_count(&self) -> usize {
        self.bundles.len()
    }

    pub fn failure_count(&self) -> usize {
        self.errors.len()
    }

    pub fn properties_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.bundles.len() as f64 / secs
    }
}

enum WorkerOutcome {
    Bundle(Box<PropertyBundle>),
    Error(i64, UpstreamError),
    Cancelled,
}

/// Fetch the bundle for every id, with bounded parallelism.
///
/// Workers that have not started when `cancel` flips abandon their fetch;
/// in-flight requests are left to drain so no connection is torn down
/// mid-response.
pub async fn fetch_all<T>(
    client: &UpstreamClient<T>,
    ids: &[i64],
    options: &FetchOptions,
    cancel: watch::Receiver<bool>,
) -> FetchResult
where
    T: HttpTransport + Clone + 'static,
{
    tracing::info!(total_properties = ids.len(), "Property data fetching started");
    let start = Instant::now();

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let pacing = options.pacing;

    let handles: Vec<_> = ids
        .iter()
        .map(|&property_id| {
            let client = client.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return WorkerOutcome::Cancelled;
                };

                if *cancel.borrow() {
                    return WorkerOutcome::Cancelled;
                }

                tokio::time::sleep(pacing).await;

                match client.fetch_property_bundle(property_id).await {
                    Ok(bundle) => WorkerOutcome::Bundle(Box::new(bundle)),
                    Err(e) => {
                        tracing::error!(property_id, error = %e, "Property fetch failed");
                        WorkerOutcome::Error(property_id, e)
                    }
                }
            })
        })
        .collect();

    let mut result = FetchResult::default();
    for handle in handles {
        match handle.await {
            Ok(WorkerOutcome::Bundle(bundle)) => result.bundles.push(*bundle),
            Ok(WorkerOutcome::Error(id, e)) => result.errors.push((id, e)),
            Ok(WorkerOutcome::Cancelled) => result.cancelled = true,
            Err(join_error) => {
                tracing::error!(error = %join_error, "Fetch worker panicked");
                result
                    .errors
                    .push((0, UpstreamError::Transport(join_error.to_string())));
            }
        }
    }

    result.duration = start.elapsed();
    log_fetch_result(&result, options.max_errors_logged);
    result
}

fn log_fetch_result(result: &FetchResult, max_errors_logged: usize) {
    tracing::info!(
        successful = result.success_count(),
        failed = result.failure_count(),
        duration_ms = result.duration.as_millis() as u64,
        properties_per_second = result.properties_per_second(),
        "Property data fetching completed"
    );

    if result.errors.is_empty() {
        return;
    }

    tracing::warn!(
        error_count = result.errors.len(),
        "Some properties failed to fetch"
    );
    for (property_id, error) in result.errors.iter().take(max_errors_logged) {
        tracing::error!(property_id, error = %error, "Fetch error");
    }
    if result.errors.len() > max_errors_logged {
        tracing::warn!(
            additional_errors = result.errors.len() - max_errors_logged,
            "Further fetch errors suppressed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::http::{HttpError, HttpHeaders, HttpResponse};
    use crate::upstream::UpstreamConfig;

    /// Transport that serves a minimal header for every property URL and
    /// records the peak number of concurrently running requests.
    #[derive(Clone, Default)]
    struct CountingTransport {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        fail_ids: Arc<Vec<i64>>,
    }

    impl CountingTransport {
        fn failing(ids: Vec<i64>) -> Self {
            Self {
                fail_ids: Arc::new(ids),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn get(&self, url: &str, _headers: &HttpHeaders) -> Result<HttpResponse, HttpError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Hold the slot across an await point so requests overlap.
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let id: i64 = url
                .rsplit('/')
                .next()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);

            if self.fail_ids.contains(&id) {
                return Ok(HttpResponse {
                    status: 500,
                    body: Vec::new(),
                });
            }

            let body = serde_json::json!({
                "hotel_id": id,
                "hotel_name": format!("Hotel {id}"),
                "review_count": 0,
            });
            Ok(HttpResponse {
                status: 200,
                body: serde_json::to_vec(&body).expect("body"),
            })
        }
    }

    fn client(transport: CountingTransport) -> UpstreamClient<CountingTransport> {
        UpstreamClient::with_transport(
            UpstreamConfig {
                base_url: "https://upstream.test".to_string(),
                version: "v3".to_string(),
                api_key: String::new(),
            },
            transport,
        )
    }

    fn options(concurrency: usize) -> FetchOptions {
        FetchOptions {
            concurrency,
            pacing: Duration::from_millis(1),
            max_errors_logged: 5,
        }
    }

    fn no_cancel() -> watch::Receiver<bool> {
        // Workers only sample the current value, so a dropped sender is fine.
        let (_tx, rx) = watch::channel(false);
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_all_collects_every_property() {
        let transport = CountingTransport::default();
        let client = client(transport);
        let ids: Vec<i64> = (1..=8).collect();

        let result = fetch_all(&client, &ids, &options(3), no_cancel()).await;

        assert_eq!(result.success_count(), 8);
        assert_eq!(result.failure_count(), 0);
        assert!(!result.cancelled);

        let mut got: Vec<i64> = result.bundles.iter().map(|b| b.hotel_id()).collect();
        got.sort_unstable();
        assert_eq!(got, ids);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_all_respects_the_concurrency_ceiling() {
        let transport = CountingTransport::default();
        let peak = Arc::clone(&transport.peak);
        let client = client(transport);
        let ids: Vec<i64> = (1..=20).collect();

        let result = fetch_all(&client, &ids, &options(4), no_cancel()).await;

        assert_eq!(result.success_count(), 20);
        // The translation fetches inside a worker are sequential, so the
        // number of overlapping transport calls is bounded by the workers.
        assert!(
            peak.load(Ordering::SeqCst) <= 4,
            "peak concurrency {} exceeded the semaphore bound",
            peak.load(Ordering::SeqCst)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_all_tolerates_individual_failures() {
        let transport = CountingTransport::failing(vec![3, 5]);
        let client = client(transport);
        let ids: Vec<i64> = (1..=6).collect();

        let result = fetch_all(&client, &ids, &options(2), no_cancel()).await;

        assert_eq!(result.success_count(), 4);
        assert_eq!(result.failure_count(), 2);

        let mut failed: Vec<i64> = result.errors.iter().map(|(id, _)| *id).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec![3, 5]);
        assert!(result.errors.iter().all(|(_, e)| e.is_server_error()));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_all_stops_starting_work_when_cancelled() {
        let transport = CountingTransport::default();
        let client = client(transport);
        let ids: Vec<i64> = (1..=50).collect();

        let (tx, rx) = watch::channel(true);
        let result = fetch_all(&client, &ids, &options(2), rx).await;
        drop(tx);

        assert!(result.cancelled);
        assert_eq!(result.success_count(), 0);
    }
}
