//! Synchronization pipeline: fetch fan-out, change detection, transactional
//! persistence, scheduling and the control/status surface.
//!
//! The flow of one run:
//!
//! ```text
//! Scheduler tick (or manual trigger)
//!   └─ SyncService::sync_now
//!        ├─ fetch_all        bounded fan-out over the property ids
//!        ├─ per batch        up to max_concurrent workers
//!        │    ├─ load_bundle     stored state (absent ⇒ create)
//!        │    ├─ compare_bundles diff on persisted fields
//!        │    └─ upsert_bundle   transactional write, retried
//!        └─ sync_logs        run bookkeeping + status update
//! ```

mod compare;
mod engine;
mod fetch;
mod scheduler;
mod types;

pub use compare::{compare_bundles, property_equal, ChangeSet};
pub use engine::SyncService;
pub use fetch::{fetch_all, FetchOptions, FetchResult};
pub use scheduler::Scheduler;
pub use types::{
    format_interval, parse_interval, SyncConfig, SyncError, SyncHealth, SyncResult, SyncStats,
    SyncStatus, DEFAULT_FETCH_CONCURRENCY, DEFAULT_FETCH_PACING, DEFAULT_MAX_ERRORS_LOGGED,
};
