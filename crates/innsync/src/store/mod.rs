//! Persistence layer: transactional bundle writes, read-side queries, and
//! sync bookkeeping.
//!
//! The sync pipeline depends only on the operations exposed here, so tests
//! can run the whole pipeline against an in-memory SQLite database.

mod bundle;
mod errors;
mod queries;
mod settings;
mod sync_log;

pub use bundle::{
    delete_property, find_property, load_bundle, mark_sync_failed, touch_last_synced,
    upsert_bundle,
};
pub use errors::{Result, StoreError};
pub use queries::{
    count_properties, count_search, list_properties, properties_by_location, properties_by_rating,
    reviews_by_score, reviews_for_property, search_properties, translation_by_language,
    translations_for_property, PropertyFilter,
};
pub use settings::{
    effective_config, load_settings, update_settings, SettingEntry, RECOGNIZED_KEYS,
};
pub use sync_log::{
    complete_sync_log, create_sync_log, fail_sync_log, latest_sync_log, list_sync_logs,
    sweep_stale_runs, RunTotals,
};
