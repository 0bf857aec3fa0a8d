//! Innsync - a local, queryable mirror of hotel property content.
//!
//! The library periodically fans out per-property fetches against an
//! external content API (property record, reviews, translations),
//! reconciles the results against a relational store, persists only changed
//! records, and exposes the reconciled data plus a control/status surface
//! for a read-oriented HTTP layer.
//!
//! # Features
//!
//! - `migrate` (default) - Enables embedded schema migrations. When
//!   enabled, [`connect_and_migrate`] runs migrations on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use innsync::{connect_and_migrate, AppConfig, SyncService, UpstreamClient};
//!
//! let config = AppConfig::load()?;
//! let db = connect_and_migrate(&config.database_url()).await?;
//! innsync::store::sweep_stale_runs(&db).await?;
//!
//! let client = UpstreamClient::new(config.upstream_config())?;
//! let service = Arc::new(SyncService::new(client, db, config.sync_config()?));
//!
//! let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
//! service.start(cancel_rx, None)?;
//! ```

pub mod config;
pub mod db;
pub mod entity;
pub mod http;
pub mod store;
pub mod sync;
pub mod upstream;

#[cfg(feature = "migrate")]
pub mod migration;

pub use config::AppConfig;
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use sync::{
    SyncConfig, SyncError, SyncHealth, SyncResult, SyncService, SyncStats, SyncStatus,
};
pub use upstream::{
    PropertyBundle, PropertyHeader, Review as UpstreamReview, UpstreamClient, UpstreamConfig,
    UpstreamError, PROPERTY_IDS,
};
