//! Persisted sync settings: load, apply over defaults, update.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::prelude::*;
use crate::entity::sync_setting;
use crate::sync::{parse_interval, SyncConfig};

use super::errors::{Result, StoreError};

/// Setting keys the control surface recognizes. Anything else is rejected.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "sync_interval",
    "sync_batch_size",
    "sync_max_concurrent",
    "sync_retry_attempts",
    "sync_retry_delay",
    "sync_rate_limit_per_sec",
    "sync_enable_auto",
];

/// One settings entry as submitted through the control surface.
#[derive(Debug, Clone)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// Load all persisted settings rows, ordered by key.
pub async fn load_settings(db: &DatabaseConnection) -> Result<Vec<SyncSettingModel>> {
    SyncSetting::find()
        .order_by_asc(sync_setting::Column::SettingKey)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Build the effective sync configuration: defaults overridden by any
/// parseable persisted rows. Unparseable values are logged and skipped so
/// one bad row cannot take the sync service down.
pub async fn effective_config(db: &DatabaseConnection) -> Result<SyncConfig> {
    let mut config = SyncConfig::default();

    for setting in load_settings(db).await? {
        if let Err(e) = apply_setting(&mut config, &setting.setting_key, &setting.setting_value) {
            tracing::warn!(
                key = %setting.setting_key,
                value = %setting.setting_value,
                error = %e,
                "Ignoring unusable sync setting"
            );
        }
    }

    Ok(config)
}

fn apply_setting(config: &mut SyncConfig, key: &str, value: &str) -> Result<()> {
    let invalid = |what: &str| StoreError::invalid_input(format!("{key}: invalid {what}: {value}"));

    match key {
        "sync_interval" => {
            config.interval = parse_interval(value).map_err(|_| invalid("duration"))?;
        }
        "sync_batch_size" => {
            config.batch_size = value.parse().map_err(|_| invalid("integer"))?;
        }
        "sync_max_concurrent" => {
            config.max_concurrent = value.parse().map_err(|_| invalid("integer"))?;
        }
        "sync_retry_attempts" => {
            config.retry_attempts = value.parse().map_err(|_| invalid("integer"))?;
        }
        "sync_retry_delay" => {
            config.retry_delay = parse_interval(value).map_err(|_| invalid("duration"))?;
        }
        "sync_rate_limit_per_sec" => {
            config.rate_limit_per_sec = value.parse().map_err(|_| invalid("integer"))?;
        }
        "sync_enable_auto" => {
            config.enable_auto = value.parse().map_err(|_| invalid("boolean"))?;
        }
        _ => {
            return Err(StoreError::invalid_input(format!(
                "unknown setting key: {key}"
            )));
        }
    }

    Ok(())
}

/// Update persisted settings.
///
/// Every entry is validated before anything is written: an unknown key or
/// an unparseable value rejects the whole request with no state change.
pub async fn update_settings(db: &DatabaseConnection, entries: &[SettingEntry]) -> Result<()> {
    let mut scratch = SyncConfig::default();
    for entry in entries {
        apply_setting(&mut scratch, &entry.key, &entry.value)?;
    }

    let now = Utc::now().fixed_offset();
    for entry in entries {
        let mut update = SyncSetting::update_many()
            .col_expr(
                sync_setting::Column::SettingValue,
                Expr::value(entry.value.clone()),
            )
            .col_expr(sync_setting::Column::UpdatedAt, Expr::value(now));

        if let Some(description) = &entry.description {
            update = update.col_expr(
                sync_setting::Column::Description,
                Expr::value(description.clone()),
            );
        }

        let result = update
            .filter(sync_setting::Column::SettingKey.eq(entry.key.as_str()))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                context: format!("sync setting key={}", entry.key),
            });
        }
    }

    tracing::info!(count = entries.len(), "Sync settings updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn apply_setting_parses_each_recognized_key() {
        let mut config = SyncConfig::default();

        apply_setting(&mut config, "sync_interval", "24h").expect("interval");
        apply_setting(&mut config, "sync_batch_size", "25").expect("batch size");
        apply_setting(&mut config, "sync_max_concurrent", "8").expect("max concurrent");
        apply_setting(&mut config, "sync_retry_attempts", "5").expect("retry attempts");
        apply_setting(&mut config, "sync_retry_delay", "10s").expect("retry delay");
        apply_setting(&mut config, "sync_rate_limit_per_sec", "20").expect("rate limit");
        apply_setting(&mut config, "sync_enable_auto", "false").expect("enable auto");

        assert_eq!(config.interval, Duration::from_secs(24 * 3600));
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(10));
        assert_eq!(config.rate_limit_per_sec, 20);
        assert!(!config.enable_auto);
    }

    #[test]
    fn apply_setting_rejects_unknown_key() {
        let mut config = SyncConfig::default();
        let err = apply_setting(&mut config, "sync_frobnicate", "1").expect_err("unknown key");
        assert!(matches!(err, StoreError::InvalidInput { .. }));
    }

    #[test]
    fn apply_setting_rejects_bad_values() {
        let mut config = SyncConfig::default();
        assert!(apply_setting(&mut config, "sync_batch_size", "many").is_err());
        assert!(apply_setting(&mut config, "sync_interval", "soon").is_err());
        assert!(apply_setting(&mut config, "sync_enable_auto", "yes please").is_err());
    }
}
