//! Seed migration to insert the default sync settings.
//!
//! The migration is idempotent via ON CONFLICT DO NOTHING on the unique
//! setting_key constraint, so user-edited values survive re-runs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

struct DefaultSetting {
    key: &'static str,
    value: &'static str,
    description: &'static str,
}

const DEFAULT_SETTINGS: &[DefaultSetting] = &[
    DefaultSetting {
        key: "sync_interval",
        value: "12h",
        description: "Automatic sync interval",
    },
    DefaultSetting {
        key: "sync_batch_size",
        value: "10",
        description: "Number of properties to process in each batch",
    },
    DefaultSetting {
        key: "sync_max_concurrent",
        value: "5",
        description: "Maximum concurrent persist workers per batch",
    },
    DefaultSetting {
        key: "sync_retry_attempts",
        value: "3",
        description: "Persist retries per property before counting it failed",
    },
    DefaultSetting {
        key: "sync_retry_delay",
        value: "5s",
        description: "Delay between persist retries",
    },
    DefaultSetting {
        key: "sync_rate_limit_per_sec",
        value: "10",
        description: "Upstream request ceiling in requests per second",
    },
    DefaultSetting {
        key: "sync_enable_auto",
        value: "true",
        description: "Enable automatic scheduled synchronization",
    },
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for setting in DEFAULT_SETTINGS {
            let insert = Query::insert()
                .into_table(SyncSettings::Table)
                .columns([
                    SyncSettings::SettingKey,
                    SyncSettings::SettingValue,
                    SyncSettings::Description,
                ])
                .values_panic([
                    setting.key.into(),
                    setting.value.into(),
                    setting.description.into(),
                ])
                .on_conflict(
                    OnConflict::column(SyncSettings::SettingKey)
                        .do_nothing()
                        .to_owned(),
                )
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let keys: Vec<&str> = DEFAULT_SETTINGS.iter().map(|s| s.key).collect();
        let delete = Query::delete()
            .from_table(SyncSettings::Table)
            .and_where(Expr::col(SyncSettings::SettingKey).is_in(keys))
            .to_owned();

        manager.exec_stmt(delete).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SyncSettings {
    Table,
    SettingKey,
    SettingValue,
    Description,
}
