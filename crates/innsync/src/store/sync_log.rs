//! Sync run bookkeeping: one `sync_logs` row per run.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::prelude::*;
use crate::entity::sync_log;

use super::errors::{Result, StoreError};

/// Totals written back to a run's log row when it finishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    pub total_properties: i32,
    pub updated_properties: i32,
    pub failed_properties: i32,
}

/// Open a log row for a new run with status `running`.
pub async fn create_sync_log(
    db: &DatabaseConnection,
    sync_id: &str,
    sync_type: &str,
    started_at: DateTime<FixedOffset>,
) -> Result<()> {
    let model = SyncLogActiveModel {
        sync_id: Set(sync_id.to_string()),
        sync_type: Set(sync_type.to_string()),
        status: Set(RunStatus::Running),
        started_at: Set(started_at),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };

    model.insert(db).await?;
    Ok(())
}

/// Close a run's log row with status `completed` and its totals.
pub async fn complete_sync_log(
    db: &DatabaseConnection,
    sync_id: &str,
    totals: RunTotals,
) -> Result<()> {
    finish_sync_log(db, sync_id, RunStatus::Completed, None, totals).await
}

/// Close a run's log row with status `failed`, an error message, and any
/// partial totals accumulated before the failure.
pub async fn fail_sync_log(
    db: &DatabaseConnection,
    sync_id: &str,
    error: &str,
    totals: RunTotals,
) -> Result<()> {
    finish_sync_log(db, sync_id, RunStatus::Failed, Some(error), totals).await
}

async fn finish_sync_log(
    db: &DatabaseConnection,
    sync_id: &str,
    status: RunStatus,
    error: Option<&str>,
    totals: RunTotals,
) -> Result<()> {
    let result = SyncLog::update_many()
        .col_expr(sync_log::Column::Status, Expr::value(status))
        .col_expr(
            sync_log::Column::CompletedAt,
            Expr::value(Some(Utc::now().fixed_offset())),
        )
        .col_expr(
            sync_log::Column::TotalProperties,
            Expr::value(totals.total_properties),
        )
        .col_expr(
            sync_log::Column::UpdatedProperties,
            Expr::value(totals.updated_properties),
        )
        .col_expr(
            sync_log::Column::FailedProperties,
            Expr::value(totals.failed_properties),
        )
        .col_expr(
            sync_log::Column::ErrorMessage,
            Expr::value(error.map(str::to_string)),
        )
        .filter(sync_log::Column::SyncId.eq(sync_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(StoreError::NotFound {
            context: format!("sync log sync_id={sync_id}"),
        });
    }

    Ok(())
}

/// List run logs, newest first.
pub async fn list_sync_logs(
    db: &DatabaseConnection,
    limit: u64,
    offset: u64,
) -> Result<Vec<SyncLogModel>> {
    SyncLog::find()
        .order_by_desc(sync_log::Column::StartedAt)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Find the most recent run log, if any.
pub async fn latest_sync_log(db: &DatabaseConnection) -> Result<Option<SyncLogModel>> {
    SyncLog::find()
        .order_by_desc(sync_log::Column::StartedAt)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Mark leftover `running` rows as failed.
///
/// A row still `running` at boot belongs to a process that died mid-run.
/// Returns the number of rows swept.
pub async fn sweep_stale_runs(db: &DatabaseConnection) -> Result<u64> {
    let result = SyncLog::update_many()
        .col_expr(sync_log::Column::Status, Expr::value(RunStatus::Failed))
        .col_expr(
            sync_log::Column::CompletedAt,
            Expr::value(Some(Utc::now().fixed_offset())),
        )
        .col_expr(
            sync_log::Column::ErrorMessage,
            Expr::value(Some("run interrupted by process exit".to_string())),
        )
        .filter(sync_log::Column::Status.eq(RunStatus::Running))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::warn!(
            swept = result.rows_affected,
            "Marked interrupted sync runs as failed"
        );
    }

    Ok(result.rows_affected)
}
