//! SyncLog entity - one row per sync run.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::run_status::RunStatus;

/// Bookkeeping record for a single sync run.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Human-readable run identifier derived from the start timestamp.
    #[sea_orm(unique)]
    pub sync_id: String,
    /// How the run was triggered: `scheduled` or `manual`.
    pub sync_type: String,
    pub status: RunStatus,
    pub started_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub total_properties: i32,
    pub updated_properties: i32,
    pub failed_properties: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Wall-clock duration of the run, using now() while still in flight.
    pub fn duration(&self) -> chrono::Duration {
        match self.completed_at {
            Some(completed) => completed.signed_duration_since(self.started_at),
            None => chrono::Utc::now()
                .fixed_offset()
                .signed_duration_since(self.started_at),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == RunStatus::Completed && self.error_message.is_none()
    }

    /// Share of fetched properties that resulted in a write, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_properties == 0 {
            return 0.0;
        }
        f64::from(self.updated_properties) / f64::from(self.total_properties) * 100.0
    }
}
