//! SyncSetting entity - persisted sync configuration overrides.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One key/value configuration override, seeded with defaults by the
/// schema migration and editable through the control surface.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub setting_key: String,
    pub setting_value: String,
    pub description: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
