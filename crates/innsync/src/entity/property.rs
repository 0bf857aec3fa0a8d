//! Property entity - the header row for each mirrored hotel.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::sync_status::SyncStatus;

/// One row per mirrored hotel, keyed by the upstream's stable 64-bit id.
///
/// Scalar header fields live here so the read API can filter and sort
/// without touching the detail document. Everything non-scalar hangs off
/// the 1:1 `property_details` row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    /// Upstream hotel identifier, also the primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub hotel_id: i64,
    pub cupid_id: i64,

    // ─── Header ──────────────────────────────────────────────────────────────
    pub hotel_name: String,
    pub hotel_type: String,
    pub hotel_type_id: i32,
    pub chain: String,
    pub chain_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    /// Star class, 1 through 5.
    pub stars: i32,
    /// Guest rating on the upstream's 0.0..=10.0 scale.
    pub rating: f64,
    pub review_count: i32,
    pub airport_code: String,

    // ─── Address ─────────────────────────────────────────────────────────────
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,

    #[sea_orm(column_type = "Text")]
    pub main_image_th: String,

    // ─── Sync bookkeeping ────────────────────────────────────────────────────
    /// When the sync pipeline last looked at this property. Advances on
    /// every run, changed or not.
    pub last_synced: Option<DateTimeWithTimeZone>,
    pub sync_status: SyncStatus,
    /// Monotonic counter, bumped only when a content change was written.
    pub data_version: i64,
    pub last_updated: Option<DateTimeWithTimeZone>,

    // ─── Timestamps ──────────────────────────────────────────────────────────
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::property_details::Entity")]
    PropertyDetails,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
    #[sea_orm(has_many = "super::translation::Entity")]
    Translation,
}

impl Related<super::property_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertyDetails.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::translation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Translation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
