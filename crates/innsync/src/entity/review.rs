//! Review entity - guest reviews, replaced wholesale on every sync.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One guest review. `(property_id, review_id)` is unique; the set for a
/// property is deleted and reinserted inside the bundle-upsert transaction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub property_id: i64,
    /// Upstream review identifier, unique within its property.
    pub review_id: i64,
    /// Overall score on the upstream's 1..=10 scale.
    pub average_score: i32,
    pub country: String,
    pub review_type: String,
    pub name: String,
    /// ISO date the review was left.
    pub date: String,
    pub headline: String,
    pub language: String,
    #[sea_orm(column_type = "Text")]
    pub pros: String,
    #[sea_orm(column_type = "Text")]
    pub cons: String,
    pub source: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::HotelId",
        on_delete = "Cascade"
    )]
    Property,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
