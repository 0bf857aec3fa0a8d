//! Translation entity - localized header text, one row per language.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Localized text fields for a property. `(property_id, language)` is
/// unique; the set is replaced wholesale on every sync.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "translations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub property_id: i64,
    /// ISO language code, 2-10 characters.
    pub language: String,
    pub hotel_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub markdown_description: String,
    #[sea_orm(column_type = "Text")]
    pub important_info: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
