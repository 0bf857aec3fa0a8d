//! PropertyDetails entity - opaque structured sub-documents, 1:1 with a property.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document columns for everything the header row doesn't flatten:
/// check-in rules, facilities, policies, rooms, photos, contacts.
///
/// The sync pipeline writes these wholesale from the fetched bundle and the
/// read API returns them verbatim; nothing queries inside the documents.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub property_id: i64,
    #[sea_orm(column_type = "Json")]
    pub address: Json,
    #[sea_orm(column_type = "Json")]
    pub checkin_info: Json,
    #[sea_orm(column_type = "Json")]
    pub facilities: Json,
    #[sea_orm(column_type = "Json")]
    pub policies: Json,
    #[sea_orm(column_type = "Json")]
    pub rooms: Json,
    #[sea_orm(column_type = "Json")]
    pub photos: Json,
    #[sea_orm(column_type = "Json")]
    pub contact_info: Json,
    #[sea_orm(column_type = "Json")]
    pub metadata: Json,
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
