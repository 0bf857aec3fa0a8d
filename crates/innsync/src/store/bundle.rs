//! Bundle persistence: transactional upsert and reassembly of the
//! header + details + reviews + translations unit.

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entity::prelude::*;
use crate::entity::sync_status::SyncStatus;
use crate::entity::{property, property_details, review, translation};
use crate::upstream::{Address, PropertyBundle, PropertyHeader, Review as WireReview};

use super::errors::{Result, StoreError};

/// Load the stored bundle for a property.
///
/// The header comes from the scalar `properties` row, reviews and
/// translations from their child tables. Returns `NotFound` when no
/// property row exists.
pub async fn load_bundle(db: &DatabaseConnection, hotel_id: i64) -> Result<PropertyBundle> {
    let stored = Property::find_by_id(hotel_id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::property_not_found(hotel_id))?;

    let reviews = Review::find()
        .filter(ReviewColumn::PropertyId.eq(hotel_id))
        .order_by_desc(ReviewColumn::Date)
        .all(db)
        .await?;

    let translations = Translation::find()
        .filter(TranslationColumn::PropertyId.eq(hotel_id))
        .all(db)
        .await?;

    Ok(assemble_bundle(stored, reviews, translations))
}

fn assemble_bundle(
    header: PropertyModel,
    reviews: Vec<ReviewModel>,
    translations: Vec<TranslationModel>,
) -> PropertyBundle {
    let property = PropertyHeader {
        hotel_id: header.hotel_id,
        cupid_id: header.cupid_id,
        hotel_name: header.hotel_name,
        hotel_type: header.hotel_type,
        hotel_type_id: header.hotel_type_id,
        chain: header.chain,
        chain_id: header.chain_id,
        latitude: header.latitude,
        longitude: header.longitude,
        stars: header.stars,
        rating: header.rating,
        review_count: header.review_count,
        airport_code: header.airport_code,
        main_image_th: header.main_image_th,
        address: Address {
            city: header.city,
            state: header.state,
            country: header.country,
            postal_code: header.postal_code,
            ..Address::default()
        },
        ..PropertyHeader::default()
    };

    let reviews = reviews
        .into_iter()
        .map(|r| WireReview {
            review_id: r.review_id,
            average_score: r.average_score,
            country: r.country,
            kind: r.review_type,
            name: r.name,
            date: r.date,
            headline: r.headline,
            language: r.language,
            pros: r.pros,
            cons: r.cons,
            source: r.source,
        })
        .collect();

    let translations = translations
        .into_iter()
        .map(|t| {
            (
                t.language,
                PropertyHeader {
                    hotel_id: header.hotel_id,
                    hotel_name: t.hotel_name,
                    description: t.description,
                    markdown_description: t.markdown_description,
                    important_info: t.important_info,
                    ..PropertyHeader::default()
                },
            )
        })
        .collect();

    PropertyBundle {
        property,
        reviews,
        translations,
    }
}

/// Persist a complete bundle inside a single transaction.
///
/// Step order: header upsert, details upsert, review replace, translation
/// replace. Child sets are replaced wholesale (delete-then-insert) because
/// the upstream returns authoritative complete sets; running everything in
/// one transaction means a concurrent reader never sees the old header with
/// the new child rows or vice versa.
///
/// `data_version` is bumped on conflict. Callers invoke this only when the
/// comparator reported a change, so a bump always corresponds to a
/// user-observable write.
pub async fn upsert_bundle(db: &DatabaseConnection, bundle: &PropertyBundle) -> Result<()> {
    let hotel_id = bundle.hotel_id();
    let txn = db.begin().await?;

    upsert_header(&txn, &bundle.property)
        .await
        .map_err(|e| annotate(e, "property header"))?;
    upsert_details(&txn, &bundle.property)
        .await
        .map_err(|e| annotate(e, "property details"))?;
    replace_reviews(&txn, hotel_id, &bundle.reviews)
        .await
        .map_err(|e| annotate(e, "reviews"))?;
    replace_translations(&txn, bundle)
        .await
        .map_err(|e| annotate(e, "translations"))?;

    txn.commit().await?;

    tracing::info!(
        hotel_id,
        hotel_name = %bundle.property.hotel_name,
        review_count = bundle.reviews.len(),
        translation_count = bundle.translations.len(),
        "Property bundle stored"
    );

    Ok(())
}

/// Keep the failing upsert step visible in the propagated error.
fn annotate(e: StoreError, step: &str) -> StoreError {
    match e {
        StoreError::Database(db) => {
            StoreError::Database(sea_orm::DbErr::Custom(format!("{step}: {db}")))
        }
        other => other,
    }
}

async fn upsert_header<C: ConnectionTrait>(conn: &C, header: &PropertyHeader) -> Result<()> {
    let now = Utc::now().fixed_offset();

    let model = PropertyActiveModel {
        hotel_id: Set(header.hotel_id),
        cupid_id: Set(header.cupid_id),
        hotel_name: Set(header.hotel_name.clone()),
        hotel_type: Set(header.hotel_type.clone()),
        hotel_type_id: Set(header.hotel_type_id),
        chain: Set(header.chain.clone()),
        chain_id: Set(header.chain_id),
        latitude: Set(header.latitude),
        longitude: Set(header.longitude),
        stars: Set(header.stars),
        rating: Set(header.rating),
        review_count: Set(header.review_count),
        airport_code: Set(header.airport_code.clone()),
        city: Set(header.address.city.clone()),
        state: Set(header.address.state.clone()),
        country: Set(header.address.country.clone()),
        postal_code: Set(header.address.postal_code.clone()),
        main_image_th: Set(header.main_image_th.clone()),
        last_synced: Set(Some(now)),
        sync_status: Set(SyncStatus::Ok),
        data_version: Set(1),
        last_updated: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let on_conflict = OnConflict::column(property::Column::HotelId)
        .update_columns([
            property::Column::CupidId,
            property::Column::HotelName,
            property::Column::HotelType,
            property::Column::HotelTypeId,
            property::Column::Chain,
            property::Column::ChainId,
            property::Column::Latitude,
            property::Column::Longitude,
            property::Column::Stars,
            property::Column::Rating,
            property::Column::ReviewCount,
            property::Column::AirportCode,
            property::Column::City,
            property::Column::State,
            property::Column::Country,
            property::Column::PostalCode,
            property::Column::MainImageTh,
            property::Column::LastSynced,
            property::Column::SyncStatus,
            property::Column::LastUpdated,
            property::Column::UpdatedAt,
        ])
        .value(
            property::Column::DataVersion,
            Expr::col((property::Entity, property::Column::DataVersion)).add(1),
        )
        .to_owned();

    Property::insert(model)
        .on_conflict(on_conflict)
        .exec(conn)
        .await?;

    Ok(())
}

async fn upsert_details<C: ConnectionTrait>(conn: &C, header: &PropertyHeader) -> Result<()> {
    let now = Utc::now().fixed_offset();

    let to_json = |v: serde_json::Result<serde_json::Value>| -> Result<serde_json::Value> {
        v.map_err(|e| StoreError::invalid_input(format!("detail document encoding: {e}")))
    };

    let contact_info = serde_json::json!({
        "phone": header.phone,
        "email": header.email,
        "fax": header.fax,
    });
    let metadata = serde_json::json!({
        "parking": header.parking,
        "group_room_min": header.group_room_min,
        "child_allowed": header.child_allowed,
        "pets_allowed": header.pets_allowed,
        "description": header.description,
        "markdown_description": header.markdown_description,
        "important_info": header.important_info,
    });

    let model = PropertyDetailsActiveModel {
        property_id: Set(header.hotel_id),
        address: Set(to_json(serde_json::to_value(&header.address))?),
        checkin_info: Set(to_json(serde_json::to_value(&header.checkin))?),
        facilities: Set(to_json(serde_json::to_value(&header.facilities))?),
        policies: Set(to_json(serde_json::to_value(&header.policies))?),
        rooms: Set(to_json(serde_json::to_value(&header.rooms))?),
        photos: Set(to_json(serde_json::to_value(&header.photos))?),
        contact_info: Set(contact_info),
        metadata: Set(metadata),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let on_conflict = OnConflict::column(property_details::Column::PropertyId)
        .update_columns([
            property_details::Column::Address,
            property_details::Column::CheckinInfo,
            property_details::Column::Facilities,
            property_details::Column::Policies,
            property_details::Column::Rooms,
            property_details::Column::Photos,
            property_details::Column::ContactInfo,
            property_details::Column::Metadata,
            property_details::Column::UpdatedAt,
        ])
        .to_owned();

    PropertyDetails::insert(model)
        .on_conflict(on_conflict)
        .exec(conn)
        .await?;

    Ok(())
}

async fn replace_reviews<C: ConnectionTrait>(
    conn: &C,
    hotel_id: i64,
    reviews: &[WireReview],
) -> Result<()> {
    Review::delete_many()
        .filter(review::Column::PropertyId.eq(hotel_id))
        .exec(conn)
        .await?;

    if reviews.is_empty() {
        return Ok(());
    }

    let now = Utc::now().fixed_offset();
    let models = reviews.iter().map(|r| ReviewActiveModel {
        property_id: Set(hotel_id),
        review_id: Set(r.review_id),
        average_score: Set(r.average_score),
        country: Set(r.country.clone()),
        review_type: Set(r.kind.clone()),
        name: Set(r.name.clone()),
        date: Set(r.date.clone()),
        headline: Set(r.headline.clone()),
        language: Set(r.language.clone()),
        pros: Set(r.pros.clone()),
        cons: Set(r.cons.clone()),
        source: Set(r.source.clone()),
        created_at: Set(now),
        ..Default::default()
    });

    Review::insert_many(models).exec(conn).await?;
    Ok(())
}

async fn replace_translations<C: ConnectionTrait>(
    conn: &C,
    bundle: &PropertyBundle,
) -> Result<()> {
    let hotel_id = bundle.hotel_id();

    Translation::delete_many()
        .filter(translation::Column::PropertyId.eq(hotel_id))
        .exec(conn)
        .await?;

    if bundle.translations.is_empty() {
        return Ok(());
    }

    let now = Utc::now().fixed_offset();
    let models = bundle.translations.iter().map(|(lang, header)| {
        TranslationActiveModel {
            property_id: Set(hotel_id),
            language: Set(lang.clone()),
            hotel_name: Set(header.hotel_name.clone()),
            description: Set(header.description.clone()),
            markdown_description: Set(header.markdown_description.clone()),
            important_info: Set(header.important_info.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    });

    Translation::insert_many(models).exec(conn).await?;
    Ok(())
}

/// Advance `last_synced` for a property whose content did not change.
///
/// Leaves `updated_at` and `data_version` alone so a no-op sync is
/// observable only through the sync bookkeeping columns.
pub async fn touch_last_synced(db: &DatabaseConnection, hotel_id: i64) -> Result<()> {
    let now = Utc::now().fixed_offset();

    let result = Property::update_many()
        .col_expr(property::Column::LastSynced, Expr::value(Some(now)))
        .col_expr(
            property::Column::SyncStatus,
            Expr::value(SyncStatus::Ok),
        )
        .filter(property::Column::HotelId.eq(hotel_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(StoreError::property_not_found(hotel_id));
    }

    tracing::debug!(hotel_id, "Advanced last_synced");
    Ok(())
}

/// Mark a property's last sync attempt as failed.
///
/// A property that has never been stored has no row to mark; that case is
/// not an error.
pub async fn mark_sync_failed(db: &DatabaseConnection, hotel_id: i64) -> Result<()> {
    Property::update_many()
        .col_expr(
            property::Column::SyncStatus,
            Expr::value(SyncStatus::Failed),
        )
        .filter(property::Column::HotelId.eq(hotel_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Load just the header row for a property.
pub async fn find_property(db: &DatabaseConnection, hotel_id: i64) -> Result<Option<PropertyModel>> {
    Property::find_by_id(hotel_id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Administrative delete of a property and (via cascade) its children.
///
/// Not part of the sync pipeline; returns the number of rows deleted.
pub async fn delete_property(db: &DatabaseConnection, hotel_id: i64) -> Result<u64> {
    let result = Property::delete_by_id(hotel_id).exec(db).await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_model(hotel_id: i64) -> PropertyModel {
        let now = Utc::now().fixed_offset();
        PropertyModel {
            hotel_id,
            cupid_id: 7,
            hotel_name: "Grand Plaza".to_string(),
            hotel_type: "Hotel".to_string(),
            hotel_type_id: 1,
            chain: "Plaza Group".to_string(),
            chain_id: 3,
            latitude: 48.8566,
            longitude: 2.3522,
            stars: 5,
            rating: 9.5,
            review_count: 2,
            airport_code: "CDG".to_string(),
            city: "Paris".to_string(),
            state: "".to_string(),
            country: "fr".to_string(),
            postal_code: "75001".to_string(),
            main_image_th: "https://img.example.com/1.jpg".to_string(),
            last_synced: Some(now),
            sync_status: SyncStatus::Ok,
            data_version: 3,
            last_updated: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn review_model(property_id: i64, review_id: i64) -> ReviewModel {
        ReviewModel {
            id: review_id as i32,
            property_id,
            review_id,
            average_score: 8,
            country: "fr".to_string(),
            review_type: "couple".to_string(),
            name: "A guest".to_string(),
            date: "2025-05-01".to_string(),
            headline: "Nice stay".to_string(),
            language: "en".to_string(),
            pros: "clean".to_string(),
            cons: "".to_string(),
            source: "direct".to_string(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn translation_model(property_id: i64, language: &str, name: &str) -> TranslationModel {
        let now = Utc::now().fixed_offset();
        TranslationModel {
            id: 1,
            property_id,
            language: language.to_string(),
            hotel_name: name.to_string(),
            description: "desc".to_string(),
            markdown_description: "md".to_string(),
            important_info: "info".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn assemble_bundle_rebuilds_wire_types() {
        let bundle = assemble_bundle(
            header_model(42),
            vec![review_model(42, 1), review_model(42, 2)],
            vec![translation_model(42, "fr", "Grand Plaza FR")],
        );

        assert_eq!(bundle.hotel_id(), 42);
        assert_eq!(bundle.property.hotel_name, "Grand Plaza");
        assert_eq!(bundle.property.address.city, "Paris");
        assert_eq!(bundle.reviews.len(), 2);
        assert_eq!(bundle.reviews[0].kind, "couple");
        assert_eq!(bundle.translations["fr"].hotel_name, "Grand Plaza FR");
        assert_eq!(bundle.translations["fr"].hotel_id, 42);
    }

    #[test]
    fn assemble_bundle_with_no_children_yields_empty_sets() {
        let bundle = assemble_bundle(header_model(7), Vec::new(), Vec::new());
        assert!(bundle.reviews.is_empty());
        assert!(bundle.translations.is_empty());
    }
}
