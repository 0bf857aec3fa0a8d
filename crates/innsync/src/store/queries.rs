//! Read-side queries consumed by the HTTP layer.

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entity::prelude::*;
use crate::entity::{property, review, translation};

use super::errors::{Result, StoreError};

/// Filter options for property listings.
///
/// Text fields match as case-insensitive substrings; numeric bounds are
/// inclusive and skipped when zero.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub city: Option<String>,
    pub country: Option<String>,
    pub min_stars: Option<i32>,
    pub max_stars: Option<i32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub hotel_type: Option<String>,
    pub chain: Option<String>,
}

impl PropertyFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();

        if let Some(city) = &self.city {
            cond = cond.add(property::Column::City.contains(city));
        }
        if let Some(country) = &self.country {
            cond = cond.add(property::Column::Country.contains(country));
        }
        if let Some(min_stars) = self.min_stars {
            cond = cond.add(property::Column::Stars.gte(min_stars));
        }
        if let Some(max_stars) = self.max_stars {
            cond = cond.add(property::Column::Stars.lte(max_stars));
        }
        if let Some(min_rating) = self.min_rating {
            cond = cond.add(property::Column::Rating.gte(min_rating));
        }
        if let Some(max_rating) = self.max_rating {
            cond = cond.add(property::Column::Rating.lte(max_rating));
        }
        if let Some(hotel_type) = &self.hotel_type {
            cond = cond.add(property::Column::HotelType.contains(hotel_type));
        }
        if let Some(chain) = &self.chain {
            cond = cond.add(property::Column::Chain.contains(chain));
        }

        cond
    }
}

fn ranked() -> sea_orm::Select<Property> {
    Property::find()
        .order_by_desc(property::Column::Rating)
        .order_by_desc(property::Column::ReviewCount)
}

/// List properties matching the filter, best-rated first.
pub async fn list_properties(
    db: &DatabaseConnection,
    filter: &PropertyFilter,
    limit: u64,
    offset: u64,
) -> Result<Vec<PropertyModel>> {
    ranked()
        .filter(filter.condition())
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Count properties matching the filter.
pub async fn count_properties(db: &DatabaseConnection, filter: &PropertyFilter) -> Result<u64> {
    Property::find()
        .filter(filter.condition())
        .count(db)
        .await
        .map_err(StoreError::from)
}

fn search_condition(query: &str) -> Condition {
    Condition::any()
        .add(property::Column::HotelName.contains(query))
        .add(property::Column::City.contains(query))
        .add(property::Column::Country.contains(query))
        .add(property::Column::Chain.contains(query))
}

/// Substring search over name, city, country and chain.
pub async fn search_properties(
    db: &DatabaseConnection,
    query: &str,
    limit: u64,
    offset: u64,
) -> Result<Vec<PropertyModel>> {
    ranked()
        .filter(search_condition(query))
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Count properties matching a search query.
pub async fn count_search(db: &DatabaseConnection, query: &str) -> Result<u64> {
    Property::find()
        .filter(search_condition(query))
        .count(db)
        .await
        .map_err(StoreError::from)
}

/// List properties in a city and/or country.
pub async fn properties_by_location(
    db: &DatabaseConnection,
    city: Option<&str>,
    country: Option<&str>,
    limit: u64,
    offset: u64,
) -> Result<Vec<PropertyModel>> {
    let filter = PropertyFilter {
        city: city.map(str::to_string),
        country: country.map(str::to_string),
        ..PropertyFilter::default()
    };
    list_properties(db, &filter, limit, offset).await
}

/// List properties at or above a minimum rating.
pub async fn properties_by_rating(
    db: &DatabaseConnection,
    min_rating: f64,
    limit: u64,
    offset: u64,
) -> Result<Vec<PropertyModel>> {
    let filter = PropertyFilter {
        min_rating: Some(min_rating),
        ..PropertyFilter::default()
    };
    list_properties(db, &filter, limit, offset).await
}

/// All reviews for a property, newest first.
pub async fn reviews_for_property(
    db: &DatabaseConnection,
    hotel_id: i64,
) -> Result<Vec<ReviewModel>> {
    Review::find()
        .filter(review::Column::PropertyId.eq(hotel_id))
        .order_by_desc(review::Column::Date)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Reviews across all properties within a score range.
pub async fn reviews_by_score(
    db: &DatabaseConnection,
    min_score: i32,
    max_score: i32,
    limit: u64,
    offset: u64,
) -> Result<Vec<ReviewModel>> {
    Review::find()
        .filter(review::Column::AverageScore.gte(min_score))
        .filter(review::Column::AverageScore.lte(max_score))
        .order_by_desc(review::Column::Date)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// All translations for a property.
pub async fn translations_for_property(
    db: &DatabaseConnection,
    hotel_id: i64,
) -> Result<Vec<TranslationModel>> {
    Translation::find()
        .filter(translation::Column::PropertyId.eq(hotel_id))
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// The translation for a property in one language.
pub async fn translation_by_language(
    db: &DatabaseConnection,
    hotel_id: i64,
    language: &str,
) -> Result<TranslationModel> {
    Translation::find()
        .filter(translation::Column::PropertyId.eq(hotel_id))
        .filter(translation::Column::Language.eq(language))
        .one(db)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            context: format!("translation hotel_id={hotel_id} language={language}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_builds_empty_condition() {
        let debug = format!("{:?}", PropertyFilter::default().condition()).to_lowercase();
        assert!(!debug.contains("city"));
    }

    #[test]
    fn filter_includes_set_fields_only() {
        let filter = PropertyFilter {
            city: Some("Paris".to_string()),
            min_stars: Some(4),
            ..PropertyFilter::default()
        };
        let debug = format!("{:?}", filter.condition()).to_lowercase();
        assert!(debug.contains("city"));
        assert!(debug.contains("stars"));
        assert!(!debug.contains("chain"));
    }
}
