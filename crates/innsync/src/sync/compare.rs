//! Structural diff of fetched vs. stored property bundles.
//!
//! The diff is deliberately scoped to what the store actually persists:
//! header scalars plus the four address columns, the review set keyed by
//! review id, and the translation text fields keyed by language. Fields the
//! store never writes (phone numbers, photos, rooms) can't round-trip, so
//! comparing them would flag every property as changed on every run.

use std::collections::{BTreeMap, HashMap};

use crate::upstream::{PropertyBundle, PropertyHeader, Review};

/// Absolute tolerance for latitude/longitude comparison.
const COORDINATE_EPSILON: f64 = 1e-4;

/// What changed between a fetched bundle and its stored counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub property_changed: bool,
    pub reviews_changed: bool,
    pub translations_changed: bool,
    /// Names of the header fields that differ.
    pub changed_fields: Vec<&'static str>,
}

impl ChangeSet {
    /// True if any part of the bundle requires a write.
    pub fn has_changes(&self) -> bool {
        self.property_changed || self.reviews_changed || self.translations_changed
    }
}

/// Compare a fetched bundle against the stored one.
///
/// An absent stored bundle is a create: the property counts as changed, and
/// each child set counts as changed iff the fetched side is non-empty.
pub fn compare_bundles(fetched: &PropertyBundle, stored: Option<&PropertyBundle>) -> ChangeSet {
    let Some(stored) = stored else {
        return ChangeSet {
            property_changed: true,
            reviews_changed: !fetched.reviews.is_empty(),
            translations_changed: !fetched.translations.is_empty(),
            changed_fields: vec!["property"],
        };
    };

    let changed_fields = changed_property_fields(&fetched.property, &stored.property);

    ChangeSet {
        property_changed: !changed_fields.is_empty(),
        reviews_changed: !reviews_equal(&fetched.reviews, &stored.reviews),
        translations_changed: !translations_equal(&fetched.translations, &stored.translations),
        changed_fields,
    }
}

fn float_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < COORDINATE_EPSILON
}

/// Enumerate the persisted header fields that differ.
fn changed_property_fields(fetched: &PropertyHeader, stored: &PropertyHeader) -> Vec<&'static str> {
    let mut changed = Vec::new();

    if fetched.hotel_id != stored.hotel_id || fetched.cupid_id != stored.cupid_id {
        changed.push("identity");
    }
    if fetched.hotel_name != stored.hotel_name {
        changed.push("hotel_name");
    }
    if fetched.hotel_type != stored.hotel_type {
        changed.push("hotel_type");
    }
    if fetched.chain != stored.chain {
        changed.push("chain");
    }
    if fetched.stars != stored.stars {
        changed.push("stars");
    }
    if fetched.rating != stored.rating {
        changed.push("rating");
    }
    if fetched.review_count != stored.review_count {
        changed.push("review_count");
    }
    if fetched.main_image_th != stored.main_image_th {
        changed.push("main_image");
    }
    if !float_equal(fetched.latitude, stored.latitude) {
        changed.push("latitude");
    }
    if !float_equal(fetched.longitude, stored.longitude) {
        changed.push("longitude");
    }
    if fetched.address.city != stored.address.city
        || fetched.address.state != stored.address.state
        || fetched.address.country != stored.address.country
        || fetched.address.postal_code != stored.address.postal_code
    {
        changed.push("address");
    }

    changed
}

/// Whether two properties are equal on their persisted header fields.
pub fn property_equal(fetched: &PropertyHeader, stored: &PropertyHeader) -> bool {
    changed_property_fields(fetched, stored).is_empty()
}

/// Review sets are keyed by `review_id`; order is irrelevant.
fn reviews_equal(fetched: &[Review], stored: &[Review]) -> bool {
    if fetched.len() != stored.len() {
        return false;
    }

    let stored_by_id: HashMap<i64, &Review> =
        stored.iter().map(|r| (r.review_id, r)).collect();

    fetched.iter().all(|f| {
        stored_by_id
            .get(&f.review_id)
            .is_some_and(|s| review_equal(f, s))
    })
}

fn review_equal(fetched: &Review, stored: &Review) -> bool {
    fetched.review_id == stored.review_id
        && fetched.average_score == stored.average_score
        && fetched.country == stored.country
        && fetched.name == stored.name
        && fetched.headline == stored.headline
        && fetched.pros == stored.pros
        && fetched.cons == stored.cons
        && fetched.date == stored.date
        && fetched.language == stored.language
        && fetched.source == stored.source
}

/// Translation maps are keyed by language; each pair compares on the text
/// fields the translation rows persist.
fn translations_equal(
    fetched: &BTreeMap<String, PropertyHeader>,
    stored: &BTreeMap<String, PropertyHeader>,
) -> bool {
    if fetched.len() != stored.len() {
        return false;
    }

    fetched.iter().all(|(lang, f)| {
        stored
            .get(lang)
            .is_some_and(|s| translation_equal(f, s))
    })
}

fn translation_equal(fetched: &PropertyHeader, stored: &PropertyHeader) -> bool {
    fetched.hotel_name == stored.hotel_name
        && fetched.description == stored.description
        && fetched.markdown_description == stored.markdown_description
        && fetched.important_info == stored.important_info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(hotel_id: i64) -> PropertyHeader {
        PropertyHeader {
            hotel_id,
            cupid_id: 7,
            hotel_name: "Grand Plaza".to_string(),
            hotel_type: "Hotel".to_string(),
            chain: "Plaza Group".to_string(),
            latitude: 48.8566,
            longitude: 2.3522,
            stars: 5,
            rating: 9.5,
            review_count: 2,
            main_image_th: "https://img.example.com/1.jpg".to_string(),
            address: crate::upstream::Address {
                city: "Paris".to_string(),
                country: "fr".to_string(),
                postal_code: "75001".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn review(review_id: i64, score: i32) -> Review {
        Review {
            review_id,
            average_score: score,
            country: "fr".to_string(),
            name: "A guest".to_string(),
            headline: "Nice".to_string(),
            date: "2025-05-01".to_string(),
            ..Default::default()
        }
    }

    fn bundle(hotel_id: i64) -> PropertyBundle {
        let mut translations = BTreeMap::new();
        translations.insert(
            "fr".to_string(),
            PropertyHeader {
                hotel_name: "Hôtel Grand Plaza".to_string(),
                ..Default::default()
            },
        );
        PropertyBundle {
            property: header(hotel_id),
            reviews: vec![review(1, 8), review(2, 9)],
            translations,
        }
    }

    #[test]
    fn identical_bundles_have_no_changes() {
        let b = bundle(42);
        let changes = compare_bundles(&b, Some(&b));
        assert!(!changes.has_changes());
        assert!(changes.changed_fields.is_empty());
    }

    #[test]
    fn comparison_is_symmetric() {
        let a = bundle(42);
        let mut b = bundle(42);
        b.property.rating = 9.6;
        b.reviews.push(review(3, 7));

        let ab = compare_bundles(&a, Some(&b));
        let ba = compare_bundles(&b, Some(&a));
        assert_eq!(ab.property_changed, ba.property_changed);
        assert_eq!(ab.reviews_changed, ba.reviews_changed);
        assert_eq!(ab.translations_changed, ba.translations_changed);
    }

    #[test]
    fn absent_stored_bundle_is_a_create() {
        let b = bundle(42);
        let changes = compare_bundles(&b, None);
        assert!(changes.property_changed);
        assert!(changes.reviews_changed);
        assert!(changes.translations_changed);
        assert!(changes.has_changes());
    }

    #[test]
    fn absent_stored_bundle_with_empty_children() {
        let b = PropertyBundle {
            property: header(42),
            reviews: Vec::new(),
            translations: BTreeMap::new(),
        };
        let changes = compare_bundles(&b, None);
        assert!(changes.property_changed);
        assert!(!changes.reviews_changed);
        assert!(!changes.translations_changed);
    }

    #[test]
    fn rating_change_is_detected() {
        let stored = bundle(42);
        let mut fetched = bundle(42);
        fetched.property.rating = 9.6;

        let changes = compare_bundles(&fetched, Some(&stored));
        assert!(changes.property_changed);
        assert!(!changes.reviews_changed);
        assert_eq!(changes.changed_fields, vec!["rating"]);
    }

    #[test]
    fn property_equal_matches_the_changed_field_enumeration() {
        let a = header(42);
        let mut b = header(42);
        assert!(property_equal(&a, &b));

        b.hotel_name = "Renamed".to_string();
        assert!(!property_equal(&a, &b));
    }

    #[test]
    fn coordinates_within_tolerance_are_equal() {
        let stored = bundle(42);
        let mut fetched = bundle(42);
        fetched.property.latitude += 1e-5;

        assert!(!compare_bundles(&fetched, Some(&stored)).has_changes());

        fetched.property.latitude = stored.property.latitude + 1e-3;
        let changes = compare_bundles(&fetched, Some(&stored));
        assert!(changes.property_changed);
        assert_eq!(changes.changed_fields, vec!["latitude"]);
    }

    #[test]
    fn review_order_is_irrelevant() {
        let stored = bundle(42);
        let mut fetched = bundle(42);
        fetched.reviews.reverse();

        assert!(!compare_bundles(&fetched, Some(&stored)).has_changes());
    }

    #[test]
    fn review_key_set_change_is_detected() {
        let stored = bundle(42);
        let mut fetched = bundle(42);
        fetched.reviews = vec![review(2, 9), review(3, 7)];

        let changes = compare_bundles(&fetched, Some(&stored));
        assert!(changes.reviews_changed);
        assert!(!changes.property_changed);
    }

    #[test]
    fn review_field_change_is_detected() {
        let stored = bundle(42);
        let mut fetched = bundle(42);
        fetched.reviews[0].headline = "Actually awful".to_string();

        assert!(compare_bundles(&fetched, Some(&stored)).reviews_changed);
    }

    #[test]
    fn translation_language_set_change_is_detected() {
        let stored = bundle(42);
        let mut fetched = bundle(42);
        fetched.translations.insert(
            "es".to_string(),
            PropertyHeader {
                hotel_name: "Hotel Gran Plaza".to_string(),
                ..Default::default()
            },
        );

        let changes = compare_bundles(&fetched, Some(&stored));
        assert!(changes.translations_changed);
    }

    #[test]
    fn translation_text_change_is_detected() {
        let stored = bundle(42);
        let mut fetched = bundle(42);
        fetched
            .translations
            .get_mut("fr")
            .expect("fr translation")
            .hotel_name = "Hôtel Grand Palais".to_string();

        assert!(compare_bundles(&fetched, Some(&stored)).translations_changed);
    }

    #[test]
    fn empty_and_absent_collections_are_equivalent() {
        let mut fetched = bundle(42);
        let mut stored = bundle(42);
        fetched.reviews = Vec::new();
        stored.reviews = Vec::new();
        fetched.translations = BTreeMap::new();
        stored.translations = BTreeMap::new();

        assert!(!compare_bundles(&fetched, Some(&stored)).has_changes());
    }
}
