//! Wire models for the upstream content API.
//!
//! These mirror the JSON documents the upstream returns. The non-scalar
//! sub-structures (photos, rooms, policies, ...) are carried through the
//! pipeline as-is and persisted as opaque JSON documents on the detail row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A hotel property header as returned by `GET /{v}/property/{id}`.
///
/// The translation endpoint returns the same shape (wrapped in an
/// envelope) with the text fields localized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyHeader {
    pub hotel_id: i64,
    pub cupid_id: i64,
    pub main_image_th: String,
    pub hotel_type: String,
    pub hotel_type_id: i32,
    pub chain: String,
    pub chain_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub hotel_name: String,
    pub phone: String,
    pub fax: String,
    pub email: String,
    pub address: Address,
    pub stars: i32,
    pub airport_code: String,
    pub rating: f64,
    pub review_count: i32,
    pub checkin: CheckIn,
    pub parking: Option<String>,
    pub group_room_min: Option<i32>,
    pub child_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub photos: Vec<Photo>,
    pub description: String,
    pub markdown_description: String,
    pub important_info: String,
    pub facilities: Vec<Facility>,
    pub policies: Vec<Policy>,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckIn {
    pub checkin_start: String,
    pub checkin_end: String,
    pub checkout: String,
    pub instructions: Vec<Instruction>,
    pub special_instructions: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instruction {
    pub id: i32,
    pub instruction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Photo {
    pub url: String,
    pub hd_url: String,
    pub image_description: String,
    pub image_class1: String,
    pub image_class2: String,
    pub main_photo: bool,
    pub score: f64,
    pub class_id: i32,
    pub class_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facility {
    pub facility_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub policy_type: String,
    pub name: String,
    pub description: String,
    pub child_allowed: String,
    pub pets_allowed: String,
    pub parking: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Room {
    pub id: i64,
    pub room_name: String,
    pub description: String,
    pub room_size_square: i32,
    pub room_size_unit: String,
    pub hotel_id: String,
    pub max_adults: i32,
    pub max_children: i32,
    pub max_occupancy: i32,
    pub bed_relation: String,
    pub bed_types: Vec<BedType>,
    pub room_amenities: Vec<RoomAmenity>,
    pub photos: Vec<Photo>,
    pub views: Vec<RoomView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedType {
    pub quantity: i32,
    pub bed_type: String,
    pub bed_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomAmenity {
    pub amenities_id: i32,
    pub name: String,
    pub sort: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomView {
    pub id: i32,
    pub view: String,
}

/// A guest review, unique per `(property, review_id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub review_id: i64,
    pub average_score: i32,
    pub country: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub date: String,
    pub headline: String,
    pub language: String,
    pub pros: String,
    pub cons: String,
    pub source: String,
}

/// Wrapper the translation endpoint puts around the localized header.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationEnvelope {
    pub data: PropertyHeader,
}

/// The complete unit of data moved through the sync pipeline: one property
/// header, its review set, and its translated headers keyed by language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBundle {
    pub property: PropertyHeader,
    pub reviews: Vec<Review>,
    pub translations: BTreeMap<String, PropertyHeader>,
}

impl PropertyBundle {
    pub fn hotel_id(&self) -> i64 {
        self.property.hotel_id
    }
}

/// Languages fetched for every property.
pub const TRANSLATION_LANGUAGES: &[&str] = &["fr", "es"];

/// The fixed set of upstream property identifiers the mirror tracks.
pub const PROPERTY_IDS: &[i64] = &[
    1641879, 317597, 1202743, 1037179, 1154868, 1270324, 1305326, 1617655, 1975211, 2017823,
    1503950, 1033299, 378772, 1563003, 1085875, 828917, 830417, 838887, 1702062, 1144294, 1738870,
    898052, 906450, 906467, 2241195, 1244595, 1277032, 956026, 957111, 152896, 896868, 982911,
    986491, 986622, 988544, 989315, 989544, 990223, 990341, 990370, 990490, 990609, 990629,
    1259611, 991819, 992027, 992851, 993851, 994085, 994333, 994495, 994903, 995227, 995787,
    996977, 1186578, 999444, 1000017, 1000051, 1198750, 1001100, 1001296, 1001402, 1002200,
    1003142, 1004288, 1006404, 1006602, 1006810, 1006887, 1007101, 1007269, 1007466, 1011203,
    1011644, 1011945, 1012047, 1012140, 1012944, 1023527, 1013529, 1013584, 1014383, 1015094,
    1016591, 1016611, 1017019, 1017039, 1017044, 1018030, 1018130, 1018251, 1018402, 1018946,
    1019473, 1020332, 1020335, 1020386, 1021856, 1022380,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_header_decodes_from_partial_document() {
        let json = serde_json::json!({
            "hotel_id": 12345,
            "hotel_name": "Grand Plaza",
            "stars": 5,
            "rating": 9.5,
            "review_count": 2,
            "address": { "city": "Paris", "country": "fr" }
        });

        let header: PropertyHeader =
            serde_json::from_value(json).expect("partial document should decode");
        assert_eq!(header.hotel_id, 12345);
        assert_eq!(header.hotel_name, "Grand Plaza");
        assert_eq!(header.address.city, "Paris");
        assert!(header.photos.is_empty());
        assert!(header.parking.is_none());
    }

    #[test]
    fn review_kind_maps_to_wire_type_field() {
        let json = serde_json::json!({
            "review_id": 9,
            "average_score": 8,
            "type": "couple",
        });

        let review: Review = serde_json::from_value(json).expect("review should decode");
        assert_eq!(review.kind, "couple");

        let back = serde_json::to_value(&review).expect("review should encode");
        assert_eq!(back["type"], "couple");
    }

    #[test]
    fn property_ids_are_unique() {
        let mut ids = PROPERTY_IDS.to_vec();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PROPERTY_IDS.len());
    }
}
