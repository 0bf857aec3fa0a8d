//! Client and wire models for the upstream property content API.
//!
//! The upstream exposes three read endpoints per property (header, reviews,
//! translated header). [`UpstreamClient::fetch_property_bundle`] composes
//! them into a [`PropertyBundle`], tolerating missing reviews and missing
//! languages.

mod client;
mod error;
mod types;

pub use client::{UpstreamClient, UpstreamConfig, REQUEST_TIMEOUT};
pub use error::{Result, UpstreamError};
pub use types::{
    Address, BedType, CheckIn, Facility, Instruction, Photo, Policy, PropertyBundle,
    PropertyHeader, Review, Room, RoomAmenity, RoomView, TranslationEnvelope, PROPERTY_IDS,
    TRANSLATION_LANGUAGES,
};
