//! Client for the upstream property content API.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::http::{HttpHeaders, HttpError, HttpTransport, ReqwestTransport};

use super::error::{Result, UpstreamError};
use super::types::{
    PropertyBundle, PropertyHeader, Review, TranslationEnvelope, TRANSLATION_LANGUAGES,
};

/// Per-request deadline. The upstream can be slow on cold properties but
/// anything beyond this is treated as a transport failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("innsync/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL, without a trailing slash (e.g. `https://content.example.com`).
    pub base_url: String,
    /// API version path segment (e.g. `v3`).
    pub version: String,
    /// API key sent in the `x-api-key` header; empty disables the header.
    pub api_key: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://content-api.example.com".to_string(),
            version: "v3".to_string(),
            api_key: String::new(),
        }
    }
}

/// Client for the three upstream content endpoints.
///
/// Generic over [`HttpTransport`] so tests can drive it with an in-memory
/// transport. Each operation makes a single attempt with a 30-second
/// deadline; retries belong to callers.
#[derive(Clone)]
pub struct UpstreamClient<T> {
    config: UpstreamConfig,
    transport: T,
}

impl UpstreamClient<ReqwestTransport> {
    /// Build a client with the real reqwest transport and default deadline.
    pub fn new(config: UpstreamConfig) -> std::result::Result<Self, HttpError> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: HttpTransport> UpstreamClient<T> {
    pub fn with_transport(config: UpstreamConfig, transport: T) -> Self {
        Self { config, transport }
    }

    fn headers(&self) -> HttpHeaders {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if !self.config.api_key.is_empty() {
            headers.push(("x-api-key".to_string(), self.config.api_key.clone()));
        }
        headers
    }

    async fn get_json<D: DeserializeOwned>(&self, endpoint: &str) -> Result<D> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        tracing::debug!(url = %url, "Requesting upstream document");

        let response = self
            .transport
            .get(&url, &self.headers())
            .await
            .map_err(UpstreamError::from)?;

        if response.status >= 400 {
            return Err(UpstreamError::Http {
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Fetch a property header by ID.
    pub async fn get_property(&self, property_id: i64) -> Result<PropertyHeader> {
        let endpoint = format!("/{}/property/{}", self.config.version, property_id);
        let header: PropertyHeader = self.get_json(&endpoint).await?;

        tracing::info!(
            property_id,
            hotel_name = %header.hotel_name,
            "Fetched property"
        );
        Ok(header)
    }

    /// Fetch up to `count` reviews for a property.
    ///
    /// The upstream may return fewer reviews than requested; that is
    /// treated as successful partial data.
    pub async fn get_reviews(&self, property_id: i64, count: i32) -> Result<Vec<Review>> {
        let endpoint = format!(
            "/{}/property/reviews/{}/{}",
            self.config.version, property_id, count
        );
        let reviews: Vec<Review> = self.get_json(&endpoint).await?;

        tracing::info!(property_id, review_count = reviews.len(), "Fetched reviews");
        Ok(reviews)
    }

    /// Fetch the translated header for a property in the given language.
    pub async fn get_translation(&self, property_id: i64, language: &str) -> Result<PropertyHeader> {
        let endpoint = format!(
            "/{}/property/{}/lang/{}",
            self.config.version, property_id, language
        );
        let envelope: TranslationEnvelope = self.get_json(&endpoint).await?;

        tracing::info!(property_id, language, "Fetched translation");
        Ok(envelope.data)
    }

    /// Fetch the complete bundle for a property: header, reviews, and the
    /// translated headers for every language of interest.
    ///
    /// The header is authoritative; its failure fails the property. Missing
    /// reviews or a missing language degrade the bundle instead of failing
    /// it, because partial data is still worth persisting.
    pub async fn fetch_property_bundle(&self, property_id: i64) -> Result<PropertyBundle> {
        let property = self.get_property(property_id).await?;

        let reviews = if property.review_count > 0 {
            match self.get_reviews(property_id, property.review_count).await {
                Ok(reviews) => reviews,
                Err(e) => {
                    tracing::warn!(
                        property_id,
                        review_count = property.review_count,
                        error = %e,
                        "Failed to fetch reviews, continuing without them"
                    );
                    Vec::new()
                }
            }
        } else {
            tracing::debug!(property_id, "No reviews available for property");
            Vec::new()
        };

        let mut translations = BTreeMap::new();
        for lang in TRANSLATION_LANGUAGES {
            match self.get_translation(property_id, lang).await {
                Ok(header) => {
                    translations.insert((*lang).to_string(), header);
                }
                Err(e) => {
                    tracing::warn!(
                        property_id,
                        language = *lang,
                        error = %e,
                        "Failed to fetch translation, continuing without it"
                    );
                }
            }
        }

        tracing::debug!(
            property_id,
            review_count = reviews.len(),
            translation_count = translations.len(),
            "Complete property bundle fetched"
        );

        Ok(PropertyBundle {
            property,
            reviews,
            translations,
        })
    }
}
