use crate::domain::models::geo::{AddressSuggestion, GeocodedAddress, normalize_postcode};
use crate::domain::ports::Geocoder;
use crate::error::EngineError;
use crate::cache::GeoCache;
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps any geocoder with the shared TTL cache.
///
/// The provider's full answer is cached, including "postcode does not
/// exist", so a dead postcode is not re-queried for the geocode TTL.
/// Provider errors are never cached.
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: Arc<GeoCache>,
}

impl CachedGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, cache: Arc<GeoCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedAddress>, EngineError> {
        let key = normalize_postcode(postcode);
        if let Some(cached) = self.cache.get_geocode(&key).await {
            return Ok(cached);
        }

        let resolved = self.inner.geocode(&key).await?;
        self.cache.put_geocode(&key, resolved.clone()).await;
        Ok(resolved)
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressSuggestion>, EngineError> {
        let key = format!("suggest:{}", normalize_postcode(query));
        if let Some(cached) = self.cache.get_suggestions(&key).await {
            return Ok(cached);
        }

        let suggestions = self.inner.autocomplete(query).await?;
        self.cache.put_suggestions(&key, suggestions.clone()).await;
        Ok(suggestions)
    }
}
