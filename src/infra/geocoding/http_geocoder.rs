use crate::domain::models::geo::{
    AddressSuggestion, Coordinates, GeocodedAddress, normalize_postcode,
};
use crate::domain::ports::Geocoder;
use crate::error::EngineError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::error;

const DOMESTIC_REGIONS: [&str; 4] = ["England", "Scotland", "Wales", "Northern Ireland"];

/// Geocoder backed by a postcodes.io-compatible HTTP API.
pub struct HttpGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGeocoder {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url, api_key }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }
        builder
    }
}

#[derive(Deserialize)]
struct PostcodeResponse {
    result: Option<PostcodeResult>,
}

#[derive(Deserialize)]
struct PostcodeResult {
    postcode: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    country: Option<String>,
    region: Option<String>,
    admin_district: Option<String>,
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    result: Option<Vec<String>>,
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedAddress>, EngineError> {
        let postcode = normalize_postcode(postcode);
        let url = format!("{}/postcodes/{}", self.base_url, postcode);

        let res = self.request(&url).send().await.map_err(|e| {
            let msg = format!("Geocoder connection error: {}", e);
            error!("{}", msg);
            EngineError::Provider(msg)
        })?;

        // The provider answers 404 for postcodes that do not exist.
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Geocoder failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(EngineError::Provider(msg));
        }

        let body: PostcodeResponse = res.json().await.map_err(|e| {
            let msg = format!("Geocoder returned malformed body: {}", e);
            error!("{}", msg);
            EngineError::Provider(msg)
        })?;

        let Some(result) = body.result else {
            return Ok(None);
        };
        let (Some(latitude), Some(longitude)) = (result.latitude, result.longitude) else {
            // Valid postcode without geodata, e.g. non-geographic ranges.
            return Ok(None);
        };

        let formatted_address = [
            result.admin_district.as_deref(),
            result.region.as_deref(),
            Some(result.postcode.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        let is_domestic = result
            .country
            .as_deref()
            .is_some_and(|c| DOMESTIC_REGIONS.contains(&c));

        Ok(Some(GeocodedAddress {
            coordinates: Coordinates { latitude, longitude },
            formatted_address,
            is_domestic,
        }))
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressSuggestion>, EngineError> {
        let query = normalize_postcode(query);
        let url = format!("{}/postcodes/{}/autocomplete", self.base_url, query);

        let res = self.request(&url).send().await.map_err(|e| {
            let msg = format!("Geocoder connection error: {}", e);
            error!("{}", msg);
            EngineError::Provider(msg)
        })?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Geocoder autocomplete failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(EngineError::Provider(msg));
        }

        let body: AutocompleteResponse = res.json().await.map_err(|e| {
            let msg = format!("Geocoder returned malformed body: {}", e);
            error!("{}", msg);
            EngineError::Provider(msg)
        })?;

        Ok(body
            .result
            .unwrap_or_default()
            .into_iter()
            .map(|postcode| AddressSuggestion { postcode, description: None })
            .collect())
    }
}
