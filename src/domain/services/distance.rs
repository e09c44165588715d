use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::area::ServiceArea;
use crate::domain::models::geo::{Coordinates, normalize_postcode};
use crate::domain::ports::{AreaReader, Geocoder};
use crate::error::EngineError;
use crate::cache::GeoCache;

pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance between two points in statute miles.
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Matches a customer postcode against staff coverage areas.
#[derive(Clone)]
pub struct DistanceMatcher {
    geocoder: Arc<dyn Geocoder>,
    areas: Arc<dyn AreaReader>,
    cache: Arc<GeoCache>,
    provider_timeout: Duration,
}

impl DistanceMatcher {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        areas: Arc<dyn AreaReader>,
        cache: Arc<GeoCache>,
        provider_timeout: Duration,
    ) -> Self {
        Self { geocoder, areas, cache, provider_timeout }
    }

    /// Staff whose active areas cover the target postcode, deduplicated in
    /// first-match order. Results are cached per postcode and service.
    pub async fn match_staff(
        &self,
        target_postcode: &str,
        service_id: Option<Uuid>,
    ) -> Result<Vec<Uuid>, EngineError> {
        let postcode = normalize_postcode(target_postcode);
        let cache_key = GeoCache::coverage_key(&postcode, service_id);
        if let Some(cached) = self.cache.get_coverage(&cache_key).await {
            return Ok(cached);
        }

        let areas = self.areas.active_areas(service_id).await?;
        let matched = self.match_staff_in_areas(&postcode, &areas, service_id).await;

        debug!(
            "Matched {} staff for {} across {} areas",
            matched.len(),
            postcode,
            areas.len()
        );
        self.cache.put_coverage(&cache_key, matched.clone()).await;
        Ok(matched)
    }

    /// Distance check against an already-loaded area list.
    ///
    /// An area restricted to a service only matches a request for that same
    /// service; an unrestricted area matches any request.
    pub async fn match_staff_in_areas(
        &self,
        target_postcode: &str,
        areas: &[ServiceArea],
        service_id: Option<Uuid>,
    ) -> Vec<Uuid> {
        let target_postcode = normalize_postcode(target_postcode);
        let target_coords = self.resolve_coordinates(&target_postcode).await;

        let mut matched: Vec<Uuid> = Vec::new();
        for area in areas {
            if area.service_id.is_some() && area.service_id != service_id {
                continue;
            }
            if matched.contains(&area.staff_id) {
                continue;
            }

            let centre_postcode = normalize_postcode(&area.centre_postcode);
            let centre_coords = self.resolve_coordinates(&centre_postcode).await;

            // Geocoding outage: keep matching on exact postcode so a
            // configured area never silently disappears.
            let covered = match (target_coords, centre_coords) {
                (Some(target), Some(centre)) => {
                    haversine_miles(target, centre) <= area.radius_miles
                }
                _ => centre_postcode == target_postcode,
            };

            if covered {
                matched.push(area.staff_id);
            }
        }
        matched
    }

    async fn resolve_coordinates(&self, postcode: &str) -> Option<Coordinates> {
        match timeout(self.provider_timeout, self.geocoder.geocode(postcode)).await {
            Ok(Ok(Some(address))) => Some(address.coordinates),
            Ok(Ok(None)) => None,
            Ok(Err(err)) => {
                warn!("Geocode failed for {}: {}", postcode, err);
                None
            }
            Err(_) => {
                warn!("Geocode timed out for {}", postcode);
                None
            }
        }
    }
}
