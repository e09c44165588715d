use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::EngineConfig;
use crate::domain::ports::{AreaReader, BookingReader, ScheduleReader};
use crate::cache::{GeoCache, spawn_sweeper};
use crate::infra::geocoding::cached::CachedGeocoder;
use crate::infra::geocoding::http_geocoder::HttpGeocoder;
use crate::infra::travel::http_travel_matrix::HttpTravelMatrix;
use crate::state::Engine;

const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Wire the engine against live HTTP providers.
///
/// Persistence-backed readers are supplied by the caller; the geocoder and
/// travel matrix come from the configured endpoints, with a shared cache in
/// front of the geocoder. Must be called from within a Tokio runtime, since
/// the cache sweeper is spawned onto it.
pub fn bootstrap_engine(
    config: &EngineConfig,
    schedules: Arc<dyn ScheduleReader>,
    bookings: Arc<dyn BookingReader>,
    areas: Arc<dyn AreaReader>,
) -> Engine {
    let provider_timeout = Duration::from_secs(config.provider_timeout_secs.clamp(5, 15));

    let geo_cache = Arc::new(GeoCache::new());
    spawn_sweeper(Arc::clone(&geo_cache), SWEEP_INTERVAL);

    let raw_geocoder = Arc::new(HttpGeocoder::new(
        config.geocoder_base_url.clone(),
        config.geocoder_api_key.clone(),
        provider_timeout,
    ));
    let geocoder = Arc::new(CachedGeocoder::new(raw_geocoder, Arc::clone(&geo_cache)));

    let travel = Arc::new(HttpTravelMatrix::new(
        config.travel_matrix_base_url.clone(),
        provider_timeout,
    ));

    info!(
        "Engine ready: geocoder at {}, travel matrix at {}",
        config.geocoder_base_url, config.travel_matrix_base_url
    );

    Engine::new(
        config.clone(),
        geocoder,
        travel,
        schedules,
        bookings,
        areas,
        geo_cache,
    )
}
