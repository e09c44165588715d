#![allow(dead_code)]

use async_trait::async_trait;
use booking_engine::{
    cache::GeoCache,
    config::EngineConfig,
    domain::models::geo::{AddressSuggestion, GeocodedAddress},
    domain::models::schedule::{BreakWindow, StaffScheduleEntry},
    domain::models::service::ServiceSpec,
    domain::ports::{AreaReader, BookingReader, Geocoder, ScheduleReader, TravelTimeProvider},
    error::EngineError,
    infra::geocoding::cached::CachedGeocoder,
    infra::memory::{
        InMemoryAreaReader, InMemoryBookingReader, InMemoryScheduleReader, StaticGeocoder,
        StaticTravelTimeProvider,
    },
    state::Engine,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Engine wired over in-memory adapters, with handles kept open so tests
/// can seed data behind the ports.
pub struct TestEngine {
    pub engine: Engine,
    pub schedules: Arc<InMemoryScheduleReader>,
    pub bookings: Arc<InMemoryBookingReader>,
    pub areas: Arc<InMemoryAreaReader>,
    pub geocoder: Arc<StaticGeocoder>,
    pub travel: Arc<StaticTravelTimeProvider>,
    pub cache: Arc<GeoCache>,
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        schedule_timezone: chrono_tz::UTC,
        ..EngineConfig::default()
    }
}

impl TestEngine {
    /// UTC timezone, caching off so every call sees fresh port data.
    pub async fn new() -> Self {
        Self::build(test_config(), true).await
    }

    pub async fn with_timezone(tz: Tz) -> Self {
        let mut config = test_config();
        config.schedule_timezone = tz;
        Self::build(config, true).await
    }

    pub async fn with_live_cache() -> Self {
        Self::build(test_config(), false).await
    }

    /// Swap in a custom geocoder, e.g. one that always fails.
    pub async fn with_geocoder(geocoder: Arc<dyn Geocoder>) -> Self {
        let mut built = Self::build(test_config(), true).await;
        built.engine = Engine::new(
            test_config(),
            geocoder,
            Arc::clone(&built.travel) as Arc<dyn TravelTimeProvider>,
            Arc::clone(&built.schedules) as Arc<dyn ScheduleReader>,
            Arc::clone(&built.bookings) as Arc<dyn BookingReader>,
            Arc::clone(&built.areas) as Arc<dyn AreaReader>,
            Arc::clone(&built.cache),
        );
        built
    }

    async fn build(config: EngineConfig, disable_cache: bool) -> Self {
        let schedules = Arc::new(InMemoryScheduleReader::new());
        let bookings = Arc::new(InMemoryBookingReader::new());
        let areas = Arc::new(InMemoryAreaReader::new());
        let static_geocoder = Arc::new(StaticGeocoder::new());
        let travel = Arc::new(StaticTravelTimeProvider::new());
        let cache = Arc::new(if disable_cache {
            GeoCache::disabled()
        } else {
            GeoCache::new()
        });

        let geocoder = Arc::new(CachedGeocoder::new(
            Arc::clone(&static_geocoder) as Arc<dyn Geocoder>,
            Arc::clone(&cache),
        ));

        let engine = Engine::new(
            config,
            geocoder,
            Arc::clone(&travel) as Arc<dyn TravelTimeProvider>,
            Arc::clone(&schedules) as Arc<dyn ScheduleReader>,
            Arc::clone(&bookings) as Arc<dyn BookingReader>,
            Arc::clone(&areas) as Arc<dyn AreaReader>,
            Arc::clone(&cache),
        );

        Self {
            engine,
            schedules,
            bookings,
            areas,
            geocoder: static_geocoder,
            travel,
            cache,
        }
    }
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

pub fn entry(staff_id: Uuid, day_of_week: u8, start: &str, end: &str) -> StaffScheduleEntry {
    StaffScheduleEntry {
        staff_id,
        day_of_week,
        start: time(start),
        end: time(end),
        breaks: Vec::new(),
    }
}

pub fn entry_with_break(
    staff_id: Uuid,
    day_of_week: u8,
    start: &str,
    end: &str,
    break_start: &str,
    break_end: &str,
) -> StaffScheduleEntry {
    StaffScheduleEntry {
        staff_id,
        day_of_week,
        start: time(start),
        end: time(end),
        breaks: vec![BreakWindow { start: time(break_start), end: time(break_end) }],
    }
}

pub fn service_60min() -> ServiceSpec {
    ServiceSpec::new("Standard clean", 60, 0)
}

/// Geocoder that never answers, simulating a provider outage.
pub struct FailingGeocoder;

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn geocode(&self, _postcode: &str) -> Result<Option<GeocodedAddress>, EngineError> {
        Err(EngineError::Provider("geocoder offline".to_string()))
    }

    async fn autocomplete(&self, _query: &str) -> Result<Vec<AddressSuggestion>, EngineError> {
        Err(EngineError::Provider("geocoder offline".to_string()))
    }
}

/// Wraps another geocoder and counts how often each lookup reaches it.
pub struct CountingGeocoder {
    inner: Arc<dyn Geocoder>,
    geocode_calls: AtomicUsize,
    autocomplete_calls: AtomicUsize,
}

impl CountingGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>) -> Self {
        Self {
            inner,
            geocode_calls: AtomicUsize::new(0),
            autocomplete_calls: AtomicUsize::new(0),
        }
    }

    pub fn geocode_count(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn autocomplete_count(&self) -> usize {
        self.autocomplete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for CountingGeocoder {
    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedAddress>, EngineError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.geocode(postcode).await
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressSuggestion>, EngineError> {
        self.autocomplete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.autocomplete(query).await
    }
}
