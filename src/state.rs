use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::domain::models::cancellation::CancellationDecision;
use crate::domain::models::geo::AddressSuggestion;
use crate::domain::ports::{
    AreaReader, BookingReader, Geocoder, ScheduleReader, TravelTimeProvider,
};
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::cancellation;
use crate::domain::services::distance::DistanceMatcher;
use crate::domain::services::recurrence::RecurrenceGenerator;
use crate::domain::services::routing::RoutePlanner;
use crate::error::EngineError;
use crate::cache::GeoCache;

/// Everything a caller needs to schedule: ports, cache and the services
/// wired over them. Cloning is cheap, all fields are shared handles.
#[derive(Clone)]
pub struct Engine {
    pub config: EngineConfig,
    pub geocoder: Arc<dyn Geocoder>,
    pub travel: Arc<dyn TravelTimeProvider>,
    pub schedules: Arc<dyn ScheduleReader>,
    pub bookings: Arc<dyn BookingReader>,
    pub areas: Arc<dyn AreaReader>,
    pub geo_cache: Arc<GeoCache>,
    pub matcher: DistanceMatcher,
    pub availability: AvailabilityService,
    pub recurrence: RecurrenceGenerator,
    pub routing: RoutePlanner,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        geocoder: Arc<dyn Geocoder>,
        travel: Arc<dyn TravelTimeProvider>,
        schedules: Arc<dyn ScheduleReader>,
        bookings: Arc<dyn BookingReader>,
        areas: Arc<dyn AreaReader>,
        geo_cache: Arc<GeoCache>,
    ) -> Self {
        let provider_timeout = Duration::from_secs(config.provider_timeout_secs.clamp(5, 15));

        let matcher = DistanceMatcher::new(
            Arc::clone(&geocoder),
            Arc::clone(&areas),
            Arc::clone(&geo_cache),
            provider_timeout,
        );
        let availability = AvailabilityService::new(
            Arc::clone(&schedules),
            Arc::clone(&bookings),
            config.schedule_timezone,
        );
        let recurrence = RecurrenceGenerator::new(
            matcher.clone(),
            availability.clone(),
            config.schedule_timezone,
            config.recurrence_lookahead_days,
        );
        let routing = RoutePlanner::new(Arc::clone(&travel), provider_timeout);

        Self {
            config,
            geocoder,
            travel,
            schedules,
            bookings,
            areas,
            geo_cache,
            matcher,
            availability,
            recurrence,
            routing,
        }
    }

    pub async fn suggest_addresses(
        &self,
        query: &str,
    ) -> Result<Vec<AddressSuggestion>, EngineError> {
        self.geocoder.autocomplete(query).await
    }

    /// Apply the configured cancellation policy to an appointment start.
    pub fn evaluate_cancellation(&self, appointment_start: DateTime<Utc>) -> CancellationDecision {
        cancellation::evaluate(appointment_start, self.config.cancellation_policy_hours)
    }
}
