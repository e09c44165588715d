use crate::domain::models::{
    area::ServiceArea, booking::ExistingBooking, geo::{AddressSuggestion, Coordinates, GeocodedAddress},
    route::TravelTimeMatrix, schedule::StaffScheduleEntry,
};
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Postcode resolution against an external geodata provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the provider answered and the postcode does not exist.
    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedAddress>, EngineError>;
    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressSuggestion>, EngineError>;
}

#[async_trait]
pub trait ScheduleReader: Send + Sync {
    async fn weekly_schedule(
        &self,
        staff_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<StaffScheduleEntry>, EngineError>;
}

#[async_trait]
pub trait BookingReader: Send + Sync {
    async fn bookings_in_range(
        &self,
        staff_ids: &[Uuid],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExistingBooking>, EngineError>;
}

#[async_trait]
pub trait AreaReader: Send + Sync {
    /// Active coverage areas, optionally narrowed to one service.
    /// Areas with no service restriction are always included.
    async fn active_areas(&self, service_id: Option<Uuid>) -> Result<Vec<ServiceArea>, EngineError>;
}

#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    /// Pairwise driving durations for the given points, in point order.
    /// `Ok(None)` means the provider could not produce a usable matrix.
    async fn travel_matrix(
        &self,
        points: &[Coordinates],
    ) -> Result<Option<TravelTimeMatrix>, EngineError>;
}
