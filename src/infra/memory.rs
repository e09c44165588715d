//! In-memory port implementations, used by the benchmark harness and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::models::area::ServiceArea;
use crate::domain::models::booking::ExistingBooking;
use crate::domain::models::geo::{
    AddressSuggestion, Coordinates, GeocodedAddress, normalize_postcode,
};
use crate::domain::models::route::TravelTimeMatrix;
use crate::domain::models::schedule::StaffScheduleEntry;
use crate::domain::ports::{
    AreaReader, BookingReader, Geocoder, ScheduleReader, TravelTimeProvider,
};
use crate::error::EngineError;

#[derive(Default)]
pub struct InMemoryScheduleReader {
    entries: RwLock<Vec<StaffScheduleEntry>>,
}

impl InMemoryScheduleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, entry: StaffScheduleEntry) {
        self.entries.write().await.push(entry);
    }
}

#[async_trait]
impl ScheduleReader for InMemoryScheduleReader {
    async fn weekly_schedule(
        &self,
        staff_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<StaffScheduleEntry>, EngineError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|e| e.staff_id == staff_id && e.day_of_week == day_of_week)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryBookingReader {
    bookings: RwLock<Vec<ExistingBooking>>,
}

impl InMemoryBookingReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, booking: ExistingBooking) {
        self.bookings.write().await.push(booking);
    }
}

#[async_trait]
impl BookingReader for InMemoryBookingReader {
    async fn bookings_in_range(
        &self,
        staff_ids: &[Uuid],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExistingBooking>, EngineError> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|b| staff_ids.contains(&b.staff_id))
            .filter(|b| b.start < end && b.end > start)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAreaReader {
    areas: RwLock<Vec<ServiceArea>>,
}

impl InMemoryAreaReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, area: ServiceArea) {
        self.areas.write().await.push(area);
    }
}

#[async_trait]
impl AreaReader for InMemoryAreaReader {
    async fn active_areas(&self, service_id: Option<Uuid>) -> Result<Vec<ServiceArea>, EngineError> {
        let areas = self.areas.read().await;
        Ok(areas
            .iter()
            .filter(|a| match service_id {
                Some(id) => a.service_id.is_none() || a.service_id == Some(id),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// Geocoder over a fixed postcode table. Unknown postcodes resolve to
/// `None`, the same answer a live provider gives for a dead postcode.
#[derive(Default)]
pub struct StaticGeocoder {
    table: RwLock<HashMap<String, GeocodedAddress>>,
    suggestions: RwLock<HashMap<String, Vec<AddressSuggestion>>>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, postcode: &str, latitude: f64, longitude: f64) {
        let key = normalize_postcode(postcode);
        let address = GeocodedAddress {
            coordinates: Coordinates { latitude, longitude },
            formatted_address: key.clone(),
            is_domestic: true,
        };
        self.table.write().await.insert(key, address);
    }

    pub async fn insert_suggestions(&self, query: &str, suggestions: Vec<AddressSuggestion>) {
        self.suggestions
            .write()
            .await
            .insert(normalize_postcode(query), suggestions);
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedAddress>, EngineError> {
        let table = self.table.read().await;
        Ok(table.get(&normalize_postcode(postcode)).cloned())
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressSuggestion>, EngineError> {
        let suggestions = self.suggestions.read().await;
        Ok(suggestions
            .get(&normalize_postcode(query))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct StaticTravelTimeProvider {
    matrix: RwLock<Option<TravelTimeMatrix>>,
}

impl StaticTravelTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_matrix(&self, durations: Vec<Vec<u32>>) -> Result<(), EngineError> {
        let matrix = TravelTimeMatrix::new(durations)?;
        *self.matrix.write().await = Some(matrix);
        Ok(())
    }
}

#[async_trait]
impl TravelTimeProvider for StaticTravelTimeProvider {
    async fn travel_matrix(
        &self,
        _points: &[Coordinates],
    ) -> Result<Option<TravelTimeMatrix>, EngineError> {
        Ok(self.matrix.read().await.clone())
    }
}
