use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn blocks_slots(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::InProgress
        )
    }
}

/// Read projection of an appointment, as surfaced by the persistence layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExistingBooking {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub service_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
}

impl ExistingBooking {
    pub fn new(staff_id: Uuid, service_id: Uuid, start: DateTime<Utc>, duration_min: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            service_id,
            start,
            end: start + Duration::minutes(duration_min as i64),
            status: BookingStatus::Confirmed,
        }
    }
}
