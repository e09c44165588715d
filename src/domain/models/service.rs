use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceSpec {
    pub id: Uuid,
    pub name: String,
    pub duration_min: u32,
    /// Buffer added after each booking of this service before the staff
    /// member can take the next one.
    pub padding_min: u32,
    /// Max concurrent bookings a single staff member takes per slot.
    pub capacity: u32,
}

impl ServiceSpec {
    pub fn new(name: &str, duration_min: u32, padding_min: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            duration_min,
            padding_min,
            capacity: 1,
        }
    }

    pub fn effective_duration_min(&self) -> u32 {
        self.duration_min + self.padding_min
    }
}
