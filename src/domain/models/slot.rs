use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single offerable start time on the day grid.
///
/// `staff_ids` lists every staff member who could take the slot; it is empty
/// when `available` is false, and `reason` is set instead.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SlotResult {
    pub time: NaiveTime,
    pub available: bool,
    pub staff_ids: Vec<Uuid>,
    pub reason: Option<String>,
}
