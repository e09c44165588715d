use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BreakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// One working-hours row per staff member per weekday.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StaffScheduleEntry {
    pub staff_id: Uuid,
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub breaks: Vec<BreakWindow>,
}

impl StaffScheduleEntry {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.day_of_week > 6 {
            return Err(EngineError::Validation(format!(
                "day_of_week {} out of range",
                self.day_of_week
            )));
        }
        if self.start >= self.end {
            return Err(EngineError::Validation(
                "work start must be before work end".to_string(),
            ));
        }
        let mut prev_end: Option<NaiveTime> = None;
        for window in &self.breaks {
            if window.start >= window.end {
                return Err(EngineError::Validation(
                    "break start must be before break end".to_string(),
                ));
            }
            if window.start < self.start || window.end > self.end {
                return Err(EngineError::Validation(
                    "break falls outside working hours".to_string(),
                ));
            }
            if let Some(prev) = prev_end
                && window.start < prev
            {
                return Err(EngineError::Validation(
                    "breaks must be ordered and non-overlapping".to_string(),
                ));
            }
            prev_end = Some(window.end);
        }
        Ok(())
    }
}
