use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    /// Next date in the cadence, clamped to the end of shorter months.
    ///
    /// Monthly steps use calendar arithmetic, so a plan anchored on the 31st
    /// drifts to the 28th (or 29th) in February and stays there.
    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => from.checked_add_days(Days::new(7)),
            Frequency::Biweekly => from.checked_add_days(Days::new(14)),
            Frequency::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub frequency: Frequency,
    pub duration_months: u32,
    pub preferred_staff: Option<Uuid>,
    pub preferred_time: Option<NaiveTime>,
}

impl SubscriptionPlan {
    pub fn new(start_date: NaiveDate, frequency: Frequency, duration_months: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            frequency,
            duration_months,
            preferred_staff: None,
            preferred_time: None,
        }
    }
}

/// One concrete appointment produced by the generator.
///
/// `sequence` is 1-based and counts target dates, not granted appointments,
/// so a skipped occurrence leaves a visible gap.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedAppointment {
    pub sequence: u32,
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub staff_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GeneratedSchedule {
    pub appointments: Vec<GeneratedAppointment>,
    pub next_appointment_date: Option<NaiveDate>,
    pub pinned_time: Option<NaiveTime>,
}
