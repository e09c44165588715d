use chrono::{Days, Duration, Months, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::domain::models::service::ServiceSpec;
use crate::domain::models::slot::SlotResult;
use crate::domain::models::subscription::{
    Frequency, GeneratedAppointment, GeneratedSchedule, SubscriptionPlan,
};
use crate::domain::services::availability::{AvailabilityService, local_instant};
use crate::domain::services::distance::DistanceMatcher;
use crate::error::EngineError;

/// Walk the calendar from `start`, one step per frequency interval, until
/// the next step would land past `start + duration_months`.
///
/// The walk emits a date only while another full interval still fits, so a
/// weekly plan over one month yields four occurrences, not five.
pub fn target_dates(start: NaiveDate, frequency: Frequency, duration_months: u32) -> Vec<NaiveDate> {
    let Some(end) = start.checked_add_months(Months::new(duration_months)) else {
        return Vec::new();
    };

    let mut dates = Vec::new();
    let mut current = start;
    while let Some(next) = frequency.next_date(current) {
        if next > end {
            break;
        }
        dates.push(current);
        current = next;
    }
    dates
}

/// Selection ladder for one day's grid. A wanted time beats a wanted staff
/// member: if the preferred time is open at all, it is granted even when the
/// preferred staff cannot take it.
fn pick_slot(
    slots: &[SlotResult],
    preferred_staff: Option<Uuid>,
    preferred_time: Option<NaiveTime>,
) -> Option<(NaiveTime, Uuid)> {
    if let Some(time) = preferred_time
        && let Some(slot) = slots.iter().find(|s| s.available && s.time == time)
    {
        if let Some(staff) = preferred_staff
            && slot.staff_ids.contains(&staff)
        {
            return Some((slot.time, staff));
        }
        return slot.staff_ids.first().map(|id| (slot.time, *id));
    }

    if let Some(staff) = preferred_staff
        && let Some(slot) = slots.iter().find(|s| s.available && s.staff_ids.contains(&staff))
    {
        return Some((slot.time, staff));
    }

    slots
        .iter()
        .find(|s| s.available)
        .and_then(|slot| slot.staff_ids.first().map(|id| (slot.time, *id)))
}

#[derive(Clone)]
pub struct RecurrenceGenerator {
    matcher: DistanceMatcher,
    availability: AvailabilityService,
    timezone: Tz,
    lookahead_days: u32,
}

impl RecurrenceGenerator {
    pub fn new(
        matcher: DistanceMatcher,
        availability: AvailabilityService,
        timezone: Tz,
        lookahead_days: u32,
    ) -> Self {
        Self { matcher, availability, timezone, lookahead_days }
    }

    /// Materialize a subscription plan into concrete appointments.
    ///
    /// Each target date is resolved independently: if no slot exists within
    /// the lookahead window the occurrence is skipped and the series carries
    /// on from the next target date. The first granted appointment pins its
    /// start time as the preference for the rest of the series.
    pub async fn generate_schedule(
        &self,
        plan: &SubscriptionPlan,
        service: &ServiceSpec,
        postcode: &str,
    ) -> Result<GeneratedSchedule, EngineError> {
        if postcode.trim().is_empty() {
            return Err(EngineError::Validation(
                "a postcode is required to schedule a subscription".to_string(),
            ));
        }

        let span = info_span!("generate_schedule", plan_id = %plan.id, frequency = ?plan.frequency);
        self.generate_inner(plan, service, postcode).instrument(span).await
    }

    async fn generate_inner(
        &self,
        plan: &SubscriptionPlan,
        service: &ServiceSpec,
        postcode: &str,
    ) -> Result<GeneratedSchedule, EngineError> {
        let targets = target_dates(plan.start_date, plan.frequency, plan.duration_months);
        let mut schedule = GeneratedSchedule::default();
        let mut pinned_time = plan.preferred_time;

        for (idx, target) in targets.iter().enumerate() {
            let sequence = (idx + 1) as u32;
            let granted = self
                .schedule_sequence(service, postcode, *target, plan.preferred_staff, pinned_time)
                .await?;

            match granted {
                Some((date, time, staff_id)) => {
                    if schedule.appointments.is_empty() {
                        pinned_time = Some(time);
                    }
                    let start = local_instant(date, time, self.timezone);
                    let end = start + Duration::minutes(service.duration_min as i64);
                    info!(
                        "Sequence {} booked for {} at {} with staff {}",
                        sequence, date, time, staff_id
                    );
                    schedule.appointments.push(GeneratedAppointment {
                        sequence,
                        date,
                        start,
                        end,
                        staff_id,
                    });
                }
                None => {
                    warn!(
                        "Sequence {} skipped: nothing bookable within {} days of {}",
                        sequence, self.lookahead_days, target
                    );
                }
            }
        }

        schedule.next_appointment_date = schedule.appointments.first().map(|a| a.date);
        schedule.pinned_time = pinned_time;
        Ok(schedule)
    }

    /// Find the first bookable (date, time, staff) at or after the target
    /// date, scanning day by day across the lookahead window.
    async fn schedule_sequence(
        &self,
        service: &ServiceSpec,
        postcode: &str,
        target: NaiveDate,
        preferred_staff: Option<Uuid>,
        preferred_time: Option<NaiveTime>,
    ) -> Result<Option<(NaiveDate, NaiveTime, Uuid)>, EngineError> {
        let staff = self.matcher.match_staff(postcode, Some(service.id)).await?;
        if staff.is_empty() {
            return Ok(None);
        }

        for offset in 0..self.lookahead_days {
            let Some(date) = target.checked_add_days(Days::new(offset as u64)) else {
                break;
            };
            let slots = self.availability.slots_for_date(service, date, &staff, None).await?;
            if let Some((time, staff_id)) = pick_slot(&slots, preferred_staff, preferred_time) {
                return Ok(Some((date, time, staff_id)));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(time: NaiveTime, staff_ids: Vec<Uuid>) -> SlotResult {
        let available = !staff_ids.is_empty();
        SlotResult {
            time,
            available,
            staff_ids,
            reason: if available { None } else { Some("booked or unavailable".to_string()) },
        }
    }

    #[test]
    fn weekly_month_yields_four_dates() {
        let dates = target_dates(d(2025, 1, 1), Frequency::Weekly, 1);
        assert_eq!(dates, vec![d(2025, 1, 1), d(2025, 1, 8), d(2025, 1, 15), d(2025, 1, 22)]);
    }

    #[test]
    fn biweekly_month_yields_two_dates() {
        let dates = target_dates(d(2025, 1, 1), Frequency::Biweekly, 1);
        assert_eq!(dates, vec![d(2025, 1, 1), d(2025, 1, 15)]);
    }

    #[test]
    fn monthly_quarter_yields_three_dates() {
        let dates = target_dates(d(2025, 1, 1), Frequency::Monthly, 3);
        assert_eq!(dates, vec![d(2025, 1, 1), d(2025, 2, 1), d(2025, 3, 1)]);
    }

    #[test]
    fn monthly_from_month_end_clamps_and_drifts() {
        // Jan 31 steps to Feb 28; later steps stay on the 28th.
        let dates = target_dates(d(2025, 1, 31), Frequency::Monthly, 3);
        assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 2, 28), d(2025, 3, 28)]);
    }

    #[test]
    fn zero_months_yields_nothing() {
        assert!(target_dates(d(2025, 1, 1), Frequency::Weekly, 0).is_empty());
    }

    #[test]
    fn pick_prefers_the_wanted_time_and_staff() {
        let staff_a = Uuid::new_v4();
        let staff_b = Uuid::new_v4();
        let slots = vec![
            slot(t(9, 0), vec![staff_a, staff_b]),
            slot(t(9, 30), vec![staff_a]),
        ];
        let picked = pick_slot(&slots, Some(staff_b), Some(t(9, 0)));
        assert_eq!(picked, Some((t(9, 0), staff_b)));
    }

    #[test]
    fn wanted_time_beats_wanted_staff() {
        let staff_a = Uuid::new_v4();
        let staff_b = Uuid::new_v4();
        let slots = vec![
            slot(t(9, 0), vec![staff_b]),
            slot(t(9, 30), vec![staff_a, staff_b]),
        ];
        // Staff A cannot take 09:00, so someone else does.
        let picked = pick_slot(&slots, Some(staff_a), Some(t(9, 0)));
        assert_eq!(picked, Some((t(9, 0), staff_b)));
    }

    #[test]
    fn unavailable_wanted_time_falls_back_to_wanted_staff() {
        let staff_a = Uuid::new_v4();
        let staff_b = Uuid::new_v4();
        let slots = vec![
            slot(t(9, 0), vec![]),
            slot(t(9, 30), vec![staff_b]),
            slot(t(10, 0), vec![staff_a]),
        ];
        let picked = pick_slot(&slots, Some(staff_a), Some(t(9, 0)));
        assert_eq!(picked, Some((t(10, 0), staff_a)));
    }

    #[test]
    fn no_preferences_takes_the_earliest_open_slot() {
        let staff_a = Uuid::new_v4();
        let slots = vec![slot(t(9, 0), vec![]), slot(t(11, 30), vec![staff_a])];
        assert_eq!(pick_slot(&slots, None, None), Some((t(11, 30), staff_a)));
    }

    #[test]
    fn fully_booked_grid_picks_nothing() {
        let slots = vec![slot(t(9, 0), vec![]), slot(t(9, 30), vec![])];
        assert_eq!(pick_slot(&slots, None, None), None);
    }
}
