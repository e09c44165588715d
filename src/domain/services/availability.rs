use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::booking::ExistingBooking;
use crate::domain::models::schedule::StaffScheduleEntry;
use crate::domain::models::service::ServiceSpec;
use crate::domain::models::slot::SlotResult;
use crate::domain::ports::{BookingReader, ScheduleReader};
use crate::error::EngineError;

const TOTAL_MINUTES: usize = 1440;

/// Grid step between offered start times.
pub const SLOT_INTERVAL_MIN: usize = 30;

const UNAVAILABLE_REASON: &str = "booked or unavailable";

fn minute_index(t: NaiveTime) -> usize {
    (t.hour() * 60 + t.minute()) as usize
}

/// End-of-window index. 23:59 is treated as end-of-day so a schedule
/// closing at 23:59 still admits a slot that runs to midnight.
fn end_minute_index(t: NaiveTime) -> usize {
    let idx = minute_index(t);
    if idx == 1439 { 1440 } else { idx }
}

/// Resolve a local wall-clock time to a UTC instant.
///
/// During a DST overlap the earlier instant wins; for a wall time that does
/// not exist the naive value is read as UTC so callers always get an instant.
pub(crate) fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(time)))
}

pub(crate) fn local_day_start_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_instant(date, NaiveTime::MIN, tz)
}

/// Minutes between an instant's local wall-clock reading and the given
/// day's midnight. Negative before the day, 1440 or beyond after it.
/// Bookings index the occupancy grid through this so they share the slot
/// cursor's frame even when a DST shift detaches wall time from elapsed
/// time.
fn wall_minutes(instant: DateTime<Utc>, date: NaiveDate, tz: Tz) -> i64 {
    let local = instant.with_timezone(&tz);
    let day_offset = (local.date_naive() - date).num_days();
    day_offset * TOTAL_MINUTES as i64 + minute_index(local.time()) as i64
}

fn staff_can_serve(
    entry: &StaffScheduleEntry,
    counts: &[u8; TOTAL_MINUTES],
    slot_start: usize,
    slot_end: usize,
    capacity: u32,
) -> bool {
    if slot_start < minute_index(entry.start) || slot_end > end_minute_index(entry.end) {
        return false;
    }
    let on_break = entry.breaks.iter().any(|b| {
        slot_start < end_minute_index(b.end) && slot_end > minute_index(b.start)
    });
    if on_break {
        return false;
    }
    counts[slot_start..slot_end.min(TOTAL_MINUTES)]
        .iter()
        .all(|&c| (c as u32) < capacity)
}

/// Build the 30-minute slot grid for one service on one date.
///
/// The grid spans the earliest schedule start to the latest schedule end
/// across the given entries; a slot is available when at least one staff
/// member can take it at the service's effective duration.
pub fn calculate_slots(
    service: &ServiceSpec,
    date: NaiveDate,
    schedules: &[StaffScheduleEntry],
    existing_bookings: &[ExistingBooking],
    fixed_staff: Option<Uuid>,
    tz: Tz,
) -> Vec<SlotResult> {
    if service.duration_min == 0 {
        return Vec::new();
    }
    let effective_min = service.effective_duration_min() as usize;
    let day_of_week = date.weekday().num_days_from_sunday() as u8;

    let entries: Vec<&StaffScheduleEntry> = schedules
        .iter()
        .filter(|e| e.day_of_week == day_of_week)
        .filter(|e| fixed_staff.is_none_or(|id| e.staff_id == id))
        .filter(|e| match e.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!("Skipping malformed schedule for staff {}: {}", e.staff_id, err);
                false
            }
        })
        .collect();

    if entries.is_empty() {
        return Vec::new();
    }

    // Per-staff occupancy, one count per minute of the local day. Blocking
    // bookings are extended by the service padding so the next offerable
    // start clears the buffer as well as the appointment itself.
    let mut occupancy: HashMap<Uuid, [u8; TOTAL_MINUTES]> = entries
        .iter()
        .map(|e| (e.staff_id, [0u8; TOTAL_MINUTES]))
        .collect();

    let padding = Duration::minutes(service.padding_min as i64);

    for booking in existing_bookings {
        if !booking.status.blocks_slots() {
            continue;
        }
        let Some(counts) = occupancy.get_mut(&booking.staff_id) else {
            continue;
        };
        let padded_end = booking.end + padding;
        let start_wall = wall_minutes(booking.start, date, tz);
        let mut end_wall = wall_minutes(padded_end, date, tz);
        // A booking crossing the autumn fold labels its end behind its
        // start; fall back to its real length for the span.
        if end_wall < start_wall {
            end_wall = start_wall + (padded_end - booking.start).num_minutes();
        }

        let s_idx = start_wall.clamp(0, TOTAL_MINUTES as i64) as usize;
        let e_idx = end_wall.clamp(0, TOTAL_MINUTES as i64) as usize;
        for count in &mut counts[s_idx..e_idx] {
            *count = count.saturating_add(1);
        }
    }

    let Some(win_start) = entries.iter().map(|e| minute_index(e.start)).min() else {
        return Vec::new();
    };
    let win_end = entries
        .iter()
        .map(|e| end_minute_index(e.end))
        .max()
        .unwrap_or(win_start);

    let mut slots = Vec::new();
    let mut cursor = win_start;
    while cursor + effective_min <= win_end {
        let hour = (cursor / 60) as u32;
        let minute = (cursor % 60) as u32;

        if let Some(nt) = NaiveTime::from_hms_opt(hour, minute, 0)
            && tz.from_local_datetime(&date.and_time(nt)).earliest().is_some()
        {
            let slot_end = cursor + effective_min;
            let mut staff_ids: Vec<Uuid> = entries
                .iter()
                .filter(|e| {
                    occupancy
                        .get(&e.staff_id)
                        .is_some_and(|counts| {
                            staff_can_serve(e, counts, cursor, slot_end, service.capacity)
                        })
                })
                .map(|e| e.staff_id)
                .collect();
            staff_ids.sort();
            staff_ids.dedup();

            let available = !staff_ids.is_empty();
            slots.push(SlotResult {
                time: nt,
                available,
                staff_ids,
                reason: if available {
                    None
                } else {
                    Some(UNAVAILABLE_REASON.to_string())
                },
            });
        }
        cursor += SLOT_INTERVAL_MIN;
    }

    slots
}

#[derive(Clone)]
pub struct AvailabilityService {
    schedules: Arc<dyn ScheduleReader>,
    bookings: Arc<dyn BookingReader>,
    timezone: Tz,
}

impl AvailabilityService {
    pub fn new(
        schedules: Arc<dyn ScheduleReader>,
        bookings: Arc<dyn BookingReader>,
        timezone: Tz,
    ) -> Self {
        Self { schedules, bookings, timezone }
    }

    /// Load schedules and bookings for the candidate staff, then delegate to
    /// [`calculate_slots`]. A fixed staff member narrows the candidate set to
    /// just that member.
    pub async fn slots_for_date(
        &self,
        service: &ServiceSpec,
        date: NaiveDate,
        candidate_staff: &[Uuid],
        fixed_staff: Option<Uuid>,
    ) -> Result<Vec<SlotResult>, EngineError> {
        let staff: Vec<Uuid> = match fixed_staff {
            Some(id) => vec![id],
            None => candidate_staff.to_vec(),
        };
        if staff.is_empty() {
            return Ok(Vec::new());
        }

        let day_of_week = date.weekday().num_days_from_sunday() as u8;
        let mut entries = Vec::new();
        for staff_id in &staff {
            if let Some(entry) = self.schedules.weekly_schedule(*staff_id, day_of_week).await? {
                entries.push(entry);
            }
        }
        if entries.is_empty() {
            debug!("No working schedule among {} staff on {}", staff.len(), date);
            return Ok(Vec::new());
        }

        // Widen the query backwards by the padding so a booking ending just
        // before the day still blocks the first minutes through its buffer.
        // The window runs local midnight to local midnight, which is not
        // 24 hours on a clock-change day.
        let day_start = local_day_start_utc(date, self.timezone);
        let day_end = match date.succ_opt() {
            Some(next) => local_day_start_utc(next, self.timezone),
            None => day_start + Duration::minutes(TOTAL_MINUTES as i64),
        };
        let padding = Duration::minutes(service.padding_min as i64);
        let bookings = self
            .bookings
            .bookings_in_range(&staff, day_start - padding, day_end)
            .await?;

        Ok(calculate_slots(service, date, &entries, &bookings, fixed_staff, self.timezone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_index_bumps_last_minute_to_midnight() {
        let t = NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        assert_eq!(end_minute_index(t), 1440);
        let t = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        assert_eq!(end_minute_index(t), 1020);
    }

    #[test]
    fn local_instant_handles_spring_forward_gap() {
        let tz: Tz = "Europe/London".parse().unwrap();
        // 2025-03-30 01:30 does not exist in London; the fallback still
        // produces an instant rather than panicking.
        let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        let time = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let instant = local_instant(date, time, tz);
        assert_eq!(instant.date_naive(), date);
    }

    #[test]
    fn bookings_index_by_wall_clock_across_the_spring_gap() {
        let tz: Tz = "Europe/London".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();

        // Before the jump the wall clock and elapsed time agree.
        let early: DateTime<Utc> = "2025-03-30T00:30:00Z".parse().unwrap();
        assert_eq!(wall_minutes(early, date, tz), 30);

        // 09:00Z reads 10:00 on the wall once BST has started, one hour
        // ahead of the nine hours elapsed since midnight.
        let later: DateTime<Utc> = "2025-03-30T09:00:00Z".parse().unwrap();
        assert_eq!(wall_minutes(later, date, tz), 600);

        // The previous evening lands below zero and the next day past 1440.
        let before: DateTime<Utc> = "2025-03-29T23:00:00Z".parse().unwrap();
        assert_eq!(wall_minutes(before, date, tz), -60);
        let after: DateTime<Utc> = "2025-03-31T00:30:00Z".parse().unwrap();
        assert_eq!(wall_minutes(after, date, tz), 1440 + 90);
    }
}
