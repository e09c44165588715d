use chrono::{DateTime, Duration, Utc};

use crate::domain::models::cancellation::CancellationDecision;

/// Check an appointment against the cancellation policy at the current time.
///
/// Flags are recomputed on every call; completed or cancelled appointments
/// are excluded by the caller before evaluation.
pub fn evaluate(appointment_start: DateTime<Utc>, policy_hours: i64) -> CancellationDecision {
    evaluate_at(appointment_start, policy_hours, Utc::now())
}

pub fn evaluate_at(
    appointment_start: DateTime<Utc>,
    policy_hours: i64,
    now: DateTime<Utc>,
) -> CancellationDecision {
    let deadline = appointment_start - Duration::hours(policy_hours);
    let permitted = now < deadline;
    CancellationDecision {
        can_cancel: permitted,
        can_reschedule: permitted,
        deadline,
    }
}
