mod common;

use booking_engine::domain::services::cancellation;
use chrono::{Duration, Utc};
use common::TestEngine;

#[tokio::test]
async fn test_appointment_outside_the_window_can_be_cancelled() {
    let app = TestEngine::new().await;

    let start = Utc::now() + Duration::hours(25);
    let decision = app.engine.evaluate_cancellation(start);

    assert!(decision.can_cancel);
    assert!(decision.can_reschedule);
}

#[tokio::test]
async fn test_appointment_inside_the_window_is_locked() {
    let app = TestEngine::new().await;

    let start = Utc::now() + Duration::hours(23);
    let decision = app.engine.evaluate_cancellation(start);

    assert!(!decision.can_cancel);
    assert!(!decision.can_reschedule);
}

#[tokio::test]
async fn test_deadline_sits_one_policy_window_before_the_start() {
    let app = TestEngine::new().await;

    let start = Utc::now() + Duration::days(7);
    let decision = app.engine.evaluate_cancellation(start);

    assert_eq!(decision.deadline, start - Duration::hours(24));
}

#[tokio::test]
async fn test_both_flags_always_agree() {
    let app = TestEngine::new().await;

    for hours in [1, 12, 23, 24, 25, 48, 96] {
        let decision = app.engine.evaluate_cancellation(Utc::now() + Duration::hours(hours));
        assert_eq!(decision.can_cancel, decision.can_reschedule);
    }
}

#[test]
fn test_policy_window_is_configurable() {
    let start = Utc::now() + Duration::hours(36);

    let strict = cancellation::evaluate(start, 48);
    assert!(!strict.can_cancel);

    let lenient = cancellation::evaluate(start, 12);
    assert!(lenient.can_cancel);
    assert_eq!(lenient.deadline, start - Duration::hours(12));
}

#[test]
fn test_past_appointments_are_locked() {
    let start = Utc::now() - Duration::hours(2);
    let decision = cancellation::evaluate(start, 24);

    assert!(!decision.can_cancel);
    assert!(!decision.can_reschedule);
}
