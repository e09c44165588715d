use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of checking an appointment against the cancellation policy.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct CancellationDecision {
    pub can_cancel: bool,
    pub can_reschedule: bool,
    pub deadline: DateTime<Utc>,
}
