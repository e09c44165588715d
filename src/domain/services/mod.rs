pub mod availability;
pub mod cancellation;
pub mod distance;
pub mod recurrence;
pub mod routing;
