use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a staff member is willing to travel. A staff member may hold
/// several areas; coverage is their union.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceArea {
    pub id: Uuid,
    pub staff_id: Uuid,
    /// None means the area applies to every service the staff member offers.
    pub service_id: Option<Uuid>,
    pub centre_postcode: String,
    pub radius_miles: f64,
}

impl ServiceArea {
    pub fn new(
        staff_id: Uuid,
        service_id: Option<Uuid>,
        centre_postcode: &str,
        radius_miles: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            service_id,
            centre_postcode: centre_postcode.to_string(),
            radius_miles,
        }
    }
}
