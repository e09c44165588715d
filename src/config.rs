use std::env;

use chrono_tz::Tz;
use tracing::warn;

const DEFAULT_GEOCODER_URL: &str = "https://api.postcodes.io";
const DEFAULT_TRAVEL_MATRIX_URL: &str = "https://router.project-osrm.org";
const DEFAULT_TIMEZONE: &str = "Europe/London";

#[derive(Clone)]
pub struct EngineConfig {
    pub geocoder_base_url: String,
    pub geocoder_api_key: Option<String>,
    pub travel_matrix_base_url: String,
    /// Applied to every external provider call; clamped to 5-15 seconds.
    pub provider_timeout_secs: u64,
    pub schedule_timezone: Tz,
    pub cancellation_policy_hours: i64,
    pub recurrence_lookahead_days: u32,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let tz_name = env::var("SCHEDULE_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
        let schedule_timezone: Tz = tz_name.parse().unwrap_or_else(|_| {
            warn!("Unknown SCHEDULE_TIMEZONE '{}', falling back to UTC", tz_name);
            chrono_tz::UTC
        });

        Self {
            geocoder_base_url: env::var("GEOCODER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
            geocoder_api_key: env::var("GEOCODER_API_KEY").ok(),
            travel_matrix_base_url: env::var("TRAVEL_MATRIX_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TRAVEL_MATRIX_URL.to_string()),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .expect("PROVIDER_TIMEOUT_SECS must be a number")
                .clamp(5, 15),
            schedule_timezone,
            cancellation_policy_hours: env::var("CANCELLATION_POLICY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("CANCELLATION_POLICY_HOURS must be a number"),
            recurrence_lookahead_days: env::var("RECURRENCE_LOOKAHEAD_DAYS")
                .unwrap_or_else(|_| "14".to_string())
                .parse()
                .expect("RECURRENCE_LOOKAHEAD_DAYS must be a number"),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geocoder_base_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_api_key: None,
            travel_matrix_base_url: DEFAULT_TRAVEL_MATRIX_URL.to_string(),
            provider_timeout_secs: 10,
            schedule_timezone: chrono_tz::Europe::London,
            cancellation_policy_hours: 24,
            recurrence_lookahead_days: 14,
        }
    }
}
