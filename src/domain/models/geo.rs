use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub coordinates: Coordinates,
    pub formatted_address: String,
    pub is_domestic: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AddressSuggestion {
    pub postcode: String,
    pub description: Option<String>,
}

/// Canonical postcode form: uppercase, no whitespace.
///
/// All cache keys and comparisons go through this so "sw1a 1aa" and
/// "SW1A1AA" resolve identically.
pub fn normalize_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
