use serde::{Deserialize, Serialize};

use crate::domain::models::geo::Coordinates;
use crate::error::EngineError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteStop {
    pub label: String,
    pub location: Coordinates,
    pub address: Option<String>,
}

/// One hop of an optimized route; indices refer to the caller's stop list.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RouteLeg {
    pub from: usize,
    pub to: usize,
    pub seconds: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OptimizedRoute {
    pub order: Vec<usize>,
    pub legs: Vec<RouteLeg>,
    pub total_seconds: u64,
}

/// Square matrix of pairwise driving durations in seconds.
///
/// Row is the origin, column the destination. Construction rejects ragged
/// input so lookups never have to bounds-check rows against columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelTimeMatrix {
    durations: Vec<Vec<u32>>,
}

impl TravelTimeMatrix {
    pub fn new(durations: Vec<Vec<u32>>) -> Result<Self, EngineError> {
        let n = durations.len();
        if durations.iter().any(|row| row.len() != n) {
            return Err(EngineError::Validation(format!(
                "travel matrix must be square, got {} rows",
                n
            )));
        }
        Ok(Self { durations })
    }

    pub fn seconds(&self, from: usize, to: usize) -> Option<u32> {
        self.durations.get(from)?.get(to).copied()
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}
