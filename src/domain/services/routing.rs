use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{Instrument, info_span, warn};

use crate::domain::models::geo::Coordinates;
use crate::domain::models::route::{OptimizedRoute, RouteLeg, RouteStop, TravelTimeMatrix};
use crate::domain::ports::TravelTimeProvider;
use crate::error::EngineError;

/// Matrix providers degrade sharply past this; larger runs must be split
/// upstream before they reach the planner.
pub const MAX_ROUTE_STOPS: usize = 25;

/// Greedy nearest-neighbour ordering over a duration matrix.
///
/// Unroutable pairs cost `u32::MAX`, which pushes them to the end of the
/// tour without ever dropping a stop.
pub fn optimize_route(
    stop_count: usize,
    start_index: usize,
    matrix: &TravelTimeMatrix,
) -> OptimizedRoute {
    if stop_count <= 1 {
        return identity_route(stop_count, start_index);
    }

    let mut visited = vec![false; stop_count];
    let mut order = Vec::with_capacity(stop_count);
    let mut legs = Vec::with_capacity(stop_count - 1);
    let mut total_seconds: u64 = 0;

    let mut current = start_index;
    visited[current] = true;
    order.push(current);

    while order.len() < stop_count {
        let mut best: Option<(usize, u32)> = None;
        for candidate in 0..stop_count {
            if visited[candidate] {
                continue;
            }
            let seconds = matrix.seconds(current, candidate).unwrap_or(u32::MAX);
            // Strict comparison keeps the first-encountered index on ties.
            if best.is_none_or(|(_, s)| seconds < s) {
                best = Some((candidate, seconds));
            }
        }
        let Some((next, seconds)) = best else {
            break;
        };
        visited[next] = true;
        legs.push(RouteLeg { from: current, to: next, seconds });
        total_seconds += seconds as u64;
        order.push(next);
        current = next;
    }

    OptimizedRoute { order, legs, total_seconds }
}

/// Given stop order with zero-duration legs, used whenever no usable
/// matrix exists.
pub fn identity_route(stop_count: usize, start_index: usize) -> OptimizedRoute {
    let mut order = Vec::with_capacity(stop_count);
    if start_index < stop_count {
        order.push(start_index);
    }
    order.extend((0..stop_count).filter(|&i| i != start_index));

    let legs = order
        .windows(2)
        .map(|pair| RouteLeg { from: pair[0], to: pair[1], seconds: 0 })
        .collect();

    OptimizedRoute { order, legs, total_seconds: 0 }
}

#[derive(Clone)]
pub struct RoutePlanner {
    travel: Arc<dyn TravelTimeProvider>,
    provider_timeout: Duration,
}

impl RoutePlanner {
    pub fn new(travel: Arc<dyn TravelTimeProvider>, provider_timeout: Duration) -> Self {
        Self { travel, provider_timeout }
    }

    /// Order a day's stops by driving time, starting from `start_index`.
    ///
    /// Provider failures and mismatched matrices degrade to the given order
    /// rather than failing the call.
    pub async fn plan_route(
        &self,
        stops: &[RouteStop],
        start_index: usize,
    ) -> Result<OptimizedRoute, EngineError> {
        if stops.len() > MAX_ROUTE_STOPS {
            return Err(EngineError::Validation(format!(
                "route optimization is capped at {} stops, got {}",
                MAX_ROUTE_STOPS,
                stops.len()
            )));
        }
        if !stops.is_empty() && start_index >= stops.len() {
            return Err(EngineError::Validation(format!(
                "start index {} is out of range for {} stops",
                start_index,
                stops.len()
            )));
        }
        if stops.len() <= 1 {
            return Ok(identity_route(stops.len(), start_index));
        }

        let span = info_span!("plan_route", stops = stops.len(), start_index);
        self.plan_inner(stops, start_index).instrument(span).await
    }

    async fn plan_inner(
        &self,
        stops: &[RouteStop],
        start_index: usize,
    ) -> Result<OptimizedRoute, EngineError> {
        let points: Vec<Coordinates> = stops.iter().map(|s| s.location).collect();
        let matrix = match timeout(self.provider_timeout, self.travel.travel_matrix(&points)).await
        {
            Ok(Ok(matrix)) => matrix,
            Ok(Err(err)) => {
                warn!("Travel matrix lookup failed: {}", err);
                None
            }
            Err(_) => {
                warn!("Travel matrix lookup timed out");
                None
            }
        };

        match matrix {
            Some(m) if m.len() == stops.len() => {
                Ok(optimize_route(stops.len(), start_index, &m))
            }
            Some(m) => {
                warn!(
                    "Travel matrix has {} rows for {} stops, keeping given order",
                    m.len(),
                    stops.len()
                );
                Ok(identity_route(stops.len(), start_index))
            }
            None => Ok(identity_route(stops.len(), start_index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<u32>>) -> TravelTimeMatrix {
        TravelTimeMatrix::new(rows).unwrap()
    }

    #[test]
    fn greedy_follows_nearest_neighbour() {
        let m = matrix(vec![
            vec![0, 300, 100, 900],
            vec![300, 0, 250, 150],
            vec![100, 240, 0, 400],
            vec![900, 150, 400, 0],
        ]);
        let route = optimize_route(4, 0, &m);
        assert_eq!(route.order, vec![0, 2, 1, 3]);
        assert_eq!(route.total_seconds, 490);
        assert_eq!(
            route.legs,
            vec![
                RouteLeg { from: 0, to: 2, seconds: 100 },
                RouteLeg { from: 2, to: 1, seconds: 240 },
                RouteLeg { from: 1, to: 3, seconds: 150 },
            ]
        );
    }

    #[test]
    fn ties_resolve_to_the_first_candidate() {
        let m = matrix(vec![
            vec![0, 100, 100],
            vec![100, 0, 50],
            vec![100, 50, 0],
        ]);
        let route = optimize_route(3, 0, &m);
        assert_eq!(route.order, vec![0, 1, 2]);
        assert_eq!(route.total_seconds, 150);
    }

    #[test]
    fn starting_mid_list_visits_everything_once() {
        let m = matrix(vec![
            vec![0, 60, 60],
            vec![60, 0, 30],
            vec![10, 30, 0],
        ]);
        let route = optimize_route(3, 2, &m);
        assert_eq!(route.order.len(), 3);
        assert_eq!(route.order[0], 2);
        let mut sorted = route.order.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn identity_route_keeps_given_order_with_zero_legs() {
        let route = identity_route(4, 0);
        assert_eq!(route.order, vec![0, 1, 2, 3]);
        assert_eq!(route.total_seconds, 0);
        assert_eq!(route.legs.len(), 3);
        assert!(route.legs.iter().all(|leg| leg.seconds == 0));
    }

    #[test]
    fn identity_route_rotates_the_start_to_the_front() {
        let route = identity_route(4, 2);
        assert_eq!(route.order, vec![2, 0, 1, 3]);
    }

    #[test]
    fn single_stop_has_no_legs() {
        let route = identity_route(1, 0);
        assert_eq!(route.order, vec![0]);
        assert!(route.legs.is_empty());
        assert_eq!(route.total_seconds, 0);
    }
}
