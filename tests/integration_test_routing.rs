mod common;

use booking_engine::domain::models::geo::Coordinates;
use booking_engine::domain::models::route::RouteStop;
use booking_engine::error::EngineError;
use common::TestEngine;

fn stop(label: &str, latitude: f64, longitude: f64) -> RouteStop {
    RouteStop {
        label: label.to_string(),
        location: Coordinates { latitude, longitude },
        address: None,
    }
}

fn four_stops() -> Vec<RouteStop> {
    vec![
        stop("depot", 51.50, -0.12),
        stop("first", 51.52, -0.10),
        stop("second", 51.51, -0.14),
        stop("third", 51.55, -0.08),
    ]
}

#[tokio::test]
async fn test_route_follows_the_duration_matrix() {
    let app = TestEngine::new().await;
    app.travel
        .set_matrix(vec![
            vec![0, 300, 100, 900],
            vec![300, 0, 250, 150],
            vec![100, 240, 0, 400],
            vec![900, 150, 400, 0],
        ])
        .await
        .unwrap();

    let route = app.engine.routing.plan_route(&four_stops(), 0).await.unwrap();

    assert_eq!(route.order, vec![0, 2, 1, 3]);
    assert_eq!(route.total_seconds, 490);
    assert_eq!(route.legs.len(), 3);
    assert_eq!(route.legs[0].seconds, 100);
    assert_eq!(route.legs[1].seconds, 240);
    assert_eq!(route.legs[2].seconds, 150);
}

#[tokio::test]
async fn test_route_can_start_from_any_stop() {
    let app = TestEngine::new().await;
    app.travel
        .set_matrix(vec![
            vec![0, 300, 100, 900],
            vec![300, 0, 250, 150],
            vec![100, 240, 0, 400],
            vec![900, 150, 400, 0],
        ])
        .await
        .unwrap();

    let route = app.engine.routing.plan_route(&four_stops(), 3).await.unwrap();

    assert_eq!(route.order[0], 3);
    let mut visited = route.order.clone();
    visited.sort();
    assert_eq!(visited, vec![0, 1, 2, 3]);
    assert_eq!(route.legs.len(), 3);
}

#[tokio::test]
async fn test_missing_matrix_keeps_the_given_order() {
    let app = TestEngine::new().await;

    let route = app.engine.routing.plan_route(&four_stops(), 0).await.unwrap();

    assert_eq!(route.order, vec![0, 1, 2, 3]);
    assert_eq!(route.total_seconds, 0);
    assert!(route.legs.iter().all(|leg| leg.seconds == 0));
}

#[tokio::test]
async fn test_wrong_sized_matrix_keeps_the_given_order() {
    let app = TestEngine::new().await;
    app.travel
        .set_matrix(vec![vec![0, 60], vec![60, 0]])
        .await
        .unwrap();

    let stops = vec![
        stop("a", 51.50, -0.12),
        stop("b", 51.52, -0.10),
        stop("c", 51.51, -0.14),
    ];
    let route = app.engine.routing.plan_route(&stops, 0).await.unwrap();

    assert_eq!(route.order, vec![0, 1, 2]);
    assert_eq!(route.total_seconds, 0);
}

#[tokio::test]
async fn test_single_stop_needs_no_matrix() {
    let app = TestEngine::new().await;

    let stops = vec![stop("only", 51.50, -0.12)];
    let route = app.engine.routing.plan_route(&stops, 0).await.unwrap();

    assert_eq!(route.order, vec![0]);
    assert!(route.legs.is_empty());
    assert_eq!(route.total_seconds, 0);
}

#[tokio::test]
async fn test_empty_stop_list_is_an_empty_route() {
    let app = TestEngine::new().await;

    let route = app.engine.routing.plan_route(&[], 0).await.unwrap();

    assert!(route.order.is_empty());
    assert!(route.legs.is_empty());
}

#[tokio::test]
async fn test_oversized_runs_are_rejected() {
    let app = TestEngine::new().await;

    let stops: Vec<RouteStop> = (0..26)
        .map(|i| stop(&format!("stop-{}", i), 51.5 + i as f64 * 0.01, -0.12))
        .collect();
    let result = app.engine.routing.plan_route(&stops, 0).await;

    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[tokio::test]
async fn test_start_index_must_point_at_a_stop() {
    let app = TestEngine::new().await;

    let result = app.engine.routing.plan_route(&four_stops(), 4).await;

    assert!(matches!(result, Err(EngineError::Validation(_))));
}
