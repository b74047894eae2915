mod support;

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use greenroute::{AppState, create_router, database::TripStore, trip_handlers::USER_ID_HEADER};
use greenroute_shared::{ApiError, TripPlanResponse};
use hyper::StatusCode;
use serde_json::Value;
use support::{Harness, RouteBehaviour, payload_json, route};
use tower::ServiceExt;

fn test_app(harness: &Harness) -> axum::Router {
    let store: Arc<dyn TripStore> = harness.store.clone();
    let state = AppState {
        planner: Arc::new(harness.planner()),
        store,
    };
    create_router(state)
}

fn plan_request(user_id: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/trips/plan")
        .header("content-type", "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header(USER_ID_HEADER, user_id);
    }
    builder.body(Body::from(body)).unwrap()
}

fn get_request(uri: &str, user_id: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(USER_ID_HEADER, user_id)
        .body(Body::empty())
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_and_welcome() {
    let app = test_app(&Harness::new(vec![route(250.0, 330.0)]));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn plan_endpoint_returns_camel_case_summary() {
    let harness = Harness::new(vec![route(250.0, 330.0), route(240.0, 360.0)]);
    let app = test_app(&harness);

    let response = app
        .oneshot(plan_request(Some("5"), payload_json(80.0).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = body_json(response).await;
    assert_eq!(body["routeSummary"]["distance"], "240.0 km");
    assert_eq!(body["routeSummary"]["energyConsumption"], "28.80 kWh");
    assert_eq!(body["routeSummary"]["chargingStops"], "0");
    assert_eq!(body["routeSummary"]["finalBattery"], "32.0%");
    assert_eq!(body["chargingStations"], serde_json::json!([]));
    assert_eq!(body["routePolyline"][0][0], 12.9716);
    assert!(body["tripId"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn plan_requires_user_header() {
    let harness = Harness::new(vec![route(250.0, 330.0)]);
    let app = test_app(&harness);

    let response = app
        .clone()
        .oneshot(plan_request(None, payload_json(80.0).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(plan_request(Some("not-a-number"), payload_json(80.0).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(harness.external_calls(), 0);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let harness = Harness::new(vec![route(250.0, 330.0)]);
    let app = test_app(&harness);

    let response = app
        .clone()
        .oneshot(plan_request(Some("5"), "{\"start_location\":".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ApiError = body_json(response).await;
    assert!(error.message.starts_with("Missing required fields"));

    let response = app
        .oneshot(plan_request(Some("5"), "{}".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ApiError = body_json(response).await;
    assert!(error.message.contains("start_location"));
    assert_eq!(harness.external_calls(), 0);
}

#[tokio::test]
async fn upstream_failures_map_to_statuses() {
    let harness = Harness::new(Vec::new()).with_route_behaviour(RouteBehaviour::Unavailable);
    let response = test_app(&harness)
        .oneshot(plan_request(Some("5"), payload_json(80.0).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let harness = Harness::new(Vec::new()).with_route_behaviour(RouteBehaviour::NoRoutes);
    let response = test_app(&harness)
        .oneshot(plan_request(Some("5"), payload_json(80.0).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ApiError = body_json(response).await;
    assert_eq!(error.message, "No route found for the given locations.");
}

#[tokio::test]
async fn no_viable_route_is_server_error() {
    let harness = Harness::new(vec![route(250.0, 330.0)]).with_predictor(|_| {
        Err(greenroute::error::ProviderError::malformed(
            "energy predictor",
            "missing predicted_energy_kwh",
        ))
    });
    let response = test_app(&harness)
        .oneshot(plan_request(Some("5"), payload_json(80.0).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn planned_trip_is_listed_and_scoped() {
    let harness = Harness::new(vec![route(250.0, 330.0)]);
    let app = test_app(&harness);

    let response = app
        .clone()
        .oneshot(plan_request(Some("5"), payload_json(80.0).to_string()))
        .await
        .unwrap();
    let plan: TripPlanResponse = body_json(response).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/trips/{}", plan.trip_id), "5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let trip: Value = body_json(response).await;
    assert_eq!(trip["id"], plan.trip_id);
    assert_eq!(trip["userId"], 5);
    assert_eq!(trip["startLatitude"], 12.9716);

    let response = app
        .clone()
        .oneshot(get_request("/api/trips", "5"))
        .await
        .unwrap();
    let trips: Vec<Value> = body_json(response).await;
    assert_eq!(trips.len(), 1);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/trips/{}", plan.trip_id), "6"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_request("/api/trips", "6")).await.unwrap();
    let trips: Vec<Value> = body_json(response).await;
    assert!(trips.is_empty());
}

#[tokio::test]
async fn trips_are_listed_newest_first() {
    let harness = Harness::new(vec![route(250.0, 330.0)]);
    let app = test_app(&harness);

    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(plan_request(Some("5"), payload_json(80.0).to_string()))
            .await
            .unwrap();
        let plan: TripPlanResponse = body_json(response).await;
        ids.push(plan.trip_id);
    }

    let response = app.oneshot(get_request("/api/trips", "5")).await.unwrap();
    let trips: Vec<Value> = body_json(response).await;
    let listed: Vec<i64> = trips.iter().map(|t| t["id"].as_i64().unwrap()).collect();
    ids.reverse();
    assert_eq!(listed, ids.into_iter().map(i64::from).collect::<Vec<_>>());
}
