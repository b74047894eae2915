pub mod charging;
pub mod config;
pub mod database;
pub mod elevation;
pub mod energy;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod planner;
pub mod routing;
pub mod scoring;
pub mod trip_handlers;
pub mod validation;
pub mod weather;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::database::TripStore;
use crate::planner::TripPlanner;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
    pub store: Arc<dyn TripStore>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "GreenRoute trip planner" }))
        .route("/health", get(|| async { "ok" }))
        .route("/api/trips/plan", post(trip_handlers::plan_trip))
        .route("/api/trips", get(trip_handlers::list_trips))
        .route("/api/trips/:id", get(trip_handlers::get_trip))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
