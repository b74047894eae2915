// Handlers for the trip API endpoints
// The caller's identity comes from the gateway-set `x-user-id` header.

use axum::{
    Json,
    extract::{FromRequestParts, Path, State, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
};
use greenroute_shared::{ApiError, TripPlanResponse, TripRequestPayload};

use crate::AppState;
use crate::database::{DatabaseError, Trip};
use crate::error::PlanError;
use crate::routing::UpstreamRouteError;

pub const USER_ID_HEADER: &str = "x-user-id";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Numeric user id forwarded by the authenticating gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i32);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i32>().ok())
            .map(AuthenticatedUser)
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Not authenticated"))
    }
}

/// POST /api/trips/plan - Plan and record a trip
pub async fn plan_trip(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    payload: Result<Json<TripRequestPayload>, JsonRejection>,
) -> ApiResult<TripPlanResponse> {
    let Json(payload) = payload.map_err(|rejection| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Missing required fields: {}", rejection.body_text()),
        )
    })?;

    state
        .planner
        .plan(user_id, payload)
        .await
        .map(|plan| Json(plan.into_response()))
        .map_err(plan_error_to_api_error)
}

/// GET /api/trips - The caller's trips, newest first
pub async fn list_trips(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> ApiResult<Vec<Trip>> {
    state
        .store
        .list_trips(user_id)
        .await
        .map(Json)
        .map_err(db_error_to_api_error)
}

/// GET /api/trips/:id - One of the caller's trips
pub async fn get_trip(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<Trip> {
    state
        .store
        .get_trip(user_id, id)
        .await
        .map(Json)
        .map_err(db_error_to_api_error)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            message: message.into(),
        }),
    )
}

/// Convert PlanError to API error response
pub fn plan_error_to_api_error(err: PlanError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        PlanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        PlanError::UpstreamRoute(UpstreamRouteError::NoRoutes) => StatusCode::NOT_FOUND,
        PlanError::UpstreamRoute(UpstreamRouteError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        PlanError::NoViableRoute { .. } | PlanError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    api_error(status, err.to_string())
}

/// Convert DatabaseError to API error response
pub fn db_error_to_api_error(err: DatabaseError) -> (StatusCode, Json<ApiError>) {
    match err {
        DatabaseError::NotFound(id) => {
            api_error(StatusCode::NOT_FOUND, format!("Trip with ID {} not found", id))
        }
        DatabaseError::ConfigError(msg) => api_error(StatusCode::INTERNAL_SERVER_ERROR, msg),
        DatabaseError::ConnectionError(e) => {
            tracing::error!("Trip store unavailable: {}", e);
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Database connection error: {}", e),
            )
        }
    }
}
