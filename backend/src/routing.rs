use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::{Coordinate, RouteCandidate};

const EARTH_RADIUS_KM: f64 = 6_371.0;
const PROVIDER: &str = "route provider";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamRouteError {
    #[error("Failed to get route from provider: {0}")]
    Unavailable(#[from] ProviderError),
    #[error("No route found for the given locations.")]
    NoRoutes,
}

/// Source of candidate routes between two points.
///
/// # Contract
/// Implementations must:
/// - Return at least one candidate or fail with [`UpstreamRouteError`]
/// - Keep the provider's candidate order (first is the provider's preference)
/// - Hand out geometry in `(lat, lon)` order whatever the wire order was
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn candidates(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Vec<RouteCandidate>, UpstreamRouteError>;
}

/// Axis order of raw coordinate pairs on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// GeoJSON convention: `[lon, lat]`.
    LonLat,
    LatLon,
}

/// Convert raw pairs into canonical coordinates.
pub fn normalize_geometry(raw: &[[f64; 2]], order: AxisOrder) -> Vec<Coordinate> {
    raw.iter()
        .map(|&[a, b]| match order {
            AxisOrder::LonLat => Coordinate { lat: b, lon: a },
            AxisOrder::LatLon => Coordinate { lat: a, lon: b },
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    distance: Option<f64>,
    duration: f64,
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

/// Mapbox Directions API adapter (GeoJSON geometries, `[lon, lat]` pairs).
pub struct MapboxDirections {
    client: reqwest::Client,
    base_url: String,
    profile: String,
    access_token: Option<String>,
    alternatives: bool,
}

impl MapboxDirections {
    pub fn new(
        base_url: impl Into<String>,
        profile: impl Into<String>,
        access_token: Option<String>,
        alternatives: bool,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            profile: profile.into(),
            access_token,
            alternatives,
        })
    }

    fn url(&self, start: Coordinate, end: Coordinate) -> String {
        // Mapbox wants `lon,lat` pairs separated by `;`
        format!(
            "{}/directions/v5/mapbox/{}/{},{};{},{}",
            self.base_url, self.profile, start.lon, start.lat, end.lon, end.lat
        )
    }
}

#[async_trait]
impl RouteProvider for MapboxDirections {
    async fn candidates(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Vec<RouteCandidate>, UpstreamRouteError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(ProviderError::NotConfigured {
                provider: PROVIDER,
                missing: "MAPBOX_ACCESS_TOKEN",
            })?;

        let alternatives = if self.alternatives { "true" } else { "false" };
        let response = self
            .client
            .get(self.url(start, end))
            .query(&[
                ("alternatives", alternatives),
                ("geometries", "geojson"),
                ("overview", "full"),
                ("access_token", token),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Mapbox Directions answered HTTP {}", status);
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            }
            .into());
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        candidates_from_directions(body, AxisOrder::LonLat)
    }
}

fn candidates_from_directions(
    body: DirectionsResponse,
    order: AxisOrder,
) -> Result<Vec<RouteCandidate>, UpstreamRouteError> {
    if body.routes.is_empty() {
        tracing::warn!(
            "route provider returned no routes (code: {})",
            body.code.as_deref().unwrap_or("none")
        );
        return Err(UpstreamRouteError::NoRoutes);
    }

    let candidates: Vec<RouteCandidate> = body
        .routes
        .into_iter()
        .map(|route| {
            let geometry = normalize_geometry(&route.geometry.coordinates, order);
            let distance_m = route
                .distance
                .unwrap_or_else(|| approximate_distance_km(&geometry) * 1000.0);
            RouteCandidate {
                distance_m,
                duration_s: route.duration,
                geometry,
            }
        })
        .collect();

    tracing::debug!("route provider returned {} candidate(s)", candidates.len());
    Ok(candidates)
}

pub fn approximate_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
