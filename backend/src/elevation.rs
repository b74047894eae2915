use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::Coordinate;

/// Endpoint height difference is scaled up to approximate the climbing done
/// in between.
pub const ELEVATION_GAIN_FACTOR: f64 = 1.5;

const PROVIDER: &str = "elevation service";

#[async_trait]
pub trait ElevationSource: Send + Sync {
    /// Estimated elevation gain in metres between two route endpoints.
    async fn elevation_gain_m(&self, start: Coordinate, end: Coordinate)
        -> Result<f64, ProviderError>;
}

/// Estimate gain from the elevations sampled at start and end.
///
/// Returns `None` unless exactly two finite samples are given.
pub fn gain_from_endpoint_elevations(elevations: &[f64]) -> Option<f64> {
    match elevations {
        [start, end] if start.is_finite() && end.is_finite() => {
            Some((end - start).abs() * ELEVATION_GAIN_FACTOR)
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    elevation: Vec<f64>,
}

/// Open-Meteo elevation API client.
pub struct OpenMeteoElevation {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoElevation {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Batch lookup, one elevation per coordinate in input order.
    pub async fn fetch_elevations(&self, coords: &[Coordinate]) -> Result<Vec<f64>, ProviderError> {
        if coords.is_empty() {
            return Ok(Vec::new());
        }

        let latitudes = join(coords.iter().map(|c| c.lat));
        let longitudes = join(coords.iter().map(|c| c.lon));

        let response = self
            .client
            .get(format!("{}/v1/elevation", self.base_url))
            .query(&[("latitude", latitudes), ("longitude", longitudes)])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body: ElevationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if body.elevation.len() != coords.len() {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!(
                    "expected {} elevations, got {}",
                    coords.len(),
                    body.elevation.len()
                ),
            ));
        }

        tracing::debug!("Fetched {} elevations from Open-Meteo", body.elevation.len());
        Ok(body.elevation)
    }
}

#[async_trait]
impl ElevationSource for OpenMeteoElevation {
    async fn elevation_gain_m(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<f64, ProviderError> {
        let elevations = self.fetch_elevations(&[start, end]).await?;
        gain_from_endpoint_elevations(&elevations)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "non-finite elevation sample"))
    }
}

fn join(values: impl Iterator<Item = f64>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
