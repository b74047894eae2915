use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::models::{Environment, RouteCandidate, VehicleParams};

const PROVIDER: &str = "energy predictor";

/// Vehicle block of a prediction request, field names as the model expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleFeatures {
    pub battery_capacity_kwh: f64,
    pub vehicle_mass_kg: f64,
    pub drag_coeff: f64,
    pub frontal_area_m2: f64,
    pub rolling_resistance_coeff: f64,
}

impl From<&VehicleParams> for VehicleFeatures {
    fn from(vehicle: &VehicleParams) -> Self {
        Self {
            battery_capacity_kwh: vehicle.battery_capacity_kwh,
            vehicle_mass_kg: vehicle.mass_kg,
            drag_coeff: vehicle.drag_coeff,
            frontal_area_m2: vehicle.frontal_area_m2,
            rolling_resistance_coeff: vehicle.rolling_resistance_coeff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub avg_speed_kmph: f64,
    pub temperature_c: f64,
    pub vehicle: VehicleFeatures,
}

impl PredictionRequest {
    /// Build the model input for a candidate; `None` when the route has no
    /// positive duration to derive an average speed from.
    pub fn for_candidate(
        route: &RouteCandidate,
        environment: Environment,
        vehicle: &VehicleParams,
    ) -> Option<Self> {
        let avg_speed_kmph = route.avg_speed_kmph()?;
        Some(Self {
            distance_km: route.distance_km(),
            elevation_gain_m: environment.elevation_gain_m,
            avg_speed_kmph,
            temperature_c: environment.temperature_c,
            vehicle: VehicleFeatures::from(vehicle),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    predicted_energy_kwh: f64,
}

#[async_trait]
pub trait EnergyPredictor: Send + Sync {
    /// Predicted energy draw for the trip in kWh.
    async fn predict(&self, request: &PredictionRequest) -> Result<f64, ProviderError>;
}

/// Client for the energy model's `POST /predict-energy` endpoint.
pub struct HttpEnergyPredictor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEnergyPredictor {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/predict-energy", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl EnergyPredictor for HttpEnergyPredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<f64, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
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

        let body: PredictionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        sanitize_prediction(body.predicted_energy_kwh)
    }
}

/// Negative draws are clamped to zero; non-finite values are rejected.
pub fn sanitize_prediction(kwh: f64) -> Result<f64, ProviderError> {
    if kwh.is_finite() {
        Ok(kwh.max(0.0))
    } else {
        Err(ProviderError::malformed(
            PROVIDER,
            format!("predicted_energy_kwh is {kwh}"),
        ))
    }
}
