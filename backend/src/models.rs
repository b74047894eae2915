use serde::Serialize;

use crate::error::ProviderError;

pub use greenroute_shared::{ChargingStop, ChargingStopStatus, Coordinate};

/// Physical parameters of the vehicle, all strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleParams {
    pub battery_capacity_kwh: f64,
    pub mass_kg: f64,
    pub drag_coeff: f64,
    pub frontal_area_m2: f64,
    pub rolling_resistance_coeff: f64,
}

/// A validated planning request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripRequest {
    pub start: Coordinate,
    pub end: Coordinate,
    pub battery_level_percent: f64,
    pub vehicle: VehicleParams,
}

/// One alternative route as returned by the route provider, geometry already
/// in `(lat, lon)` order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCandidate {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Vec<Coordinate>,
}

impl RouteCandidate {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_s / 60.0
    }

    /// Average speed over the route, `None` for a zero-duration route.
    pub fn avg_speed_kmph(&self) -> Option<f64> {
        let hours = self.duration_min() / 60.0;
        if hours > 0.0 && hours.is_finite() {
            Some(self.distance_km() / hours)
        } else {
            None
        }
    }

    /// First and last geometry points, or the requested endpoints when the
    /// provider sent no geometry.
    pub fn endpoints(&self, fallback: (Coordinate, Coordinate)) -> (Coordinate, Coordinate) {
        match (self.geometry.first(), self.geometry.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => fallback,
        }
    }
}

/// Elevation and temperature used as energy model inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub elevation_gain_m: f64,
    pub temperature_c: f64,
}

/// A candidate that survived enrichment and prediction, with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedCandidate {
    /// Position in the provider's answer; used for stable tie-breaking.
    pub index: usize,
    pub route: RouteCandidate,
    pub elevation_gain_m: f64,
    pub temperature_c: f64,
    pub predicted_energy_kwh: f64,
    pub projected_final_battery_percent: f64,
    pub charging_stops_needed: u8,
    pub score: f64,
}

/// Tagged result of one provider call.
///
/// `Degraded` carries the substitute value together with the failure that
/// caused it, so the caller can log it without branching on errors.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Degraded { value: T, cause: ProviderError },
    Fatal(ProviderError),
}

impl<T> Outcome<T> {
    /// Substitute `default` on failure.
    pub fn degrade(result: Result<T, ProviderError>, default: T) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(cause) => Outcome::Degraded {
                value: default,
                cause,
            },
        }
    }

    /// Failure has no acceptable substitute.
    pub fn require(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(cause) => Outcome::Fatal(cause),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// Usable value, whether live or substituted.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => Some(value),
            Outcome::Fatal(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, ProviderError> {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => Ok(value),
            Outcome::Fatal(cause) => Err(cause),
        }
    }
}
