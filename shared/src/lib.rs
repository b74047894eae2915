use serde::{Deserialize, Serialize};

/// Geographic point in canonical `(lat, lon)` order.
///
/// Accepts `latitude`/`longitude` on input as well, which is what the web
/// client sends for trip endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `[lat, lon]` pair as rendered in route polylines.
    pub fn to_pair(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// A number that may arrive either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericValue::Number(value) => Some(*value),
            NumericValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Number(value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationPayload {
    #[serde(default, alias = "lat")]
    pub latitude: Option<NumericValue>,
    #[serde(default, alias = "lon")]
    pub longitude: Option<NumericValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehiclePayload {
    #[serde(default)]
    pub battery_capacity_kwh: Option<NumericValue>,
    #[serde(default)]
    pub vehicle_mass_kg: Option<NumericValue>,
    #[serde(default)]
    pub drag_coeff: Option<NumericValue>,
    #[serde(default)]
    pub frontal_area_m2: Option<NumericValue>,
    #[serde(default)]
    pub rolling_resistance_coeff: Option<NumericValue>,
}

/// Planning request body as posted to `/api/trips/plan`.
///
/// Every field is optional at the wire level so that a missing field can be
/// reported by name instead of failing deserialization wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripRequestPayload {
    #[serde(default)]
    pub start_location: Option<LocationPayload>,
    #[serde(default)]
    pub end_location: Option<LocationPayload>,
    #[serde(default)]
    pub battery_level_percent: Option<NumericValue>,
    #[serde(default)]
    pub vehicle: Option<VehiclePayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingStopStatus {
    Available,
    Unknown,
}

/// One entry of the recommended charging stop list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingStop {
    pub name: String,
    pub distance_from_route_start: String,
    pub connector_type: String,
    pub price: String,
    pub estimated_charging_time: String,
    pub status: ChargingStopStatus,
}

impl ChargingStop {
    /// Placeholders stand in for a failed or empty directory search and are
    /// never real stations.
    pub fn is_placeholder(&self) -> bool {
        self.status != ChargingStopStatus::Available
    }
}

/// Display-ready summary of the selected route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub distance: String,
    pub duration: String,
    pub energy_consumption: String,
    pub charging_stops: String,
    pub final_battery: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanResponse {
    pub trip_id: i32,
    pub route_summary: RouteSummary,
    pub charging_stations: Vec<ChargingStop>,
    /// `[lat, lon]` pairs.
    pub route_polyline: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
