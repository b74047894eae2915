use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::{ChargingStop, ChargingStopStatus, Coordinate, Outcome};
use crate::routing::haversine_km;

/// Upper bound on stations shown to the driver.
pub const MAX_CHARGING_STOPS: usize = 5;
pub const NOT_AVAILABLE: &str = "N/A";
pub const LOOKUP_FAILED_NAME: &str = "Could not retrieve charging stations.";
pub const NONE_FOUND_NAME: &str = "No charging stops found.";

const PROVIDER: &str = "charging directory";
const UNKNOWN_CONNECTOR: &str = "Unknown";

/// A station as reported by the directory, before display formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub title: String,
    /// Directory-reported distance from the search point, when supplied.
    pub distance_km: Option<f64>,
    pub location: Option<Coordinate>,
    pub connector_types: Vec<String>,
}

#[async_trait]
pub trait ChargingDirectory: Send + Sync {
    async fn stations_near(
        &self,
        at: Coordinate,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Station>, ProviderError>;
}

/// Placeholder entry standing in for a failed or empty search.
pub fn placeholder(name: &str) -> ChargingStop {
    ChargingStop {
        name: name.to_string(),
        distance_from_route_start: NOT_AVAILABLE.to_string(),
        connector_type: NOT_AVAILABLE.to_string(),
        price: NOT_AVAILABLE.to_string(),
        estimated_charging_time: NOT_AVAILABLE.to_string(),
        status: ChargingStopStatus::Unknown,
    }
}

/// Normalize a station. The directory carries no price or charging time.
pub fn to_charging_stop(station: Station, route_start: Coordinate) -> ChargingStop {
    let distance_km = station
        .distance_km
        .or_else(|| station.location.map(|at| haversine_km(route_start, at)));
    let distance = match distance_km {
        Some(km) if km.is_finite() => format!("{} km", km.round()),
        _ => NOT_AVAILABLE.to_string(),
    };
    let connector_type = station
        .connector_types
        .into_iter()
        .next()
        .unwrap_or_else(|| UNKNOWN_CONNECTOR.to_string());

    ChargingStop {
        name: station.title,
        distance_from_route_start: distance,
        connector_type,
        price: NOT_AVAILABLE.to_string(),
        estimated_charging_time: NOT_AVAILABLE.to_string(),
        status: ChargingStopStatus::Available,
    }
}

pub struct ChargingStopResolver {
    directory: Arc<dyn ChargingDirectory>,
    radius_km: f64,
}

impl ChargingStopResolver {
    pub fn new(directory: Arc<dyn ChargingDirectory>, radius_km: f64) -> Self {
        Self {
            directory,
            radius_km,
        }
    }

    /// Look up stops around the route start.
    ///
    /// Never fails: an unreachable directory or an empty answer degrades to a
    /// single placeholder entry.
    pub async fn resolve(&self, route_start: Coordinate) -> Outcome<Vec<ChargingStop>> {
        let stations = match self
            .directory
            .stations_near(route_start, self.radius_km, MAX_CHARGING_STOPS)
            .await
        {
            Ok(stations) => stations,
            Err(cause) => {
                tracing::warn!("Charging directory lookup failed: {}", cause);
                return Outcome::Degraded {
                    value: vec![placeholder(LOOKUP_FAILED_NAME)],
                    cause,
                };
            }
        };

        if stations.is_empty() {
            tracing::warn!(
                "Charging directory found no stations within {} km of {:?}",
                self.radius_km,
                route_start
            );
            return Outcome::Degraded {
                value: vec![placeholder(NONE_FOUND_NAME)],
                cause: ProviderError::NoResults { provider: PROVIDER },
            };
        }

        let stops: Vec<ChargingStop> = stations
            .into_iter()
            .take(MAX_CHARGING_STOPS)
            .map(|station| to_charging_stop(station, route_start))
            .collect();
        tracing::info!("Resolved {} charging stop(s)", stops.len());
        Outcome::Ok(stops)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PoiRecord {
    address_info: AddressInfo,
    #[serde(default)]
    connections: Option<Vec<Connection>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddressInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Connection {
    #[serde(default)]
    connection_type: Option<ConnectionType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConnectionType {
    #[serde(default)]
    title: Option<String>,
}

impl From<PoiRecord> for Station {
    fn from(record: PoiRecord) -> Self {
        let info = record.address_info;
        let location = match (info.latitude, info.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate { lat, lon }),
            _ => None,
        };
        let connector_types = record
            .connections
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.connection_type.and_then(|t| t.title))
            .collect();

        Station {
            title: info.title.unwrap_or_else(|| "Unnamed station".to_string()),
            distance_km: info.distance,
            location,
            connector_types,
        }
    }
}

/// Open Charge Map POI search.
pub struct OpenChargeMap {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    country_code: Option<String>,
}

impl OpenChargeMap {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        country_code: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            country_code,
        })
    }

    fn query(&self, at: Coordinate, radius_km: f64, limit: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("output", "json".to_string()),
            ("latitude", at.lat.to_string()),
            ("longitude", at.lon.to_string()),
            ("distance", radius_km.to_string()),
            ("distanceunit", "KM".to_string()),
            ("maxresults", limit.to_string()),
        ];
        if let Some(code) = &self.country_code {
            query.push(("countrycode", code.clone()));
        }
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }
        query
    }
}

#[async_trait]
impl ChargingDirectory for OpenChargeMap {
    async fn stations_near(
        &self,
        at: Coordinate,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Station>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v3/poi/", self.base_url))
            .query(&self.query(at, radius_km, limit))
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

        let records: Vec<PoiRecord> = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        Ok(records.into_iter().take(limit).map(Station::from).collect())
    }
}
