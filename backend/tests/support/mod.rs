//! Stub providers that count their calls, shared by the integration tests.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use greenroute::{
    charging::{ChargingDirectory, Station},
    database::{InMemoryTripStore, TripStore},
    elevation::ElevationSource,
    energy::{EnergyPredictor, PredictionRequest},
    error::ProviderError,
    models::{Coordinate, RouteCandidate},
    planner::{Providers, TripPlanner},
    routing::{RouteProvider, UpstreamRouteError},
    weather::WeatherSource,
};
use greenroute_shared::TripRequestPayload;
use serde_json::json;

pub const BANGALORE: Coordinate = Coordinate {
    lat: 12.9716,
    lon: 77.5946,
};
pub const CHENNAI: Coordinate = Coordinate {
    lat: 13.0827,
    lon: 80.2707,
};
pub const CHARGING_RADIUS_KM: f64 = 100.0;

/// Planning body for Bangalore to Chennai in a 60 kWh car at the given charge.
pub fn payload_json(battery_level_percent: f64) -> serde_json::Value {
    json!({
        "start_location": {"latitude": BANGALORE.lat, "longitude": BANGALORE.lon},
        "end_location": {"latitude": CHENNAI.lat, "longitude": CHENNAI.lon},
        "battery_level_percent": battery_level_percent,
        "vehicle": {
            "battery_capacity_kwh": 60,
            "vehicle_mass_kg": "1800",
            "drag_coeff": 0.29,
            "frontal_area_m2": 2.3,
            "rolling_resistance_coeff": 0.01
        }
    })
}

pub fn payload(battery_level_percent: f64) -> TripRequestPayload {
    serde_json::from_value(payload_json(battery_level_percent)).unwrap()
}

/// A straight two-point candidate between the test endpoints.
pub fn route(distance_km: f64, duration_min: f64) -> RouteCandidate {
    RouteCandidate {
        distance_m: distance_km * 1000.0,
        duration_s: duration_min * 60.0,
        geometry: vec![BANGALORE, CHENNAI],
    }
}

pub fn station(title: &str, distance_km: f64, connector: &str) -> Station {
    Station {
        title: title.to_string(),
        distance_km: Some(distance_km),
        location: None,
        connector_types: vec![connector.to_string()],
    }
}

pub enum RouteBehaviour {
    Candidates(Vec<RouteCandidate>),
    NoRoutes,
    Unavailable,
}

pub struct StubRoutes {
    behaviour: RouteBehaviour,
    pub calls: AtomicUsize,
}

#[async_trait]
impl RouteProvider for StubRoutes {
    async fn candidates(
        &self,
        _start: Coordinate,
        _end: Coordinate,
    ) -> Result<Vec<RouteCandidate>, UpstreamRouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            RouteBehaviour::Candidates(routes) => Ok(routes.clone()),
            RouteBehaviour::NoRoutes => Err(UpstreamRouteError::NoRoutes),
            RouteBehaviour::Unavailable => Err(UpstreamRouteError::Unavailable(
                ProviderError::Status {
                    provider: "route provider",
                    status: 503,
                },
            )),
        }
    }
}

pub struct StubElevation {
    gain_m: Option<f64>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ElevationSource for StubElevation {
    async fn elevation_gain_m(&self, _: Coordinate, _: Coordinate) -> Result<f64, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gain_m.ok_or(ProviderError::Timeout {
            provider: "elevation service",
        })
    }
}

pub struct StubWeather {
    temperature_c: Option<f64>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl WeatherSource for StubWeather {
    async fn temperature_c(&self, _: Coordinate) -> Result<f64, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.temperature_c.ok_or(ProviderError::NotConfigured {
            provider: "weather service",
            missing: "OPENWEATHER_API_KEY",
        })
    }
}

type PredictFn = dyn Fn(&PredictionRequest) -> Result<f64, ProviderError> + Send + Sync;

/// Predictor driven by a closure; remembers every request it saw.
pub struct StubPredictor {
    predict: Box<PredictFn>,
    pub requests: Mutex<Vec<PredictionRequest>>,
}

impl StubPredictor {
    pub fn requests(&self) -> Vec<PredictionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnergyPredictor for StubPredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<f64, ProviderError> {
        self.requests.lock().unwrap().push(*request);
        (self.predict)(request)
    }
}

pub struct StubDirectory {
    stations: Option<Vec<Station>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ChargingDirectory for StubDirectory {
    async fn stations_near(
        &self,
        _at: Coordinate,
        _radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Station>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.stations {
            Some(stations) => Ok(stations.iter().take(limit).cloned().collect()),
            None => Err(ProviderError::Status {
                provider: "charging directory",
                status: 500,
            }),
        }
    }
}

/// All stubs plus the in-memory store, kept so tests can inspect them after
/// planning.
pub struct Harness {
    pub routes: Arc<StubRoutes>,
    pub elevation: Arc<StubElevation>,
    pub weather: Arc<StubWeather>,
    pub energy: Arc<StubPredictor>,
    pub charging: Arc<StubDirectory>,
    pub store: Arc<InMemoryTripStore>,
}

impl Harness {
    /// Healthy providers: 150 m gain, 30 °C, 0.12 kWh per km and two stations.
    pub fn new(routes: Vec<RouteCandidate>) -> Self {
        Self {
            routes: Arc::new(StubRoutes {
                behaviour: RouteBehaviour::Candidates(routes),
                calls: AtomicUsize::new(0),
            }),
            elevation: Arc::new(StubElevation {
                gain_m: Some(150.0),
                calls: AtomicUsize::new(0),
            }),
            weather: Arc::new(StubWeather {
                temperature_c: Some(30.0),
                calls: AtomicUsize::new(0),
            }),
            energy: Arc::new(StubPredictor {
                predict: Box::new(|request| Ok(request.distance_km * 0.12)),
                requests: Mutex::new(Vec::new()),
            }),
            charging: Arc::new(StubDirectory {
                stations: Some(vec![
                    station("Hosur Fast Charge", 38.6, "CCS (Type 2)"),
                    station("Krishnagiri EV Hub", 84.2, "Type 2 (Socket Only)"),
                ]),
                calls: AtomicUsize::new(0),
            }),
            store: Arc::new(InMemoryTripStore::new()),
        }
    }

    pub fn with_route_behaviour(mut self, behaviour: RouteBehaviour) -> Self {
        self.routes = Arc::new(StubRoutes {
            behaviour,
            calls: AtomicUsize::new(0),
        });
        self
    }

    pub fn with_environment(mut self, gain_m: Option<f64>, temperature_c: Option<f64>) -> Self {
        self.elevation = Arc::new(StubElevation {
            gain_m,
            calls: AtomicUsize::new(0),
        });
        self.weather = Arc::new(StubWeather {
            temperature_c,
            calls: AtomicUsize::new(0),
        });
        self
    }

    pub fn with_predictor<F>(mut self, predict: F) -> Self
    where
        F: Fn(&PredictionRequest) -> Result<f64, ProviderError> + Send + Sync + 'static,
    {
        self.energy = Arc::new(StubPredictor {
            predict: Box::new(predict),
            requests: Mutex::new(Vec::new()),
        });
        self
    }

    /// `None` makes every directory lookup fail.
    pub fn with_stations(mut self, stations: Option<Vec<Station>>) -> Self {
        self.charging = Arc::new(StubDirectory {
            stations,
            calls: AtomicUsize::new(0),
        });
        self
    }

    pub fn planner(&self) -> TripPlanner {
        let providers = Providers {
            routes: self.routes.clone(),
            elevation: self.elevation.clone(),
            weather: self.weather.clone(),
            energy: self.energy.clone(),
            charging: self.charging.clone(),
        };
        let store: Arc<dyn TripStore> = self.store.clone();
        TripPlanner::new(providers, CHARGING_RADIUS_KM, store)
    }

    /// Calls made to any outbound provider so far.
    pub fn external_calls(&self) -> usize {
        self.routes.calls.load(Ordering::SeqCst)
            + self.elevation.calls.load(Ordering::SeqCst)
            + self.weather.calls.load(Ordering::SeqCst)
            + self.energy.requests().len()
            + self.charging.calls.load(Ordering::SeqCst)
    }
}
