// Module planner - trip orchestration
// validate -> route -> enrich + predict per candidate -> select -> charging
// lookup (only when a stop is needed) -> persist -> respond

use std::fmt;
use std::sync::Arc;

use greenroute_shared::{RouteSummary, TripPlanResponse, TripRequestPayload};

use crate::charging::{
    ChargingDirectory, ChargingStopResolver, LOOKUP_FAILED_NAME, OpenChargeMap, placeholder,
};
use crate::config::ProviderConfig;
use crate::database::{NewTrip, Trip, TripStore};
use crate::elevation::{ElevationSource, OpenMeteoElevation};
use crate::energy::{EnergyPredictor, HttpEnergyPredictor, PredictionRequest};
use crate::enrichment::Enricher;
use crate::error::{PlanError, ProviderError};
use crate::models::{ChargingStop, EnrichedCandidate, Outcome, RouteCandidate, TripRequest};
use crate::routing::{MapboxDirections, RouteProvider};
use crate::scoring::{evaluate, select_best};
use crate::validation::validate;
use crate::weather::{OpenWeatherMap, WeatherSource};

/// Stages of one planning request, used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningStage {
    Validating,
    RoutingInFlight,
    EnrichingCandidates,
    Scoring,
    ChargingLookup,
    Persisting,
    Responding,
}

impl fmt::Display for PlanningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanningStage::Validating => "validating",
            PlanningStage::RoutingInFlight => "routing",
            PlanningStage::EnrichingCandidates => "enriching",
            PlanningStage::Scoring => "scoring",
            PlanningStage::ChargingLookup => "charging-lookup",
            PlanningStage::Persisting => "persisting",
            PlanningStage::Responding => "responding",
        };
        f.write_str(name)
    }
}

/// The external capabilities a planner talks to.
pub struct Providers {
    pub routes: Arc<dyn RouteProvider>,
    pub elevation: Arc<dyn ElevationSource>,
    pub weather: Arc<dyn WeatherSource>,
    pub energy: Arc<dyn EnergyPredictor>,
    pub charging: Arc<dyn ChargingDirectory>,
}

impl Providers {
    /// Live HTTP adapters.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            routes: Arc::new(MapboxDirections::new(
                config.mapbox_base_url.clone(),
                config.mapbox_profile.clone(),
                config.mapbox_access_token.clone(),
                config.route_alternatives,
                config.timeout,
            )?),
            elevation: Arc::new(OpenMeteoElevation::new(
                config.open_meteo_base_url.clone(),
                config.timeout,
            )?),
            weather: Arc::new(OpenWeatherMap::new(
                config.openweather_base_url.clone(),
                config.openweather_api_key.clone(),
                config.timeout,
            )?),
            energy: Arc::new(HttpEnergyPredictor::new(
                &config.energy_predictor_url,
                config.timeout,
            )?),
            charging: Arc::new(OpenChargeMap::new(
                config.openchargemap_base_url.clone(),
                config.openchargemap_api_key.clone(),
                config.openchargemap_country_code.clone(),
                config.timeout,
            )?),
        })
    }
}

/// Outcome of a successful planning request, before display formatting.
#[derive(Debug, Clone)]
pub struct TripPlan {
    pub trip: Trip,
    pub selected: EnrichedCandidate,
    pub charging_stations: Vec<ChargingStop>,
}

impl TripPlan {
    pub fn into_response(self) -> TripPlanResponse {
        let selected = &self.selected;
        TripPlanResponse {
            trip_id: self.trip.id,
            route_summary: RouteSummary {
                distance: format!("{:.1} km", selected.route.distance_km()),
                duration: format!("{} min", selected.route.duration_min().round()),
                energy_consumption: format!("{:.2} kWh", selected.predicted_energy_kwh),
                charging_stops: selected.charging_stops_needed.to_string(),
                final_battery: format!("{:.1}%", selected.projected_final_battery_percent),
            },
            route_polyline: selected
                .route
                .geometry
                .iter()
                .map(|point| point.to_pair())
                .collect(),
            charging_stations: self.charging_stations,
        }
    }
}

pub struct TripPlanner {
    routes: Arc<dyn RouteProvider>,
    enricher: Arc<Enricher>,
    energy: Arc<dyn EnergyPredictor>,
    charging: ChargingStopResolver,
    store: Arc<dyn TripStore>,
}

impl TripPlanner {
    pub fn new(providers: Providers, charging_radius_km: f64, store: Arc<dyn TripStore>) -> Self {
        Self {
            routes: providers.routes,
            enricher: Arc::new(Enricher::new(providers.elevation, providers.weather)),
            energy: providers.energy,
            charging: ChargingStopResolver::new(providers.charging, charging_radius_km),
            store,
        }
    }

    pub fn from_config(
        config: &ProviderConfig,
        store: Arc<dyn TripStore>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Providers::from_config(config)?,
            config.charging_search_radius_km,
            store,
        ))
    }

    /// Plan a trip for `user_id` from a raw request body.
    ///
    /// Invalid input is rejected before any provider is called.
    pub async fn plan(
        &self,
        user_id: i32,
        payload: TripRequestPayload,
    ) -> Result<TripPlan, PlanError> {
        tracing::debug!(stage = %PlanningStage::Validating, user_id, "Planning request received");
        let request = validate(payload).inspect_err(|err| {
            tracing::info!(user_id, "Rejected planning request: {}", err);
        })?;
        self.plan_validated(user_id, request).await
    }

    pub async fn plan_validated(
        &self,
        user_id: i32,
        request: TripRequest,
    ) -> Result<TripPlan, PlanError> {
        tracing::info!(
            stage = %PlanningStage::RoutingInFlight,
            "Requesting routes from {:?} to {:?}",
            request.start,
            request.end
        );
        let candidates = self
            .routes
            .candidates(request.start, request.end)
            .await
            .inspect_err(|err| tracing::error!("Routing failed: {}", err))?;
        let candidate_count = candidates.len();

        tracing::info!(
            stage = %PlanningStage::EnrichingCandidates,
            "Evaluating {} candidate route(s)",
            candidate_count
        );
        let evaluated = self.evaluate_candidates(candidates, request).await;

        tracing::debug!(stage = %PlanningStage::Scoring, "{} candidate(s) survived", evaluated.len());
        let selected = select_best(evaluated).ok_or_else(|| {
            tracing::error!("Energy prediction failed for all {} candidate(s)", candidate_count);
            PlanError::NoViableRoute {
                candidates: candidate_count,
            }
        })?;
        tracing::info!(
            "Selected candidate {} (score {:.2}, {:.2} kWh, final battery {:.1}%)",
            selected.index,
            selected.score,
            selected.predicted_energy_kwh,
            selected.projected_final_battery_percent
        );

        let charging_stations = if selected.charging_stops_needed > 0 {
            tracing::info!(stage = %PlanningStage::ChargingLookup, "Route needs a charging stop");
            let (route_start, _) = selected.route.endpoints((request.start, request.end));
            self.charging
                .resolve(route_start)
                .await
                .into_result()
                .unwrap_or_else(|_| vec![placeholder(LOOKUP_FAILED_NAME)])
        } else {
            Vec::new()
        };

        tracing::debug!(stage = %PlanningStage::Persisting, user_id, "Saving trip");
        let trip = self
            .store
            .create_trip(NewTrip {
                user_id,
                start_latitude: request.start.lat,
                start_longitude: request.start.lon,
                end_latitude: request.end.lat,
                end_longitude: request.end.lon,
                predicted_consumption: Some(selected.predicted_energy_kwh),
            })
            .await
            .inspect_err(|err| tracing::error!("Failed to save trip: {}", err))?;

        tracing::info!(stage = %PlanningStage::Responding, trip_id = trip.id, "Trip planned");
        Ok(TripPlan {
            trip,
            selected,
            charging_stations,
        })
    }

    /// Run one task per candidate and wait for all of them.
    ///
    /// Handles are awaited in spawn order so the result keeps provider order.
    async fn evaluate_candidates(
        &self,
        candidates: Vec<RouteCandidate>,
        request: TripRequest,
    ) -> Vec<EnrichedCandidate> {
        let handles: Vec<_> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, route)| {
                let enricher = Arc::clone(&self.enricher);
                let energy = Arc::clone(&self.energy);
                tokio::spawn(evaluate_candidate(index, route, request, enricher, energy))
            })
            .collect();

        let mut evaluated = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Outcome::Fatal(cause)) => {
                    tracing::warn!("Candidate {} disqualified: {}", index, cause);
                }
                Ok(outcome) => {
                    if let Ok(candidate) = outcome.into_result() {
                        evaluated.push(candidate);
                    }
                }
                Err(join_error) => {
                    tracing::error!("Candidate {} task failed: {}", index, join_error);
                }
            }
        }
        evaluated
    }
}

async fn evaluate_candidate(
    index: usize,
    route: RouteCandidate,
    request: TripRequest,
    enricher: Arc<Enricher>,
    energy: Arc<dyn EnergyPredictor>,
) -> Outcome<EnrichedCandidate> {
    let (start, end) = route.endpoints((request.start, request.end));
    let environment = enricher.enrich(start, end).await.environment();

    let Some(prediction) = PredictionRequest::for_candidate(&route, environment, &request.vehicle)
    else {
        return Outcome::Fatal(ProviderError::malformed(
            "route provider",
            format!("candidate {index} has no positive duration"),
        ));
    };

    tracing::debug!(
        "Candidate {}: {:.1} km at {:.1} km/h, gain {} m, {} °C",
        index,
        prediction.distance_km,
        prediction.avg_speed_kmph,
        prediction.elevation_gain_m,
        prediction.temperature_c
    );

    let predicted = energy.predict(&prediction).await.map(|kwh| {
        evaluate(
            index,
            route,
            environment.elevation_gain_m,
            environment.temperature_c,
            kwh,
            &request,
        )
    });
    Outcome::require(predicted)
}
