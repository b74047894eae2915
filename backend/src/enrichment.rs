// Module enrichment - elevation and temperature inputs for the energy model
// Both lookups are best-effort: a failure substitutes the default and the
// planning request carries on.

use std::sync::Arc;

use crate::elevation::ElevationSource;
use crate::models::{Coordinate, Environment, Outcome};
use crate::weather::WeatherSource;

pub const DEFAULT_ELEVATION_GAIN_M: f64 = 200.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;

/// Result of enriching one candidate, each input tagged live or defaulted.
#[derive(Debug)]
pub struct Enrichment {
    pub elevation_gain_m: Outcome<f64>,
    pub temperature_c: Outcome<f64>,
}

impl Enrichment {
    pub fn environment(&self) -> Environment {
        Environment {
            elevation_gain_m: self
                .elevation_gain_m
                .value()
                .copied()
                .unwrap_or(DEFAULT_ELEVATION_GAIN_M),
            temperature_c: self
                .temperature_c
                .value()
                .copied()
                .unwrap_or(DEFAULT_TEMPERATURE_C),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.elevation_gain_m.is_degraded() || self.temperature_c.is_degraded()
    }
}

pub struct Enricher {
    elevation: Arc<dyn ElevationSource>,
    weather: Arc<dyn WeatherSource>,
}

impl Enricher {
    pub fn new(elevation: Arc<dyn ElevationSource>, weather: Arc<dyn WeatherSource>) -> Self {
        Self { elevation, weather }
    }

    /// Run both lookups concurrently, one attempt each.
    ///
    /// Temperature is sampled at the route start.
    pub async fn enrich(&self, start: Coordinate, end: Coordinate) -> Enrichment {
        let (elevation, temperature) = tokio::join!(
            self.elevation.elevation_gain_m(start, end),
            self.weather.temperature_c(start),
        );

        let enrichment = Enrichment {
            elevation_gain_m: Outcome::degrade(elevation, DEFAULT_ELEVATION_GAIN_M),
            temperature_c: Outcome::degrade(temperature, DEFAULT_TEMPERATURE_C),
        };

        if let Outcome::Degraded { cause, .. } = &enrichment.elevation_gain_m {
            tracing::warn!(
                "Elevation lookup failed, using default {} m: {}",
                DEFAULT_ELEVATION_GAIN_M,
                cause
            );
        }
        if let Outcome::Degraded { cause, .. } = &enrichment.temperature_c {
            tracing::warn!(
                "Weather lookup failed, using default {} °C: {}",
                DEFAULT_TEMPERATURE_C,
                cause
            );
        }

        enrichment
    }
}
