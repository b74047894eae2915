use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::Coordinate;

const PROVIDER: &str = "weather service";

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current ambient temperature in °C at a point.
    async fn temperature_c(&self, at: Coordinate) -> Result<f64, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

/// OpenWeatherMap current-weather client (metric units).
pub struct OpenWeatherMap {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherMap {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMap {
    async fn temperature_c(&self, at: Coordinate) -> Result<f64, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured {
            provider: PROVIDER,
            missing: "OPENWEATHER_API_KEY",
        })?;

        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("lat", at.lat.to_string()),
                ("lon", at.lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key.to_string()),
            ])
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

        let body: CurrentWeather = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if !body.main.temp.is_finite() {
            return Err(ProviderError::malformed(PROVIDER, "non-finite temperature"));
        }
        Ok(body.main.temp)
    }
}
