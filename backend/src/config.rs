// Module config - runtime configuration read from the environment
// Every provider endpoint can be overridden so tests and staging can point
// the planner at local stand-ins.

use std::{env, net::SocketAddr, str::FromStr, time::Duration};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com";
const DEFAULT_MAPBOX_PROFILE: &str = "driving";
const DEFAULT_OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";
const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_ENERGY_PREDICTOR_URL: &str = "http://localhost:8000";
const DEFAULT_OPENCHARGEMAP_BASE_URL: &str = "https://api.openchargemap.io";
const DEFAULT_OPENCHARGEMAP_COUNTRY_CODE: &str = "IN";
const DEFAULT_CHARGING_SEARCH_RADIUS_KM: f64 = 100.0;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for every outbound provider the planner talks to.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub mapbox_access_token: Option<String>,
    pub mapbox_base_url: String,
    pub mapbox_profile: String,
    pub route_alternatives: bool,
    pub open_meteo_base_url: String,
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub energy_predictor_url: String,
    pub openchargemap_api_key: Option<String>,
    pub openchargemap_base_url: String,
    pub openchargemap_country_code: Option<String>,
    pub charging_search_radius_km: f64,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` runs the service on the in-memory trip store.
    pub database_url: Option<String>,
    pub providers: ProviderConfig,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    /// Returns ConfigError when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let bind_addr: SocketAddr = vars.parsed("BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;
        let timeout_secs: u64 =
            vars.parsed("PROVIDER_TIMEOUT_SECS", Some(DEFAULT_PROVIDER_TIMEOUT_SECS))?;
        let charging_search_radius_km: f64 = vars.parsed(
            "CHARGING_SEARCH_RADIUS_KM",
            Some(DEFAULT_CHARGING_SEARCH_RADIUS_KM),
        )?;
        if !(charging_search_radius_km.is_finite() && charging_search_radius_km > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "CHARGING_SEARCH_RADIUS_KM",
                value: charging_search_radius_km.to_string(),
                reason: "must be a positive number of kilometres".to_string(),
            });
        }

        // An explicitly empty country code disables the filter.
        let openchargemap_country_code = match (vars.lookup)("OPENCHARGEMAP_COUNTRY_CODE") {
            Some(code) if code.trim().is_empty() => None,
            Some(code) => Some(code.trim().to_string()),
            None => Some(DEFAULT_OPENCHARGEMAP_COUNTRY_CODE.to_string()),
        };

        let providers = ProviderConfig {
            mapbox_access_token: vars.optional("MAPBOX_ACCESS_TOKEN"),
            mapbox_base_url: vars.or("MAPBOX_BASE_URL", DEFAULT_MAPBOX_BASE_URL),
            mapbox_profile: vars.or("MAPBOX_PROFILE", DEFAULT_MAPBOX_PROFILE),
            route_alternatives: vars.parsed("ROUTE_ALTERNATIVES", Some(true))?,
            open_meteo_base_url: vars.or("OPEN_METEO_BASE_URL", DEFAULT_OPEN_METEO_BASE_URL),
            openweather_api_key: vars.optional("OPENWEATHER_API_KEY"),
            openweather_base_url: vars.or("OPENWEATHER_BASE_URL", DEFAULT_OPENWEATHER_BASE_URL),
            energy_predictor_url: vars.or("ENERGY_PREDICTOR_URL", DEFAULT_ENERGY_PREDICTOR_URL),
            openchargemap_api_key: vars.optional("OPENCHARGEMAP_API_KEY"),
            openchargemap_base_url: vars
                .or("OPENCHARGEMAP_BASE_URL", DEFAULT_OPENCHARGEMAP_BASE_URL),
            openchargemap_country_code,
            charging_search_radius_km,
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            bind_addr,
            database_url: vars.optional("DATABASE_URL"),
            providers,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.optional(name)
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
                name,
                value: raw.clone(),
                reason: err.to_string(),
            }),
            None => default.ok_or_else(|| ConfigError::InvalidValue {
                name,
                value: String::new(),
                reason: "no value and no default".to_string(),
            }),
        }
    }
}
