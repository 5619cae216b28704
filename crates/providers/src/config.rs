//! Provider configuration from environment variables.
//!
//! Credentials are required; base URLs default to the public services and
//! are overridable so tests can point clients at local fixtures.

use std::env;

use burn_plan_core::SourceError;

/// Everything the HTTP source set needs to talk to the outside world.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub sentinel_client_id: String,
    pub sentinel_client_secret: String,
    pub weatherstack_api_key: String,
    pub openai_api_key: String,

    pub sentinel_base_url: String,
    pub power_base_url: String,
    pub weatherstack_base_url: String,
    pub opentopodata_base_url: String,
    pub overpass_base_url: String,
    pub water_base_url: String,
    pub predictor_base_url: String,
    pub openai_base_url: String,
}

fn required(name: &str) -> Result<String, SourceError> {
    env::var(name).map_err(|_| SourceError::Provider(format!("missing environment variable {name}")))
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

impl ProviderConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, SourceError> {
        Ok(Self {
            sentinel_client_id: required("SENTINEL_CLIENT_ID")?,
            sentinel_client_secret: required("SENTINEL_CLIENT_SECRET")?,
            weatherstack_api_key: required("WEATHERSTACK_API_KEY")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            sentinel_base_url: with_default(
                "SENTINEL_BASE_URL",
                "https://services.sentinel-hub.com",
            ),
            power_base_url: with_default("POWER_BASE_URL", "https://power.larc.nasa.gov"),
            weatherstack_base_url: with_default(
                "WEATHERSTACK_BASE_URL",
                "http://api.weatherstack.com",
            ),
            opentopodata_base_url: with_default(
                "OPENTOPODATA_BASE_URL",
                "https://api.opentopodata.org",
            ),
            overpass_base_url: with_default(
                "OVERPASS_BASE_URL",
                "https://overpass-api.de/api/interpreter",
            ),
            water_base_url: with_default("WATER_BASE_URL", "https://is-on-water.balbona.me"),
            predictor_base_url: with_default("FLASK_API_URL", "http://localhost:5000"),
            openai_base_url: with_default("OPENAI_BASE_URL", "https://api.openai.com"),
        })
    }
}
