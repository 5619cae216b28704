//! HTTP implementations of the `burn-plan-core` source traits.
//!
//! Each upstream service gets one module and one client type. The clients
//! share a single blocking [`reqwest`] client and are safe to call from the
//! rayon fan-outs in the core; the only cross-request state is the Sentinel
//! Hub token cache in [`auth`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};

use burn_plan_core::{SourceError, SourceSet};

pub mod auth;
pub mod config;
pub mod elevation;
pub mod overpass;
pub mod power;
pub mod predictor;
pub mod ranker;
pub mod sentinel;
pub mod water;
pub mod weather;

pub use config::ProviderConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn transport_error(err: reqwest::Error) -> SourceError {
    SourceError::Transport(err.to_string())
}

pub(crate) fn decode_error(service: &'static str, detail: &str) -> SourceError {
    SourceError::Decode {
        service,
        detail: detail.to_owned(),
    }
}

/// Pass a successful response through; turn anything else into a
/// [`SourceError::Status`] carrying the response body as detail.
pub(crate) fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().unwrap_or_default();
    Err(SourceError::Status {
        service,
        status: status.as_u16(),
        detail,
    })
}

/// Assemble a [`SourceSet`] of HTTP clients from the configuration.
///
/// The NASA POWER client serves both the soil-moisture and the climate
/// series; everything else maps one service to one capability.
pub fn http_source_set(config: &ProviderConfig) -> Result<SourceSet, SourceError> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(transport_error)?;

    let sentinel_auth = Arc::new(auth::SentinelAuth::new(client.clone(), config));
    let power = Arc::new(power::PowerClient::new(
        client.clone(),
        &config.power_base_url,
    ));

    Ok(SourceSet {
        land: Arc::new(water::WaterClient::new(
            client.clone(),
            &config.water_base_url,
        )),
        urban: Arc::new(overpass::OverpassClient::new(
            client.clone(),
            &config.overpass_base_url,
        )),
        vegetation: Arc::new(sentinel::SentinelClient::new(
            client.clone(),
            config,
            sentinel_auth,
        )),
        soil: power.clone(),
        climate: power,
        weather: Arc::new(weather::WeatherstackClient::new(client.clone(), config)),
        elevation: Arc::new(elevation::OpenTopoDataClient::new(
            client.clone(),
            &config.opentopodata_base_url,
        )),
        predictor: Arc::new(predictor::PredictorClient::new(
            client.clone(),
            &config.predictor_base_url,
        )),
        risk: Arc::new(ranker::OpenAiRanker::new(client, config)),
    })
}
