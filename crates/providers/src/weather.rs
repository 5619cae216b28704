//! Weatherstack current-conditions client.
//!
//! Weatherstack reports API-level failures with a 200 status and an `error`
//! object in the body, so the body is inspected before the snapshot fields
//! are trusted.

use reqwest::blocking::Client;
use serde::Deserialize;

use burn_plan_core::geometry::Point;
use burn_plan_core::sources::{WeatherSnapshot, WeatherSource};
use burn_plan_core::SourceError;

use crate::config::ProviderConfig;
use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "weatherstack";

#[derive(Deserialize)]
struct WeatherstackResponse {
    location: Option<WsLocation>,
    current: Option<WsCurrent>,
    error: Option<WsError>,
}

#[derive(Deserialize)]
struct WsLocation {
    name: String,
}

#[derive(Deserialize)]
struct WsCurrent {
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    wind_degree: f64,
}

#[derive(Deserialize)]
struct WsError {
    info: String,
}

fn snapshot_from(body: WeatherstackResponse) -> Result<WeatherSnapshot, SourceError> {
    if let Some(error) = body.error {
        return Err(SourceError::Provider(error.info));
    }
    let (location, current) = body
        .location
        .zip(body.current)
        .ok_or_else(|| decode_error(SERVICE, "response carries neither data nor an error"))?;
    Ok(WeatherSnapshot {
        place_name: location.name,
        temperature: current.temperature,
        humidity: current.humidity,
        wind_speed: current.wind_speed,
        wind_direction: current.wind_degree,
    })
}

pub struct WeatherstackClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherstackClient {
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.weatherstack_base_url.clone(),
            api_key: config.weatherstack_api_key.clone(),
        }
    }
}

impl WeatherSource for WeatherstackClient {
    fn current_weather(&self, point: Point) -> Result<WeatherSnapshot, SourceError> {
        let response = self
            .client
            .get(format!("{}/current", self.base_url))
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("query", &format!("{},{}", point.lat, point.lon)),
            ])
            .send()
            .map_err(transport_error)?;
        let response = ensure_success(SERVICE, response)?;
        let body: WeatherstackResponse = response
            .json()
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
        snapshot_from(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_a_successful_body() {
        let body: WeatherstackResponse = serde_json::from_str(
            r#"{
                "location": {"name": "Katoomba"},
                "current": {"temperature": 18, "humidity": 62, "wind_speed": 11, "wind_degree": 250}
            }"#,
        )
        .unwrap();

        let snapshot = snapshot_from(body).unwrap();
        assert_eq!(snapshot.place_name, "Katoomba");
        assert_eq!(snapshot.temperature, 18.0);
        assert_eq!(snapshot.wind_direction, 250.0);
    }

    #[test]
    fn test_api_level_error_surfaces_as_a_provider_error() {
        let body: WeatherstackResponse = serde_json::from_str(
            r#"{"success": false, "error": {"code": 104, "info": "usage limit reached"}}"#,
        )
        .unwrap();

        let error = snapshot_from(body).unwrap_err();
        assert!(matches!(error, SourceError::Provider(info) if info == "usage limit reached"));
    }
}
