//! Client for the external fire-intensity prediction service.
//!
//! The service takes the six features as a bare JSON array and answers with
//! a `success` flag; a well-formed failure body must surface as an error,
//! never as a default intensity.

use reqwest::blocking::Client;
use serde::Deserialize;

use burn_plan_core::sources::{IntensityPredictor, IntensityRequest};
use burn_plan_core::SourceError;

use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "intensity-predictor";

#[derive(Deserialize)]
struct PredictorResponse {
    success: bool,
    #[serde(default)]
    prediction: Vec<f64>,
    #[serde(default)]
    error: Option<String>,
}

fn prediction_from(body: PredictorResponse) -> Result<f64, SourceError> {
    if !body.success {
        return Err(SourceError::Provider(
            body.error
                .unwrap_or_else(|| String::from("unknown prediction error")),
        ));
    }
    body.prediction
        .first()
        .copied()
        .ok_or_else(|| decode_error(SERVICE, "success response carried no prediction"))
}

pub struct PredictorClient {
    client: Client,
    url: String,
}

impl PredictorClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{base_url}/predict"),
        }
    }
}

impl IntensityPredictor for PredictorClient {
    fn predict(&self, request: &IntensityRequest) -> Result<f64, SourceError> {
        let features = [
            request.lat,
            request.temperature,
            request.precipitation,
            request.humidity,
            request.solar_radiation,
            request.soil_moisture,
        ];
        let response = self
            .client
            .post(&self.url)
            .json(&features)
            .send()
            .map_err(transport_error)?;
        let response = ensure_success(SERVICE, response)?;
        let body: PredictorResponse = response
            .json()
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
        prediction_from(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> PredictorResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_successful_body_yields_the_first_prediction() {
        let body = parse(r#"{"success": true, "prediction": [42.5, 7.0]}"#);
        assert_eq!(prediction_from(body).unwrap(), 42.5);
    }

    #[test]
    fn test_reported_failure_is_an_error_not_a_default() {
        let body = parse(r#"{"success": false, "error": "model not loaded"}"#);
        let error = prediction_from(body).unwrap_err();
        assert!(matches!(error, SourceError::Provider(detail) if detail == "model not loaded"));
    }

    #[test]
    fn test_empty_prediction_array_is_a_decode_error() {
        let body = parse(r#"{"success": true, "prediction": []}"#);
        assert!(matches!(
            prediction_from(body).unwrap_err(),
            SourceError::Decode { .. }
        ));
    }
}
