//! Land/water lookup against the is-on-water API.

use reqwest::blocking::Client;
use serde::Deserialize;

use burn_plan_core::geometry::Point;
use burn_plan_core::sources::LandClassifier;
use burn_plan_core::SourceError;

use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "is-on-water";

#[derive(Deserialize)]
struct WaterResponse {
    #[serde(rename = "isWater")]
    is_water: bool,
}

pub struct WaterClient {
    client: Client,
    base_url: String,
}

impl WaterClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
        }
    }
}

impl LandClassifier for WaterClient {
    fn is_land(&self, point: Point) -> Result<bool, SourceError> {
        let url = format!("{}/api/v1/get/{}/{}", self.base_url, point.lat, point.lon);
        let response = self.client.get(url).send().map_err(transport_error)?;
        let response = ensure_success(SERVICE, response)?;
        let body: WaterResponse = response
            .json()
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
        Ok(!body.is_water)
    }
}
