//! OpenTopoData point-elevation client (ASTER 30 m dataset).

use reqwest::blocking::Client;
use serde::Deserialize;

use burn_plan_core::geometry::Point;
use burn_plan_core::sources::ElevationSource;
use burn_plan_core::SourceError;

use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "opentopodata";

#[derive(Deserialize)]
struct TopoResponse {
    results: Vec<TopoResult>,
}

#[derive(Deserialize)]
struct TopoResult {
    /// `null` over bathymetry and outside dataset coverage.
    elevation: Option<f64>,
}

pub struct OpenTopoDataClient {
    client: Client,
    base_url: String,
}

impl OpenTopoDataClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
        }
    }
}

impl ElevationSource for OpenTopoDataClient {
    fn elevation_m(&self, point: Point) -> Result<f64, SourceError> {
        let url = format!(
            "{}/v1/aster30m?locations={},{}",
            self.base_url, point.lat, point.lon
        );
        let response = self.client.get(url).send().map_err(transport_error)?;
        let response = ensure_success(SERVICE, response)?;
        let body: TopoResponse = response
            .json()
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
        body.results
            .first()
            .and_then(|result| result.elevation)
            .ok_or_else(|| decode_error(SERVICE, "no elevation for the requested location"))
    }
}
