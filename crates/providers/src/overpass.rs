//! Overpass API client classifying points as rural or built-up.
//!
//! A point counts as rural when fewer than six commercial or industrial
//! features lie within one mile of it.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use burn_plan_core::geometry::Point;
use burn_plan_core::sources::UrbanClassifier;
use burn_plan_core::SourceError;

use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "overpass";
const SEARCH_RADIUS_M: f64 = 1609.345;
const URBAN_FEATURE_THRESHOLD: usize = 6;

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<serde_json::Value>,
}

fn feature_query(point: Point) -> String {
    let (r, lat, lon) = (SEARCH_RADIUS_M, point.lat, point.lon);
    format!(
        r#"[out:json];
(
  node["building"="commercial"](around:{r},{lat},{lon});
  way["building"="commercial"](around:{r},{lat},{lon});
  node["building"="industrial"](around:{r},{lat},{lon});
  way["building"="industrial"](around:{r},{lat},{lon});
  relation["landuse"="industrial"](around:{r},{lat},{lon});
  relation["landuse"="commercial"](around:{r},{lat},{lon});
);
out;"#
    )
}

pub struct OverpassClient {
    client: Client,
    url: String,
}

impl OverpassClient {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_owned(),
        }
    }
}

impl UrbanClassifier for OverpassClient {
    fn is_rural(&self, point: Point) -> Result<bool, SourceError> {
        let response = self
            .client
            .post(&self.url)
            .body(feature_query(point))
            .send()
            .map_err(transport_error)?;
        let response = ensure_success(SERVICE, response)?;
        let body: OverpassResponse = response
            .json()
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;

        let features = body.elements.len();
        debug!(lat = point.lat, lon = point.lon, features, "urban feature count");
        Ok(features < URBAN_FEATURE_THRESHOLD)
    }
}
