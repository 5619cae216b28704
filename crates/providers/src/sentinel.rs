//! Sentinel Hub process-API client for vegetation statistics.
//!
//! Requests a 100x100 px low-cloud composite over the month containing the
//! request date. The evalscript packs NDRE, NDVI and an inverted SAVI into
//! the red, green and blue channels; band statistics over the decoded PNG
//! become the [`VegetationSummary`].

use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};
use reqwest::blocking::Client;
use serde_json::json;
use tracing::debug;

use burn_plan_core::geometry::Point;
use burn_plan_core::sources::{BandStats, VegetationSource, VegetationSummary};
use burn_plan_core::SourceError;

use crate::auth::SentinelAuth;
use crate::config::ProviderConfig;
use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "sentinel-hub";
const MAX_CLOUD_COVERAGE: u32 = 20;
const OUTPUT_PIXELS: u32 = 100;

/// Maps each pixel's indices onto the PNG channels the stats are read from:
/// R = NDRE (woody content), G = NDVI (greenness), B = 1 - SAVI (soil
/// influence).
const EVALSCRIPT: &str = r#"
//VERSION=3
function setup() {
  return {
    input: ["B04", "B05", "B08"],
    output: [{
      id: "default",
      bands: 3,
      sampleType: "UINT8"
    }]
  }
}

function evaluatePixel(sample) {
  let ndvi = (sample.B08 - sample.B04) / (sample.B08 + sample.B04);
  let ndre = (sample.B08 - sample.B05) / (sample.B08 + sample.B05);
  let savi = ((sample.B08 - sample.B04) / (sample.B08 + sample.B04 + 0.5)) * 1.5;

  return [
    255 * Math.max(0, Math.min(1, ndre + 0.5)),
    255 * Math.max(0, Math.min(1, (ndvi + 1) / 2)),
    255 * (1 - Math.max(0, Math.min(1, savi)))
  ];
}
"#;

pub struct SentinelClient {
    client: Client,
    process_url: String,
    auth: Arc<SentinelAuth>,
}

impl SentinelClient {
    pub fn new(client: Client, config: &ProviderConfig, auth: Arc<SentinelAuth>) -> Self {
        Self {
            client,
            process_url: format!("{}/api/v1/process", config.sentinel_base_url),
            auth,
        }
    }
}

/// First and last day of the month containing `date`, as `YYYY-MM-DD`.
fn month_date_range(date: NaiveDate) -> (String, String) {
    let start = date.with_day(1).unwrap_or(date);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date);
    (
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}

/// Min/max/mean of one RGB8 channel, normalized to `[0, 1]`.
fn band_stats(raw: &[u8], channel: usize) -> BandStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum = 0u64;
    let mut count = 0u64;
    for &value in raw.iter().skip(channel).step_by(3) {
        min = min.min(value);
        max = max.max(value);
        sum += u64::from(value);
        count += 1;
    }
    BandStats {
        min: f64::from(min) / 255.0,
        max: f64::from(max) / 255.0,
        average: sum as f64 / (count as f64 * 255.0),
    }
}

impl VegetationSource for SentinelClient {
    fn vegetation(
        &self,
        point: Point,
        date: NaiveDate,
        buffer_degrees: f64,
    ) -> Result<VegetationSummary, SourceError> {
        let (start, end) = month_date_range(date);
        let token = self.auth.bearer_token()?;

        let body = json!({
            "input": {
                "bounds": {
                    "bbox": [
                        point.lon - buffer_degrees,
                        point.lat - buffer_degrees,
                        point.lon + buffer_degrees,
                        point.lat + buffer_degrees,
                    ],
                    "properties": {
                        "crs": "http://www.opengis.net/def/crs/EPSG/0/4326",
                    },
                },
                "data": [{
                    "dataFilter": {
                        "timeRange": {
                            "from": format!("{start}T00:00:00Z"),
                            "to": format!("{end}T23:59:59Z"),
                        },
                        "maxCloudCoverage": MAX_CLOUD_COVERAGE,
                    },
                    "type": "S2L2A",
                }],
            },
            "output": {
                "width": OUTPUT_PIXELS,
                "height": OUTPUT_PIXELS,
                "responses": [{
                    "identifier": "default",
                    "format": { "type": "image/png" },
                }],
            },
            "evalscript": EVALSCRIPT,
        });

        debug!(lat = point.lat, lon = point.lon, %start, %end, "requesting vegetation composite");
        let response = self
            .client
            .post(&self.process_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .map_err(transport_error)?;

        if response.status().as_u16() == 401 {
            // Token rejected despite the expiry buffer; force a refresh.
            self.auth.invalidate();
        }
        let response = ensure_success(SERVICE, response)?;

        let bytes = response.bytes().map_err(transport_error)?;
        let image = image::load_from_memory(&bytes)
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
        let rgb = image.to_rgb8();
        let raw = rgb.as_raw();
        if raw.is_empty() {
            return Err(decode_error(SERVICE, "composite decoded to zero pixels"));
        }

        Ok(VegetationSummary {
            woody_content: band_stats(raw, 0),
            ndvi: band_stats(raw, 1),
            soil_influence: band_stats(raw, 2),
        })
    }
}
