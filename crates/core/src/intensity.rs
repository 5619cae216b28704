//! Intensity lookup for the chosen coordinate.
//!
//! Re-fetches a 30-day daily climate series for the recommended point,
//! collapses each parameter to its most recent valid value and hands the
//! feature vector to the external predictor.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::geometry::Point;
use crate::sources::{IntensityRequest, SourceSet};
use crate::types::SOIL_MOISTURE_SENTINEL;

/// Newest value in a daily series that is neither the `-999` sentinel nor
/// NaN. Date keys are `YYYYMMDD`, so reverse key order is newest-first.
/// Falls back to 0 (with a warning) when no day carries a valid value.
pub fn most_recent_valid(series: &BTreeMap<String, f64>, parameter: &str) -> f64 {
    for &value in series.values().rev() {
        if value != SOIL_MOISTURE_SENTINEL && !value.is_nan() {
            return value;
        }
    }
    warn!(parameter, "no valid data found, using default value 0");
    0.0
}

/// Predict the fire radiative power at the chosen point.
///
/// Predictor-reported failure propagates as an error; a silent default here
/// would misrepresent burn intensity to the operator.
pub fn lookup_intensity(sources: &SourceSet, location: Point) -> Result<f64, PipelineError> {
    let series = sources.climate.climate_series(location)?;

    let request = IntensityRequest {
        lat: location.lat,
        temperature: most_recent_valid(&series.temperature, "temperature"),
        precipitation: most_recent_valid(&series.precipitation, "precipitation"),
        humidity: most_recent_valid(&series.humidity, "humidity"),
        solar_radiation: most_recent_valid(&series.solar_radiation, "solar_radiation"),
        soil_moisture: most_recent_valid(&series.soil_moisture, "soil_moisture"),
    };
    info!(
        lat = request.lat,
        temperature = request.temperature,
        precipitation = request.precipitation,
        humidity = request.humidity,
        solar = request.solar_radiation,
        soil = request.soil_moisture,
        "requesting intensity prediction"
    );

    let intensity = sources.predictor.predict(&request)?;
    Ok(intensity)
}
