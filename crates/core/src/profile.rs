//! Environmental profile assembly: one [`EnvironmentalData`] record per
//! surviving sample point.
//!
//! The four readings of a point (vegetation, soil moisture, weather, slope)
//! are independent provider calls and fan out concurrently, as do the
//! profiles of different points. Failure policy per reading:
//!
//! - vegetation, weather: fatal to the request (no safe default exists)
//! - soil moisture: the three depth fields fall back to the `-999` sentinel
//! - slope: falls back to 0

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{PipelineError, SourceError};
use crate::geometry::{Point, KM_PER_DEGREE};
use crate::sources::{DailySoilMoisture, SourceSet};
use crate::types::{EnvironmentalData, SoilMoisture, Topography};

/// Half-width in degrees of the imagery composite requested per point.
pub const VEGETATION_BUFFER_DEGREES: f64 = 0.1;

/// Offset in degrees of the four elevation probes around a point.
const SLOPE_PROBE_DELTA_DEGREES: f64 = 0.001;

/// Pick the soil-moisture reading for a point from its daily series.
///
/// Returns the most recent date for which all three depths are valid, or the
/// first reported date (even if invalid) when no complete day exists. `None`
/// only for an empty series.
pub fn select_soil_moisture(series: &[DailySoilMoisture]) -> Option<SoilMoisture> {
    let chosen = series
        .iter()
        .rev()
        .find(|day| {
            day.surface != crate::types::SOIL_MOISTURE_SENTINEL
                && day.root_zone != crate::types::SOIL_MOISTURE_SENTINEL
                && day.profile != crate::types::SOIL_MOISTURE_SENTINEL
        })
        .or_else(|| series.first())?;
    Some(SoilMoisture {
        surface: chosen.surface,
        root_zone: chosen.root_zone,
        profile: chosen.profile,
    })
}

/// Topographic slope at a point, normalized to `[0, 100]`.
///
/// Samples elevation at ±Δ offsets in both axes, takes the largest elevation
/// difference over the 2Δ horizontal span and maps the slope angle so that
/// 90° becomes 100. Any probe failure yields slope 0; steepness is a
/// secondary factor and not worth failing a point over.
fn probe_slope(sources: &SourceSet, point: Point) -> f64 {
    let probes = [
        Point::new(point.lat + SLOPE_PROBE_DELTA_DEGREES, point.lon),
        Point::new(point.lat - SLOPE_PROBE_DELTA_DEGREES, point.lon),
        Point::new(point.lat, point.lon + SLOPE_PROBE_DELTA_DEGREES),
        Point::new(point.lat, point.lon - SLOPE_PROBE_DELTA_DEGREES),
    ];

    let elevations: Result<Vec<f64>, SourceError> = probes
        .par_iter()
        .map(|&probe| sources.elevation.elevation_m(probe))
        .collect();

    match elevations {
        Ok(elevations) => {
            let max = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = elevations.iter().copied().fold(f64::INFINITY, f64::min);
            let horizontal_distance_m = 2.0 * SLOPE_PROBE_DELTA_DEGREES * KM_PER_DEGREE * 1000.0;
            let slope_angle = ((max - min) / horizontal_distance_m).atan().to_degrees();
            let normalized = (slope_angle.abs() * (100.0 / 90.0)).min(100.0);
            if normalized.is_nan() {
                0.0
            } else {
                normalized
            }
        }
        Err(error) => {
            debug!(lat = point.lat, lon = point.lon, %error, "slope probe failed; using 0");
            0.0
        }
    }
}

fn build_profile(
    sources: &SourceSet,
    point: Point,
    date: NaiveDate,
) -> Result<EnvironmentalData, SourceError> {
    let ((vegetation, soil), (weather, slope)) = rayon::join(
        || {
            rayon::join(
                || sources.vegetation.vegetation(point, date, VEGETATION_BUFFER_DEGREES),
                || sources.soil.soil_moisture_series(point),
            )
        },
        || {
            rayon::join(
                || sources.weather.current_weather(point),
                || probe_slope(sources, point),
            )
        },
    );

    let vegetation = vegetation?;
    let weather = weather?;

    let soil_moisture = match soil {
        Ok(series) => select_soil_moisture(&series).unwrap_or_else(|| {
            warn!(lat = point.lat, lon = point.lon, "empty soil series; using sentinels");
            SoilMoisture::sentinel()
        }),
        Err(error) => {
            warn!(lat = point.lat, lon = point.lon, %error, "soil moisture unavailable; using sentinels");
            SoilMoisture::sentinel()
        }
    };

    debug!(
        lat = point.lat,
        lon = point.lon,
        ndvi = vegetation.ndvi.average,
        cover = ?vegetation.vegetation_type(),
        density = ?vegetation.density_class(),
        slope,
        "profiled sample point"
    );

    Ok(EnvironmentalData {
        point,
        place_name: weather.place_name,
        temperature: weather.temperature,
        humidity: weather.humidity,
        wind_speed: weather.wind_speed,
        wind_direction: weather.wind_direction,
        vegetation_density: vegetation.ndvi.average,
        soil_moisture,
        topography: Topography { slope },
    })
}

/// Build the environmental profile of every sample point, concurrently.
///
/// Per-point recoverable failures (soil, slope) are absorbed above; anything
/// that reaches this level aborts the whole batch, matching the all-or-
/// nothing semantics of the profile stage.
pub fn build_profiles(
    sources: &SourceSet,
    points: &[Point],
    date: NaiveDate,
) -> Result<Vec<EnvironmentalData>, PipelineError> {
    let profiles: Result<Vec<EnvironmentalData>, SourceError> = points
        .par_iter()
        .map(|&point| build_profile(sources, point, date))
        .collect();
    Ok(profiles?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SOIL_MOISTURE_SENTINEL;

    fn day(date: &str, surface: f64, root_zone: f64, profile: f64) -> DailySoilMoisture {
        DailySoilMoisture {
            date: date.to_owned(),
            surface,
            root_zone,
            profile,
        }
    }

    #[test]
    fn test_select_soil_moisture_prefers_most_recent_complete_day() {
        let series = vec![
            day("20250801", 0.3, 0.4, 0.5),
            day("20250802", 0.9, 0.9, 0.9),
            day("20250803", SOIL_MOISTURE_SENTINEL, 0.4, 0.5),
        ];
        let chosen = select_soil_moisture(&series).unwrap();
        assert_eq!(chosen.surface, 0.9);
        assert_eq!(chosen.root_zone, 0.9);
    }

    #[test]
    fn test_select_soil_moisture_falls_back_to_first_day() {
        let series = vec![
            day("20250801", SOIL_MOISTURE_SENTINEL, 0.4, 0.5),
            day("20250802", 0.3, SOIL_MOISTURE_SENTINEL, 0.5),
        ];
        let chosen = select_soil_moisture(&series).unwrap();
        assert_eq!(chosen.surface, SOIL_MOISTURE_SENTINEL);
        assert_eq!(chosen.root_zone, 0.4);
        assert_eq!(chosen.profile, 0.5);
    }

    #[test]
    fn test_select_soil_moisture_empty_series() {
        assert!(select_soil_moisture(&[]).is_none());
    }
}
