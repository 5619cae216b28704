//! Capability contracts for the external data sources the pipeline consumes.
//!
//! The core never talks to the network itself; every stage is written
//! against these traits so the whole pipeline can run on in-memory fakes in
//! tests. The `burn-plan-providers` crate supplies the HTTP implementations.
//!
//! All traits are `Send + Sync` because every stage fans its provider calls
//! out across the rayon pool.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::geometry::{BoundingBox, Point};
use crate::types::{EnvironmentalData, RiskRegion};

/// Distinguishes land from open water. Used as a sampling predicate; callers
/// treat an `Err` as "not land".
pub trait LandClassifier: Send + Sync {
    fn is_land(&self, point: Point) -> Result<bool, SourceError>;
}

/// Counts built-up features around a point. A point is rural when fewer than
/// six commercial or industrial features lie within one mile. Callers treat
/// an `Err` as "not rural".
pub trait UrbanClassifier: Send + Sync {
    fn is_rural(&self, point: Point) -> Result<bool, SourceError>;
}

/// Min/max/mean of one spectral band, normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Broad vegetation cover classes derived from band averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VegetationType {
    NonVegetated,
    Forest,
    Shrubland,
    Grassland,
}

/// Vegetation density classes derived from the NDVI average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VegetationDensityClass {
    Barren,
    Sparse,
    Moderate,
    Dense,
}

/// Band statistics of a short-window, low-cloud composite around a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VegetationSummary {
    /// NDVI-like greenness statistics; `ndvi.average` is the density the
    /// scoring engine consumes.
    pub ndvi: BandStats,
    /// NDRE-derived woody-content statistics.
    pub woody_content: BandStats,
    /// SAVI-derived soil-influence statistics.
    pub soil_influence: BandStats,
}

impl VegetationSummary {
    /// Classify the dominant cover type from the band averages.
    pub fn vegetation_type(&self) -> VegetationType {
        if self.ndvi.average < 0.2 {
            VegetationType::NonVegetated
        } else if self.woody_content.average > 0.4 && self.soil_influence.average < 0.3 {
            VegetationType::Forest
        } else if self.woody_content.average > 0.2 && self.soil_influence.average < 0.5 {
            VegetationType::Shrubland
        } else {
            VegetationType::Grassland
        }
    }

    /// Classify cover density from the NDVI average.
    pub fn density_class(&self) -> VegetationDensityClass {
        if self.ndvi.average < 0.2 {
            VegetationDensityClass::Barren
        } else if self.ndvi.average < 0.4 {
            VegetationDensityClass::Sparse
        } else if self.ndvi.average < 0.6 {
            VegetationDensityClass::Moderate
        } else {
            VegetationDensityClass::Dense
        }
    }
}

/// Imagery-derived vegetation statistics. Transport and auth failures are
/// fatal to the request: there is no safe default for fuel density.
pub trait VegetationSource: Send + Sync {
    /// Composite statistics for a square of `buffer_degrees` half-width
    /// around the point, over the month containing `date`.
    fn vegetation(
        &self,
        point: Point,
        date: NaiveDate,
        buffer_degrees: f64,
    ) -> Result<VegetationSummary, SourceError>;
}

/// One day of three-depth soil-moisture readings. Depths may carry the
/// `-999` sentinel when the provider had no valid value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySoilMoisture {
    /// Provider date key (`YYYYMMDD`); lexicographic order is chronological.
    pub date: String,
    pub surface: f64,
    pub root_zone: f64,
    pub profile: f64,
}

/// Recent daily soil-moisture time series, in the provider's reported
/// (chronological) order.
pub trait SoilMoistureSource: Send + Sync {
    fn soil_moisture_series(&self, point: Point) -> Result<Vec<DailySoilMoisture>, SourceError>;
}

/// A current-conditions snapshot plus the place name for a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

pub trait WeatherSource: Send + Sync {
    fn current_weather(&self, point: Point) -> Result<WeatherSnapshot, SourceError>;
}

/// Point elevation in metres. Used only by the slope probe, whose failures
/// collapse to slope 0.
pub trait ElevationSource: Send + Sync {
    fn elevation_m(&self, point: Point) -> Result<f64, SourceError>;
}

/// Thirty days of daily climate parameters for the intensity lookup, keyed
/// by `YYYYMMDD` date so iteration order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateSeries {
    pub temperature: BTreeMap<String, f64>,
    pub precipitation: BTreeMap<String, f64>,
    pub humidity: BTreeMap<String, f64>,
    pub solar_radiation: BTreeMap<String, f64>,
    pub soil_moisture: BTreeMap<String, f64>,
}

pub trait ClimateSeriesSource: Send + Sync {
    fn climate_series(&self, point: Point) -> Result<ClimateSeries, SourceError>;
}

/// Inputs to the external intensity predictor, one value per feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityRequest {
    pub lat: f64,
    pub temperature: f64,
    pub precipitation: f64,
    pub humidity: f64,
    pub solar_radiation: f64,
    pub soil_moisture: f64,
}

/// The opaque ML predictor: features in, fire radiative power (MW) out.
/// Predictor-reported failure must surface as an error, never a default.
pub trait IntensityPredictor: Send + Sync {
    fn predict(&self, request: &IntensityRequest) -> Result<f64, SourceError>;
}

/// Ranks sub-regions of a surveyed bounding box by wildfire risk.
pub trait RiskRanker: Send + Sync {
    fn rank(
        &self,
        bbox: &BoundingBox,
        profiles: &[EnvironmentalData],
    ) -> Result<Vec<RiskRegion>, SourceError>;
}

/// The bundle of capabilities one pipeline run needs.
///
/// Shared handles rather than generics so the fakes in tests and the HTTP
/// clients in production compose the same way.
#[derive(Clone)]
pub struct SourceSet {
    pub land: Arc<dyn LandClassifier>,
    pub urban: Arc<dyn UrbanClassifier>,
    pub vegetation: Arc<dyn VegetationSource>,
    pub soil: Arc<dyn SoilMoistureSource>,
    pub weather: Arc<dyn WeatherSource>,
    pub elevation: Arc<dyn ElevationSource>,
    pub climate: Arc<dyn ClimateSeriesSource>,
    pub predictor: Arc<dyn IntensityPredictor>,
    pub risk: Arc<dyn RiskRanker>,
}
