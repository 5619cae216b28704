//! Records flowing between the pipeline stages.
//!
//! Each stage consumes the previous stage's output by value; none of these
//! types are mutated after construction.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Sentinel used by the upstream soil-moisture provider for "no valid
/// reading". Carried through the pipeline verbatim.
pub const SOIL_MOISTURE_SENTINEL: f64 = -999.0;

/// Volumetric soil-moisture fractions at three depth bands.
///
/// Any field may hold [`SOIL_MOISTURE_SENTINEL`] when the provider had no
/// valid reading for that depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilMoisture {
    /// 0-10 cm depth band.
    pub surface: f64,
    /// 10-100 cm depth band.
    pub root_zone: f64,
    /// 0-200 cm depth band.
    pub profile: f64,
}

impl SoilMoisture {
    /// All three depths set to the missing-data sentinel.
    pub fn sentinel() -> Self {
        Self {
            surface: SOIL_MOISTURE_SENTINEL,
            root_zone: SOIL_MOISTURE_SENTINEL,
            profile: SOIL_MOISTURE_SENTINEL,
        }
    }

    /// True when every depth carries a real reading.
    pub fn is_complete(&self) -> bool {
        self.surface != SOIL_MOISTURE_SENTINEL
            && self.root_zone != SOIL_MOISTURE_SENTINEL
            && self.profile != SOIL_MOISTURE_SENTINEL
    }
}

/// Terrain steepness at a sample point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topography {
    /// Normalized steepness in `[0, 100]` (90° of slope maps to 100).
    pub slope: f64,
}

/// The assembled environmental profile of one sample point.
///
/// Built once per surviving grid point by the profile builder and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    pub point: Point,
    /// Human-readable place name reported by the weather provider.
    pub place_name: String,
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Wind speed in raw provider units (converted to mph only inside the
    /// scoring formula).
    pub wind_speed: f64,
    /// Wind direction in degrees.
    pub wind_direction: f64,
    /// NDVI-like greenness average in `[0, 1]`.
    pub vegetation_density: f64,
    pub soil_moisture: SoilMoisture,
    pub topography: Topography,
}

/// Unweighted arithmetic means of every scalar field across a cluster.
///
/// Soil-moisture sentinels are *included* in the averages. This matches the
/// behavior of the system this pipeline replaces; see DESIGN.md before
/// changing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub vegetation_density: f64,
    pub soil_moisture: SoilMoisture,
    pub topography: Topography,
}

/// A proximity group of profiled points with aggregate conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub points: Vec<EnvironmentalData>,
    /// Unweighted centroid of the member coordinates.
    pub center: Point,
    pub average_conditions: AverageConditions,
}

/// The winning point of one cluster and its suitability score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterScore {
    pub best_point: Point,
    pub best_score: f64,
}

/// Final output of the recommendation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnSiteRecommendation {
    /// The recommended ignition coordinate.
    pub location: Point,
    /// Place name of the first profiled sample point (inherited behavior:
    /// the name is not re-resolved for the chosen coordinate).
    pub location_name: String,
    /// Predicted fire radiative power in megawatts.
    pub intensity_mw: f64,
}

/// One ranked sub-region of a wildfire-risk assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRegion {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Relative severity in `[0, 1]`.
    pub severity: f64,
}

/// Output of the wildfire-risk survey: three sub-regions ranked by risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Place name of the first profiled sample point.
    pub location_name: String,
    pub regions: Vec<RiskRegion>,
}
