//! End-to-end orchestration: region in, recommendation (or risk survey) out.
//!
//! Stages run strictly in sequence; all concurrency lives inside a stage's
//! fan-out over points. No state crosses a request boundary except the
//! provider-internal token cache.

use chrono::Utc;
use tracing::info;

use crate::cluster::{find_environmental_clusters, ClusterParams};
use crate::error::PipelineError;
use crate::geometry::{area_size_km2, sample_count, BoundingBox, Region, SampleMode};
use crate::grid::{generate_sample_points, FilterMode};
use crate::intensity::lookup_intensity;
use crate::profile::build_profiles;
use crate::scoring::{find_optimal_point, score_clusters};
use crate::sources::SourceSet;
use crate::types::{BurnSiteRecommendation, EnvironmentalData, RiskAssessment};

/// The burn-site recommendation pipeline over a fixed set of data sources.
pub struct BurnSitePlanner {
    sources: SourceSet,
    cluster_params: ClusterParams,
}

impl BurnSitePlanner {
    pub fn new(sources: SourceSet) -> Self {
        Self {
            sources,
            cluster_params: ClusterParams::default(),
        }
    }

    /// Override the clustering radius and minimum size.
    pub fn with_cluster_params(mut self, params: ClusterParams) -> Self {
        self.cluster_params = params;
        self
    }

    /// Recommend a single controlled-burn coordinate inside the region.
    ///
    /// region → sample grid → environmental profiles → clusters → scores →
    /// optimum → intensity. Structural failures (`NoSamplePoints`,
    /// `NoClusters`) carry their own variants; provider failures with no
    /// safe fallback bubble unchanged.
    pub fn recommend(&self, region: &Region) -> Result<BurnSiteRecommendation, PipelineError> {
        let area = area_size_km2(region);
        let count = sample_count(area, SampleMode::Point);
        info!(area_km2 = area, samples = count, "starting burn-site recommendation");

        let points = generate_sample_points(&self.sources, region, count, FilterMode::Strict);
        if points.is_empty() {
            return Err(PipelineError::NoSamplePoints);
        }

        let profiles = build_profiles(&self.sources, &points, Utc::now().date_naive())?;
        // The response carries the place name of the first profiled point;
        // it is not re-resolved for the winning coordinate.
        let location_name = profiles[0].place_name.clone();

        let clusters = find_environmental_clusters(profiles, &self.cluster_params);
        let scores = score_clusters(&clusters);
        let location = find_optimal_point(&scores, self.cluster_params.min_points_per_cluster)?;
        let intensity_mw = lookup_intensity(&self.sources, location)?;

        info!(
            lat = location.lat,
            lon = location.lon,
            intensity_mw,
            "burn-site recommendation complete"
        );
        Ok(BurnSiteRecommendation {
            location,
            location_name,
            intensity_mw,
        })
    }

    /// Collect environmental profiles across a bounding box for the
    /// wildfire-risk survey. Uses the denser ranking clamp (100..=400) and
    /// filters on the land predicate only.
    pub fn survey(&self, bbox: &BoundingBox) -> Result<Vec<EnvironmentalData>, PipelineError> {
        let region = Region::BoundingBox(*bbox);
        let count = sample_count(area_size_km2(&region), SampleMode::Ranking);
        info!(samples = count, "starting wildfire-risk survey");

        let points = generate_sample_points(&self.sources, &region, count, FilterMode::LandOnly);
        if points.is_empty() {
            return Err(PipelineError::NoSamplePoints);
        }
        build_profiles(&self.sources, &points, Utc::now().date_naive())
    }

    /// Rank the sub-regions of a bounding box by wildfire risk.
    pub fn rank_wildfire_risk(&self, bbox: &BoundingBox) -> Result<RiskAssessment, PipelineError> {
        let profiles = self.survey(bbox)?;
        let location_name = profiles[0].place_name.clone();
        let regions = self.sources.risk.rank(bbox, &profiles)?;
        Ok(RiskAssessment {
            location_name,
            regions,
        })
    }
}
