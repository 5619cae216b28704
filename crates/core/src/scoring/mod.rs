//! Suitability scoring and optimum selection.
//!
//! Every point is scored independently: its factor priority is resolved
//! first (see [`priority`]), then eight weighted terms are summed. Higher is
//! better. Both the per-cluster and the global reductions keep the incumbent
//! on ties, so the first-encountered point wins.

pub mod priority;

use tracing::debug;

use crate::error::PipelineError;
use crate::geometry::Point;
use crate::types::{Cluster, ClusterScore, EnvironmentalData};

pub use priority::{factor_priority, factor_weight, FactorTriggers, FireFactor, WIND_TO_MPH};

/// Suitability score of a single point.
///
/// Terms, each multiplied by the factor's priority weight:
/// - vegetation: `1 - 0.5 * (density + 1)`
/// - temperature: `temperature / 125` and humidity: `humidity / 100`
///   (both under the temperature/humidity slot)
/// - wind: `speed * 2.237 / 200`
/// - soil: `0.7 * (1 - surface) + 0.2 * (1 - root_zone) + 0.1 * (1 - profile)`
/// - topography: `slope / 100`
pub fn score_point(point: &EnvironmentalData) -> f64 {
    let priority = factor_priority(point);
    let weight = |factor| factor_weight(&priority, factor);

    let mut score = 0.0;
    score += weight(FireFactor::Vegetation) * (1.0 - 0.5 * (point.vegetation_density + 1.0));
    score += weight(FireFactor::TemperatureHumidity) * (point.temperature / 125.0);
    score += weight(FireFactor::TemperatureHumidity) * (point.humidity / 100.0);
    score += weight(FireFactor::Wind) * (point.wind_speed * WIND_TO_MPH / 200.0);
    score += weight(FireFactor::SoilMoisture) * 0.7 * (1.0 - point.soil_moisture.surface);
    score += weight(FireFactor::SoilMoisture) * 0.2 * (1.0 - point.soil_moisture.root_zone);
    score += weight(FireFactor::SoilMoisture) * 0.1 * (1.0 - point.soil_moisture.profile);
    score += weight(FireFactor::Topography) * (point.topography.slope / 100.0);
    score
}

/// Best point of one cluster, reduce-left semantics: a later point replaces
/// the incumbent only on a strictly greater score.
pub fn score_cluster(cluster: &Cluster) -> Option<ClusterScore> {
    let mut best: Option<ClusterScore> = None;
    for point in &cluster.points {
        let score = score_point(point);
        if best.is_none_or(|incumbent| score > incumbent.best_score) {
            best = Some(ClusterScore {
                best_point: point.point,
                best_score: score,
            });
        }
    }
    best
}

/// Score every cluster. Empty clusters cannot occur (the engine only emits
/// groups at or above the minimum size), so every cluster yields a score.
pub fn score_clusters(clusters: &[Cluster]) -> Vec<ClusterScore> {
    clusters
        .iter()
        .filter_map(|cluster| {
            let score = score_cluster(cluster);
            if let Some(score) = &score {
                debug!(
                    lat = score.best_point.lat,
                    lon = score.best_point.lon,
                    best_score = score.best_score,
                    members = cluster.points.len(),
                    "scored cluster"
                );
            }
            score
        })
        .collect()
}

/// Global optimum across clusters, same strict-greater tie-break.
///
/// An empty score list means the region produced no cluster at all; that is
/// a structural failure with its own error, not a panic.
pub fn find_optimal_point(scores: &[ClusterScore], min_points: usize) -> Result<Point, PipelineError> {
    scores
        .iter()
        .copied()
        .reduce(|best, current| {
            if current.best_score > best.best_score {
                current
            } else {
                best
            }
        })
        .map(|winner| winner.best_point)
        .ok_or(PipelineError::NoClusters { min_points })
}
