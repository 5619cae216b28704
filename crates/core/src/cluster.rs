//! Single-linkage radius clustering of profiled sample points.
//!
//! A simplified agglomerative pass: each cluster grows from a seed point and
//! absorbs every unvisited point within the radius *of the seed*, not of the
//! nearest member. Groups below the minimum size are dropped silently.

use tracing::info;

use crate::geometry::{haversine_distance_km, Point};
use crate::types::{AverageConditions, Cluster, EnvironmentalData, SoilMoisture, Topography};

/// Clustering parameters. The defaults match the production configuration:
/// 5 km radius, at least 5 points per cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    pub max_radius_km: f64,
    pub min_points_per_cluster: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            max_radius_km: 5.0,
            min_points_per_cluster: 5,
        }
    }
}

fn cluster_center(points: &[EnvironmentalData]) -> Point {
    let n = points.len() as f64;
    let sum_lat: f64 = points.iter().map(|p| p.point.lat).sum();
    let sum_lon: f64 = points.iter().map(|p| p.point.lon).sum();
    Point {
        lat: sum_lat / n,
        lon: sum_lon / n,
    }
}

/// Unweighted mean of every scalar field across the members.
///
/// Soil-moisture sentinels (`-999`) are folded into the averages on purpose;
/// the choice is documented in DESIGN.md.
fn average_conditions(points: &[EnvironmentalData]) -> AverageConditions {
    let n = points.len() as f64;
    let mut sum = AverageConditions {
        temperature: 0.0,
        humidity: 0.0,
        wind_speed: 0.0,
        wind_direction: 0.0,
        vegetation_density: 0.0,
        soil_moisture: SoilMoisture {
            surface: 0.0,
            root_zone: 0.0,
            profile: 0.0,
        },
        topography: Topography { slope: 0.0 },
    };
    for p in points {
        sum.temperature += p.temperature;
        sum.humidity += p.humidity;
        sum.wind_speed += p.wind_speed;
        sum.wind_direction += p.wind_direction;
        sum.vegetation_density += p.vegetation_density;
        sum.soil_moisture.surface += p.soil_moisture.surface;
        sum.soil_moisture.root_zone += p.soil_moisture.root_zone;
        sum.soil_moisture.profile += p.soil_moisture.profile;
        sum.topography.slope += p.topography.slope;
    }

    AverageConditions {
        temperature: sum.temperature / n,
        humidity: sum.humidity / n,
        wind_speed: sum.wind_speed / n,
        wind_direction: sum.wind_direction / n,
        vegetation_density: sum.vegetation_density / n,
        soil_moisture: SoilMoisture {
            surface: sum.soil_moisture.surface / n,
            root_zone: sum.soil_moisture.root_zone / n,
            profile: sum.soil_moisture.profile / n,
        },
        topography: Topography {
            slope: sum.topography.slope / n,
        },
    }
}

/// Group profiled points into proximity clusters.
///
/// Takes the first unvisited point as a seed, absorbs every remaining
/// unvisited point within `max_radius_km` of that seed, and emits the group
/// when it has at least `min_points_per_cluster` members. Each input point
/// lands in at most one cluster or is dropped; nothing is retried.
///
/// Absorption scans the unvisited list back to front, so member order after
/// the seed is reverse lattice order. First-occurrence tie-breaks in the
/// scoring stage depend on this order being stable.
pub fn find_environmental_clusters(
    data: Vec<EnvironmentalData>,
    params: &ClusterParams,
) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut unvisited = data;

    while !unvisited.is_empty() {
        let seed = unvisited.remove(0);
        let seed_point = seed.point;
        let mut members = vec![seed];

        let mut i = unvisited.len();
        while i > 0 {
            i -= 1;
            if haversine_distance_km(seed_point, unvisited[i].point) <= params.max_radius_km {
                members.push(unvisited.remove(i));
            }
        }

        if members.len() >= params.min_points_per_cluster {
            clusters.push(Cluster {
                center: cluster_center(&members),
                average_conditions: average_conditions(&members),
                points: members,
            });
        }
    }

    info!(clusters = clusters.len(), "clustered sample points");
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(lat: f64, lon: f64, temperature: f64) -> EnvironmentalData {
        EnvironmentalData {
            point: Point::new(lat, lon),
            place_name: String::from("Test"),
            temperature,
            humidity: 40.0,
            wind_speed: 3.0,
            wind_direction: 180.0,
            vegetation_density: 0.5,
            soil_moisture: SoilMoisture {
                surface: 0.3,
                root_zone: 0.4,
                profile: 0.5,
            },
            topography: Topography { slope: 10.0 },
        }
    }

    /// Five points within ~1.5 km of the origin plus one far away.
    fn tight_group_and_outlier() -> Vec<EnvironmentalData> {
        vec![
            sample(0.00, 0.00, 10.0),
            sample(0.01, 0.00, 20.0),
            sample(0.00, 0.01, 30.0),
            sample(0.01, 0.01, 40.0),
            sample(0.005, 0.005, 50.0),
            sample(5.0, 5.0, 99.0),
        ]
    }

    #[test]
    fn test_clusters_drop_small_groups_without_duplication() {
        let data = tight_group_and_outlier();
        let clusters = find_environmental_clusters(data, &ClusterParams::default());

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].points.len(), 5);
        // The outlier is dropped, not attached anywhere.
        assert!(clusters[0].points.iter().all(|p| p.point.lat < 1.0));
    }

    #[test]
    fn test_average_temperature_is_exact_mean() {
        let data = tight_group_and_outlier();
        let clusters = find_environmental_clusters(data, &ClusterParams::default());
        let mean = (10.0 + 20.0 + 30.0 + 40.0 + 50.0) / 5.0;
        assert_eq!(clusters[0].average_conditions.temperature, mean);
    }

    #[test]
    fn test_centroid_is_unweighted_mean() {
        let data = tight_group_and_outlier();
        let clusters = find_environmental_clusters(data, &ClusterParams::default());
        let center = clusters[0].center;
        assert_relative_eq!(center.lat, (0.0 + 0.01 + 0.0 + 0.01 + 0.005) / 5.0);
        assert_relative_eq!(center.lon, (0.0 + 0.0 + 0.01 + 0.01 + 0.005) / 5.0);
    }

    #[test]
    fn test_sentinels_fold_into_soil_average() {
        let mut data = tight_group_and_outlier();
        data[1].soil_moisture = SoilMoisture::sentinel();
        let clusters = find_environmental_clusters(data, &ClusterParams::default());
        let surface = clusters[0].average_conditions.soil_moisture.surface;
        assert_relative_eq!(surface, (0.3 * 4.0 - 999.0) / 5.0);
    }

    #[test]
    fn test_membership_is_distance_to_seed() {
        // Chain: a-b within radius, b-c within radius, a-c outside. With
        // single-linkage-to-seed, c is excluded from a's cluster.
        let params = ClusterParams {
            max_radius_km: 5.0,
            min_points_per_cluster: 1,
        };
        let data = vec![
            sample(0.0, 0.0, 1.0),
            sample(0.04, 0.0, 2.0), // ~4.4 km from seed
            sample(0.08, 0.0, 3.0), // ~8.9 km from seed, 4.4 km from b
        ];
        let clusters = find_environmental_clusters(data, &params);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].points.len(), 2);
        assert_eq!(clusters[1].points.len(), 1);
    }
}
