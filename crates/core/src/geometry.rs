//! Geodetic helpers shared by the sampling and clustering stages.
//!
//! All math works on plain WGS84 degree coordinates. Area and step
//! calculations use the flat-earth approximation of 111 km per degree of
//! latitude, which is accurate enough for the region sizes this pipeline
//! accepts (tens to a few hundred kilometres per side).

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres, used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// A WGS84 coordinate in degrees.
///
/// Latitude is expected in `[-90, 90]` and longitude in `[-180, 180]`;
/// the pipeline never generates points outside the request region so no
/// runtime validation is performed here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// An axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// The request region: either a bounding box or an ordered polygon.
///
/// Exactly one representation is active per request. Polygons are expected
/// to carry at least four vertices; smaller vertex lists disable the
/// containment filter (see [`point_in_polygon`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Region {
    BoundingBox(BoundingBox),
    Polygon(Vec<Point>),
}

impl Region {
    /// The effective bounding box used for area and lattice calculations.
    ///
    /// A bounding-box region passes through unchanged. For a polygon the
    /// envelope is derived by averaging the two smallest and the two largest
    /// latitudes and longitudes independently. This deliberately shrinks the
    /// envelope below the true bounding box; the behavior is inherited from
    /// the system this pipeline replaces and is kept for compatibility.
    pub fn effective_bbox(&self) -> BoundingBox {
        match self {
            Region::BoundingBox(bbox) => *bbox,
            Region::Polygon(vertices) => {
                let mut lats: Vec<f64> = vertices.iter().map(|v| v.lat).collect();
                let mut lons: Vec<f64> = vertices.iter().map(|v| v.lon).collect();
                lats.sort_by(f64::total_cmp);
                lons.sort_by(f64::total_cmp);

                if lats.len() < 2 {
                    // Degenerate polygon: collapse to the single vertex.
                    let lat = lats.first().copied().unwrap_or(0.0);
                    let lon = lons.first().copied().unwrap_or(0.0);
                    return BoundingBox {
                        min_lat: lat,
                        max_lat: lat,
                        min_lon: lon,
                        max_lon: lon,
                    };
                }

                let n = lats.len();
                BoundingBox {
                    min_lat: 0.5 * (lats[0] + lats[1]),
                    max_lat: 0.5 * (lats[n - 2] + lats[n - 1]),
                    min_lon: 0.5 * (lons[0] + lons[1]),
                    max_lon: 0.5 * (lons[n - 2] + lons[n - 1]),
                }
            }
        }
    }

    /// Polygon vertices when this region is a polygon with a usable ring.
    pub fn polygon(&self) -> Option<&[Point]> {
        match self {
            Region::BoundingBox(_) => None,
            Region::Polygon(vertices) => Some(vertices.as_slice()),
        }
    }
}

/// Approximate region area in square kilometres.
///
/// `lat_km = Δlat * 111`, `lon_km = Δlon * cos(mean_lat) * 111`, area is
/// their product. Polygon regions go through the shrunken effective envelope.
pub fn area_size_km2(region: &Region) -> f64 {
    let bbox = region.effective_bbox();
    let lat_distance = (bbox.max_lat - bbox.min_lat) * KM_PER_DEGREE;
    let mean_lat = (bbox.min_lat + bbox.max_lat) / 2.0;
    let lon_distance = (bbox.max_lon - bbox.min_lon) * mean_lat.to_radians().cos() * KM_PER_DEGREE;
    lat_distance * lon_distance
}

/// Which clamp window applies to the suggested sample count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// Single-site recommendation: 30 to 400 samples.
    Point,
    /// Wildfire-risk survey: 100 to 400 samples.
    Ranking,
}

impl SampleMode {
    fn clamp_range(self) -> (f64, f64) {
        match self {
            SampleMode::Point => (30.0, 400.0),
            SampleMode::Ranking => (100.0, 400.0),
        }
    }
}

/// Number of sample points for a region of the given area.
///
/// Baseline density is 100 samples per 100 km²; the suggested count is
/// `ceil((area / 100) * 100)` clamped to the mode's window.
pub fn sample_count(area_km2: f64, mode: SampleMode) -> usize {
    const BASE_DENSITY: f64 = 100.0;
    let suggested = ((area_km2 / 100.0) * BASE_DENSITY).ceil();
    let (lo, hi) = mode.clamp_range();
    suggested.clamp(lo, hi) as usize
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_distance_km(p1: Point, p2: Point) -> f64 {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Even-odd (ray casting) point-in-polygon test.
///
/// A query point that coincides with a vertex is inside. Polygons with
/// fewer than four vertices impose no constraint: every point is inside.
pub fn point_in_polygon(lat: f64, lon: f64, polygon: &[Point]) -> bool {
    if polygon.len() < 4 {
        return true;
    }

    let x = lon;
    let y = lat;
    let mut inside = false;

    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let xi = polygon[i].lon;
        let yi = polygon[i].lat;
        let xj = polygon[j].lon;
        let yj = polygon[j].lat;

        if xi == x && yi == y {
            return true;
        }

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_polygon() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ]
    }

    #[test]
    fn test_area_size_equatorial_degree() {
        let region = Region::BoundingBox(BoundingBox {
            min_lat: -0.5,
            max_lat: 0.5,
            min_lon: 10.0,
            max_lon: 11.0,
        });
        // cos(0) == 1, so the square degree is 111 * 111 km².
        assert_relative_eq!(area_size_km2(&region), 111.0 * 111.0, max_relative = 1e-6);
    }

    #[test]
    fn test_polygon_envelope_shrinks_below_true_bbox() {
        let region = Region::Polygon(square_polygon());
        let bbox = region.effective_bbox();
        // Two smallest latitudes are 0 and 0, two largest are 10 and 10,
        // so the square survives; a skewed ring would shrink.
        assert_eq!(bbox.min_lat, 0.0);
        assert_eq!(bbox.max_lat, 10.0);

        let skewed = Region::Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(6.0, 0.0),
        ]);
        let bbox = skewed.effective_bbox();
        assert_eq!(bbox.min_lat, 1.0); // (0 + 2) / 2
        assert_eq!(bbox.max_lat, 8.0); // (6 + 10) / 2
    }

    #[test]
    fn test_sample_count_monotonic_and_clamped() {
        let mut previous = 0;
        for area in [0.0, 1.0, 50.0, 100.0, 250.0, 400.0, 12321.0] {
            let count = sample_count(area, SampleMode::Point);
            assert!(count >= previous, "sample count must be non-decreasing");
            assert!((30..=400).contains(&count));
            previous = count;
        }
        // One square degree at the equator clamps to the ceiling.
        assert_eq!(sample_count(111.0 * 111.0, SampleMode::Point), 400);
        // The ranking survey uses a higher floor.
        assert_eq!(sample_count(0.0, SampleMode::Ranking), 100);
        assert_eq!(sample_count(12321.0, SampleMode::Ranking), 400);
    }

    #[test]
    fn test_haversine_identity_and_triangle_inequality() {
        let a = Point::new(-33.86, 151.21);
        let b = Point::new(-37.81, 144.96);
        let c = Point::new(-31.95, 115.86);

        assert_eq!(haversine_distance_km(a, a), 0.0);

        let ab = haversine_distance_km(a, b);
        let bc = haversine_distance_km(b, c);
        let ac = haversine_distance_km(a, c);
        assert!(ac <= ab + bc + 1e-9);

        // Sydney to Melbourne is roughly 714 km.
        assert_relative_eq!(ab, 714.0, max_relative = 0.02);
    }

    #[test]
    fn test_point_in_polygon_basics() {
        let polygon = square_polygon();
        assert!(point_in_polygon(5.0, 5.0, &polygon));
        assert!(!point_in_polygon(15.0, 5.0, &polygon));
        // A vertex hit is inside by definition.
        assert!(point_in_polygon(10.0, 10.0, &polygon));
    }

    #[test]
    fn test_point_in_polygon_vertex_order_reversal() {
        let polygon = square_polygon();
        let mut reversed = polygon.clone();
        reversed.reverse();

        for (lat, lon) in [(5.0, 5.0), (15.0, 5.0), (-1.0, -1.0), (9.9, 0.1)] {
            assert_eq!(
                point_in_polygon(lat, lon, &polygon),
                point_in_polygon(lat, lon, &reversed),
                "even-odd rule must not depend on winding order ({lat},{lon})"
            );
        }
    }

    #[test]
    fn test_small_polygon_imposes_no_constraint() {
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
        ];
        assert!(point_in_polygon(50.0, 50.0, &triangle));
    }
}
