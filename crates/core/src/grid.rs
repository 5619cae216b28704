//! Sample-grid generation: turns a request region into a bounded set of
//! candidate coordinates, filtered to usable terrain.
//!
//! The lattice shape follows the region's aspect ratio so samples are spaced
//! roughly evenly in both axes. Predicate checks are provider calls and run
//! concurrently on the rayon pool; a failing provider marks its predicate
//! false for that single point and the batch carries on.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::geometry::{point_in_polygon, BoundingBox, Point, Region};
use crate::sources::SourceSet;

/// Which predicates a lattice point must pass to survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Land, rural and polygon containment (burn-site recommendation).
    Strict,
    /// Land only (wildfire-risk survey).
    LandOnly,
}

/// Enumerate the evenly spaced lattice for a bounding box.
///
/// `area_ratio = Δlon / Δlat`; the row count is `sqrt(n / area_ratio)`
/// rounded half-up and the column count is `row_count * area_ratio`, kept
/// fractional and enumerated `ceil` times so a 19.6-column grid yields 20
/// columns. Step denominators are clamped to 1 to guard single-row or
/// single-column grids. Points are produced in row-major order.
pub fn lattice_points(bbox: &BoundingBox, count: usize) -> Vec<Point> {
    let d_lat = bbox.max_lat - bbox.min_lat;
    let d_lon = bbox.max_lon - bbox.min_lon;
    let area_ratio = d_lon / d_lat;

    let raw_height = (count as f64 / area_ratio).sqrt();
    let grid_height = if raw_height - raw_height.trunc() >= 0.5 {
        raw_height.ceil()
    } else {
        raw_height.floor()
    };
    let grid_width = grid_height * area_ratio;

    if !grid_height.is_finite() || !grid_width.is_finite() || grid_height < 1.0 || grid_width <= 0.0
    {
        return Vec::new();
    }

    let lat_step = d_lat / (grid_height - 1.0).max(1.0);
    let lon_step = d_lon / (grid_width - 1.0).max(1.0);

    let rows = grid_height as usize;
    let cols = grid_width.ceil() as usize;
    debug!(rows, cols, lat_step, lon_step, "lattice dimensions");

    let mut points = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            points.push(Point {
                lat: bbox.min_lat + i as f64 * lat_step,
                lon: bbox.min_lon + j as f64 * lon_step,
            });
        }
    }
    points
}

fn fail_closed(predicate: &'static str, point: Point, result: Result<bool, SourceError>) -> bool {
    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(
                predicate,
                lat = point.lat,
                lon = point.lon,
                %error,
                "predicate provider failed; treating as false"
            );
            false
        }
    }
}

/// Generate up to `count` sample points for a region.
///
/// Lattice points are kept when they are on land, rural (in [`FilterMode::Strict`])
/// and inside the polygon (when the region is one). Survivors are truncated
/// to the first `count` in row-major order; no retry happens when fewer
/// survive — downstream stages report the structural failure instead.
pub fn generate_sample_points(
    sources: &SourceSet,
    region: &Region,
    count: usize,
    mode: FilterMode,
) -> Vec<Point> {
    let bbox = region.effective_bbox();
    let lattice = lattice_points(&bbox, count);
    info!(
        lattice_len = lattice.len(),
        target = count,
        ?mode,
        "filtering sample lattice"
    );

    let keep: Vec<bool> = lattice
        .par_iter()
        .map(|&point| {
            let (is_land, is_rural) = rayon::join(
                || fail_closed("land", point, sources.land.is_land(point)),
                || match mode {
                    FilterMode::Strict => {
                        fail_closed("rural", point, sources.urban.is_rural(point))
                    }
                    FilterMode::LandOnly => true,
                },
            );
            let inside = match (mode, region.polygon()) {
                (FilterMode::Strict, Some(polygon)) => {
                    point_in_polygon(point.lat, point.lon, polygon)
                }
                _ => true,
            };
            is_land && is_rural && inside
        })
        .collect();

    let survivors: Vec<Point> = lattice
        .into_iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(point))
        .take(count)
        .collect();

    info!(survivors = survivors.len(), "sample grid filtered");
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bbox() -> BoundingBox {
        BoundingBox {
            min_lat: 0.0,
            max_lat: 1.0,
            min_lon: 0.0,
            max_lon: 1.0,
        }
    }

    #[test]
    fn test_square_lattice_covers_target_count() {
        // area_ratio == 1, so 400 samples give a 20x20 lattice.
        let points = lattice_points(&unit_bbox(), 400);
        assert_eq!(points.len(), 400);
        assert_eq!(points[0], Point::new(0.0, 0.0));
        // Row-major: the second point advances longitude first.
        assert_eq!(points[1].lat, 0.0);
        assert!(points[1].lon > 0.0);
        let last = points[points.len() - 1];
        assert_eq!(last, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_fractional_width_rounds_columns_up() {
        // Δlon/Δlat = 2, height = round(sqrt(30/2)) = round(3.87) = 4,
        // width = 8.0 exactly; with count 31 height stays 4 (sqrt(15.5)=3.94)
        // and width 7.87 enumerates 8 columns.
        let bbox = BoundingBox {
            min_lat: 0.0,
            max_lat: 1.0,
            min_lon: 0.0,
            max_lon: 2.0,
        };
        let points = lattice_points(&bbox, 30);
        assert_eq!(points.len(), 4 * 8);
    }

    #[test]
    fn test_tall_grid_rounds_half_up() {
        // area_ratio = 0.5: sqrt(30/0.5) = 7.74 -> height 8, width 4.0
        // enumerates 8 * 4 points.
        let bbox = BoundingBox {
            min_lat: 0.0,
            max_lat: 2.0,
            min_lon: 0.0,
            max_lon: 1.0,
        };
        let points = lattice_points(&bbox, 30);
        assert_eq!(points.len(), 8 * 4);
    }

    #[test]
    fn test_degenerate_ratio_yields_empty_lattice() {
        let bbox = BoundingBox {
            min_lat: 0.0,
            max_lat: 0.0,
            min_lon: 0.0,
            max_lon: 1.0,
        };
        assert!(lattice_points(&bbox, 100).is_empty());
    }
}
