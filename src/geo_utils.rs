//! # Geographic Utilities
//!
//! Real-world summaries of an activity track, reported next to the scene
//! geometry so a viewer can label the path it draws.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a GPS track in meters |
//! | [`total_ascent`] | Sum of positive elevation changes along a track |
//! | [`bounds_extent_meters`] | East-west and north-south size of a bounding box |
//!
//! ## Example
//!
//! ```rust
//! use route_scene::{GpsPoint, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(45.00, -73.00),
//!     GpsPoint::new(45.01, -73.00),
//!     GpsPoint::new(45.01, -72.99),
//! ];
//!
//! let length = geo_utils::polyline_length(&track);
//! assert!(length > 1500.0 && length < 2000.0);
//!
//! let gain = geo_utils::total_ascent(&[Some(10.0), Some(20.0), Some(15.0)]);
//! assert_eq!(gain, 10.0);
//! ```
//!
//! ## Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees), the
//! standard used by GPS receivers and fitness services.

use geo::{Distance, Haversine, Point};

use crate::{Bounds, GpsPoint};

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (spherical Earth,
/// radius 6,371 km).
///
/// # Example
///
/// ```rust
/// use route_scene::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a GPS track in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point tracks return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Elevation Functions
// =============================================================================

/// Sum of positive elevation changes in meters.
///
/// Gaps are skipped: the climb is measured between consecutive *present*
/// samples, so a missing reading does not register as a drop to zero.
pub fn total_ascent(elevations: &[Option<f64>]) -> f64 {
    let mut gain = 0.0;
    let mut prev: Option<f64> = None;

    for ele in elevations.iter().flatten() {
        if let Some(p) = prev {
            if *ele > p {
                gain += ele - p;
            }
        }
        prev = Some(*ele);
    }

    gain
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// East-west and north-south size of a bounding box in meters.
///
/// The east-west span is measured along the box's middle latitude, where a
/// degree of longitude is representative of the whole box.
///
/// # Returns
///
/// Tuple of (width_meters, height_meters).
pub fn bounds_extent_meters(bounds: &Bounds) -> (f64, f64) {
    let center = bounds.center();
    let west = GpsPoint::new(center.latitude, bounds.min_lng);
    let east = GpsPoint::new(center.latitude, bounds.max_lng);
    let south = GpsPoint::new(bounds.min_lat, center.longitude);
    let north = GpsPoint::new(bounds.max_lat, center.longitude);

    (haversine_distance(&west, &east), haversine_distance(&south, &north))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(45.0, -73.0);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_one_hundredth_degree_latitude() {
        // 0.01 degrees of latitude is ~1.11 km anywhere on the globe
        let a = GpsPoint::new(45.0, -73.0);
        let b = GpsPoint::new(45.01, -73.0);
        assert!(approx_eq(haversine_distance(&a, &b), 1112.0, 5.0));
    }

    #[test]
    fn test_polyline_length_empty_and_single() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[GpsPoint::new(45.0, -73.0)]), 0.0);
    }

    #[test]
    fn test_polyline_length_sums_segments() {
        let track = vec![
            GpsPoint::new(45.0, -73.0),
            GpsPoint::new(45.01, -73.0),
            GpsPoint::new(45.01, -72.99),
        ];
        let expected = haversine_distance(&track[0], &track[1]) + haversine_distance(&track[1], &track[2]);
        assert_eq!(polyline_length(&track), expected);
    }

    #[test]
    fn test_total_ascent() {
        assert_eq!(total_ascent(&[]), 0.0);
        assert_eq!(total_ascent(&[Some(10.0), Some(20.0), Some(15.0), Some(30.0)]), 25.0);
    }

    #[test]
    fn test_total_ascent_skips_gaps() {
        // The gap must not count as a drop to 0 followed by a 25 m climb
        assert_eq!(total_ascent(&[Some(20.0), None, Some(25.0)]), 5.0);
    }

    #[test]
    fn test_bounds_extent_meters() {
        let bounds = Bounds { min_lat: 45.0, max_lat: 45.01, min_lng: -73.0, max_lng: -72.99 };
        let (width, height) = bounds_extent_meters(&bounds);
        assert!(approx_eq(height, 1112.0, 5.0));
        // Longitude degrees shrink with cos(latitude)
        assert!(width < height);
        assert!(approx_eq(width, 1112.0 * 45.005_f64.to_radians().cos(), 5.0));
    }
}
