//! Coordinate normalization: GPS samples to scene-space points.
//!
//! Longitude maps to x, latitude to z (north is +z) and elevation to y. Both
//! planar axes share one scale factor so the route keeps its shape; the
//! larger of the latitude/longitude extents spans `coordinates.scale` scene
//! units.
//!
//! ```rust
//! use route_scene::{normalize_coordinates, CoordinateOptions, GpsPoint};
//!
//! let samples = vec![
//!     GpsPoint::new(45.0, -73.0),
//!     GpsPoint::new(45.01, -73.0),
//!     GpsPoint::new(45.01, -72.99),
//! ];
//! let points = normalize_coordinates(&samples, &[10.0, 20.0, 15.0], &CoordinateOptions::default());
//!
//! assert_eq!(points.len(), 3);
//! assert!((points[0].x + 5.0).abs() < 1e-9);
//! assert!((points[0].z + 5.0).abs() < 1e-9);
//! ```

use glam::DVec3;

use crate::config::CoordinateOptions;
use crate::{Bounds, GpsPoint};

/// A point in scene units: x = east, y = up, z = north.
pub type NormalizedPoint = DVec3;

/// Extents gathered in the single pass over the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleExtent {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    /// `None` when no index carries an elevation.
    pub elevation: Option<(f64, f64)>,
}

impl SampleExtent {
    /// Scan samples and the elevations present at their indices.
    ///
    /// Returns `None` for an empty sample sequence.
    pub fn scan<F>(samples: &[GpsPoint], elevation_at: F) -> Option<Self>
    where
        F: Fn(usize) -> Option<f64>,
    {
        if samples.is_empty() {
            return None;
        }

        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lng = f64::INFINITY;
        let mut max_lng = f64::NEG_INFINITY;
        let mut elevation: Option<(f64, f64)> = None;

        for (i, p) in samples.iter().enumerate() {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);

            if let Some(ele) = elevation_at(i) {
                elevation = Some(match elevation {
                    Some((lo, hi)) => (lo.min(ele), hi.max(ele)),
                    None => (ele, ele),
                });
            }
        }

        Some(Self { min_lat, max_lat, min_lng, max_lng, elevation })
    }

    /// The geographic part of the extent.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_lat: self.min_lat,
            max_lat: self.max_lat,
            min_lng: self.min_lng,
            max_lng: self.max_lng,
        }
    }

    /// Midpoint of the latitude range.
    pub fn center_lat(&self) -> f64 {
        (self.min_lat + self.max_lat) / 2.0
    }

    /// Midpoint of the longitude range.
    pub fn center_lng(&self) -> f64 {
        (self.min_lng + self.max_lng) / 2.0
    }

    /// Latitude range, with a zero range replaced by 1.
    pub fn lat_range(&self) -> f64 {
        non_degenerate(self.max_lat - self.min_lat)
    }

    /// Longitude range, with a zero range replaced by 1.
    pub fn lng_range(&self) -> f64 {
        non_degenerate(self.max_lng - self.min_lng)
    }

    /// Scene units per degree, shared by x and z.
    pub fn planar_scale(&self, options: &CoordinateOptions) -> f64 {
        options.scale / self.lat_range().max(self.lng_range())
    }
}

// A flat axis would divide by zero; a range of 1 degree under-scales it instead.
#[inline]
fn non_degenerate(range: f64) -> f64 {
    if range == 0.0 {
        1.0
    } else {
        range
    }
}

/// Normalize GPS samples with a dense elevation sequence.
///
/// `elevations` may be shorter than `samples`; indices past its end get
/// zero height.
pub fn normalize_coordinates(
    samples: &[GpsPoint],
    elevations: &[f64],
    options: &CoordinateOptions,
) -> Vec<NormalizedPoint> {
    normalize_with(samples, |i| elevations.get(i).copied(), options)
}

/// Normalize GPS samples with an elevation sequence that may have gaps.
///
/// A `None` (or an index past the end) contributes zero height; it is not
/// treated as the minimum elevation.
pub fn normalize_sparse(
    samples: &[GpsPoint],
    elevations: &[Option<f64>],
    options: &CoordinateOptions,
) -> Vec<NormalizedPoint> {
    normalize_with(samples, |i| elevations.get(i).copied().flatten(), options)
}

fn normalize_with<F>(samples: &[GpsPoint], elevation_at: F, options: &CoordinateOptions) -> Vec<NormalizedPoint>
where
    F: Fn(usize) -> Option<f64>,
{
    match SampleExtent::scan(samples, &elevation_at) {
        Some(extent) => normalize_within(samples, &extent, elevation_at, options),
        None => Vec::new(),
    }
}

/// Normalize against an extent the caller already scanned.
///
/// `extent` must come from [`SampleExtent::scan`] over the same `samples`
/// and `elevation_at`.
pub fn normalize_within<F>(
    samples: &[GpsPoint],
    extent: &SampleExtent,
    elevation_at: F,
    options: &CoordinateOptions,
) -> Vec<NormalizedPoint>
where
    F: Fn(usize) -> Option<f64>,
{
    let planar_scale = extent.planar_scale(options);
    let elevation_scale = planar_scale * options.elevation_scale;

    let (origin_lat, origin_lng) = if options.center_at_origin {
        (extent.center_lat(), extent.center_lng())
    } else {
        (0.0, 0.0)
    };

    samples
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = (p.longitude - origin_lng) * planar_scale;
            let z = (p.latitude - origin_lat) * planar_scale;
            let y = match (elevation_at(i), extent.elevation) {
                (Some(ele), Some((min_ele, max_ele))) if max_ele > min_ele => {
                    (ele - min_ele) / (max_ele - min_ele) * elevation_scale
                }
                _ => 0.0,
            };
            DVec3::new(x, y, z)
        })
        .collect()
}
