//! Caller-driven scene preparation.
//!
//! Whenever new stream data arrives or the configuration changes, the caller
//! runs [`prepare_scene`] (or [`prepare_from_streams`]) and hands the
//! resulting points and camera pose to its renderer. Nothing is cached
//! between calls; debouncing rapid re-triggers is up to the caller.

use glam::DVec3;
use log::{debug, info};

use crate::camera::{fit_camera, CameraPose, Projection};
use crate::config::VisualizationConfig;
use crate::error::SceneError;
use crate::geo_utils::{bounds_extent_meters, polyline_length, total_ascent};
use crate::normalize::{normalize_within, SampleExtent};
use crate::streams::ActivityStreams;
use crate::{Bounds, GpsPoint};

/// Static geometry and camera pose for one data snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    /// Scene-space path, index-aligned with the input samples.
    pub points: Vec<DVec3>,
    /// Pose to apply to the active camera.
    pub pose: CameraPose,
    /// Geographic bounding box of the samples.
    pub bounds: Bounds,
    /// Route length along the ground in meters.
    pub route_length_m: f64,
    /// Total climb in meters.
    pub elevation_gain_m: f64,
    /// East-west and north-south size of the route in meters.
    pub extent_m: (f64, f64),
}

/// Outcome of a preparation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneState {
    /// No samples; the caller shows its "no data" presentation.
    NoData,
    /// A drawable path.
    Ready(SceneFrame),
}

impl SceneState {
    pub fn frame(&self) -> Option<&SceneFrame> {
        match self {
            Self::Ready(frame) => Some(frame),
            Self::NoData => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Normalize samples and frame them with a perspective camera.
///
/// `previous` is the camera's current pose. It is only used when there is
/// nothing to frame, in which case the result is [`SceneState::NoData`] and
/// the camera should stay where it is.
///
/// ```rust
/// use route_scene::{prepare_scene, CameraPose, GpsPoint, SceneState, VisualizationConfig};
///
/// let samples = vec![GpsPoint::new(45.0, -73.0), GpsPoint::new(45.01, -72.99)];
/// let elevations = vec![Some(10.0), Some(20.0)];
///
/// let state = prepare_scene(&samples, &elevations, &VisualizationConfig::default(), CameraPose::default());
/// let frame = state.frame().unwrap();
/// assert_eq!(frame.points.len(), 2);
/// assert_eq!(frame.elevation_gain_m, 10.0);
///
/// let empty = prepare_scene(&[], &[], &VisualizationConfig::default(), CameraPose::default());
/// assert_eq!(empty, SceneState::NoData);
/// ```
pub fn prepare_scene(
    samples: &[GpsPoint],
    elevations: &[Option<f64>],
    config: &VisualizationConfig,
    previous: CameraPose,
) -> SceneState {
    prepare_scene_with(samples, elevations, config, &Projection::perspective(&config.camera), previous)
}

/// [`prepare_scene`] with an explicit projection.
pub fn prepare_scene_with(
    samples: &[GpsPoint],
    elevations: &[Option<f64>],
    config: &VisualizationConfig,
    projection: &Projection,
    previous: CameraPose,
) -> SceneState {
    let elevation_at = |i: usize| elevations.get(i).copied().flatten();
    let Some(extent) = SampleExtent::scan(samples, elevation_at) else {
        debug!("[Pipeline] No samples, nothing to frame");
        return SceneState::NoData;
    };
    let bounds = extent.bounds();

    let points = normalize_within(samples, &extent, elevation_at, &config.coordinates);
    let pose = fit_camera(&points, projection, &config.camera, previous);

    let frame = SceneFrame {
        route_length_m: polyline_length(samples),
        elevation_gain_m: total_ascent(elevations),
        extent_m: bounds_extent_meters(&bounds),
        bounds,
        points,
        pose,
    };

    info!(
        "[Pipeline] Prepared {} points ({:.0}m, +{:.0}m), camera at ({:.2}, {:.2}, {:.2})",
        frame.points.len(),
        frame.route_length_m,
        frame.elevation_gain_m,
        frame.pose.position.x,
        frame.pose.position.y,
        frame.pose.position.z
    );

    SceneState::Ready(frame)
}

/// Prepare a scene from decoded activity streams.
///
/// The `latlng` stream is required; a missing `altitude` stream yields a flat
/// path.
pub fn prepare_from_streams(
    streams: &ActivityStreams,
    config: &VisualizationConfig,
    previous: CameraPose,
) -> Result<SceneState, SceneError> {
    if streams.latlng.is_none() {
        return Err(SceneError::MissingStream("latlng"));
    }
    if streams.altitude.is_none() {
        debug!("[Pipeline] No altitude stream, rendering a flat path");
    }

    Ok(prepare_scene(&streams.geo_samples(), &streams.elevations(), config, previous))
}

/// Prepare scenes for many activities using parallel processing.
///
/// Each activity is framed independently from the default camera pose.
#[cfg(feature = "parallel")]
pub fn prepare_scenes_parallel(
    activities: &[ActivityStreams],
    config: &VisualizationConfig,
) -> Vec<Result<SceneState, SceneError>> {
    use rayon::prelude::*;

    activities
        .par_iter()
        .map(|streams| prepare_from_streams(streams, config, CameraPose::default()))
        .collect()
}
