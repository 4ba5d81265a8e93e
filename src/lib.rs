//! # Route Scene
//!
//! Turn recorded GPS activities into 3D scenes.
//!
//! This library provides:
//! - Coordinate normalization: latitude/longitude/elevation samples to a
//!   bounded, centered, uniformly scaled point sequence
//! - Camera framing: a pose that keeps the whole path in view, with north up
//! - YAML (or TOML) visualization configuration with fail-soft loading
//! - Activity stream decoding and (optionally) a Strava API client
//!
//! ## Features
//!
//! - **`parallel`** - Prepare many activities' scenes with rayon
//! - **`http`** - Enable the HTTP client for activity and config fetching
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_scene::{GpsPoint, VisualizationConfig, CameraPose, prepare_scene};
//!
//! let samples = vec![
//!     GpsPoint::new(45.0, -73.0),
//!     GpsPoint::new(45.01, -73.0),
//!     GpsPoint::new(45.01, -72.99),
//! ];
//! let elevations = vec![Some(10.0), Some(20.0), Some(15.0)];
//!
//! let config = VisualizationConfig::default();
//! let state = prepare_scene(&samples, &elevations, &config, CameraPose::default());
//!
//! if let Some(frame) = state.frame() {
//!     println!("{} points, camera at {:?}", frame.points.len(), frame.pose.position);
//! }
//! ```

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod geo_utils;
pub mod normalize;
pub mod pipeline;
pub mod streams;

// HTTP module for activity fetching
#[cfg(feature = "http")]
pub mod http;

pub use camera::{fit_camera, fit_distance, CameraPose, PathBox, Projection, NORTH, VERTICAL};
pub use color::{animated_color, hsl_to_rgb, path_hue, Rgb};
pub use config::{
    load_config_as, load_config_from_file, load_config_from_str, CameraOptions, ConfigFormat,
    CoordinateOptions, PathAnimation, PathOptions, VisualizationConfig,
};
pub use error::SceneError;
pub use normalize::{normalize_coordinates, normalize_sparse, normalize_within, NormalizedPoint, SampleExtent};
pub use pipeline::{prepare_from_streams, prepare_scene, prepare_scene_with, SceneFrame, SceneState};
pub use streams::{ActivityStreams, Stream, StreamType};

#[cfg(feature = "http")]
pub use config::load_config_from_url;

#[cfg(feature = "http")]
pub use http::{ActivitySummary, Credentials, OAuthApp, StravaClient, StreamFetchResult, TokenSet};

#[cfg(feature = "parallel")]
pub use pipeline::prepare_scenes_parallel;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use route_scene::GpsPoint;
/// let point = GpsPoint::new(45.5017, -73.5673); // Montreal
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Geographic bounding box of a route.
///
/// Produced by [`SampleExtent::bounds`] from the normalizer's single scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
