//! Activity stream decoding.
//!
//! Fitness services return an activity's recorded samples as named streams.
//! Requested with `key_by_type=true`, the payload is an object keyed by
//! stream type:
//!
//! ```json
//! {
//!   "latlng":   { "data": [[45.0, -73.0], [45.01, -73.0]], "series_type": "distance",
//!                 "original_size": 2, "resolution": "high" },
//!   "altitude": { "data": [10.0, 20.0], "series_type": "distance",
//!                 "original_size": 2, "resolution": "high" }
//! }
//! ```
//!
//! Only the streams the scene needs are typed; the rest are ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::GpsPoint;

/// Stream types a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Time,
    Latlng,
    Distance,
    Altitude,
    VelocitySmooth,
    Heartrate,
    Cadence,
    Watts,
    Temp,
    Moving,
    GradeSmooth,
}

impl StreamType {
    /// Streams fetched when the caller does not ask for specific ones.
    pub const DEFAULT_SET: [StreamType; 4] =
        [StreamType::Time, StreamType::Latlng, StreamType::Distance, StreamType::Altitude];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Latlng => "latlng",
            Self::Distance => "distance",
            Self::Altitude => "altitude",
            Self::VelocitySmooth => "velocity_smooth",
            Self::Heartrate => "heartrate",
            Self::Cadence => "cadence",
            Self::Watts => "watts",
            Self::Temp => "temp",
            Self::Moving => "moving",
            Self::GradeSmooth => "grade_smooth",
        }
    }

    /// Comma-separated list as used in the `keys` query parameter.
    pub fn join(types: &[StreamType]) -> String {
        types.iter().map(StreamType::as_str).collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "time" => Self::Time,
            "latlng" => Self::Latlng,
            "distance" => Self::Distance,
            "altitude" => Self::Altitude,
            "velocity_smooth" => Self::VelocitySmooth,
            "heartrate" => Self::Heartrate,
            "cadence" => Self::Cadence,
            "watts" => Self::Watts,
            "temp" => Self::Temp,
            "moving" => Self::Moving,
            "grade_smooth" => Self::GradeSmooth,
            other => return Err(format!("unknown stream type '{}'", other)),
        })
    }
}

/// One named stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub series_type: String,
    #[serde(default)]
    pub original_size: usize,
    #[serde(default)]
    pub resolution: String,
}

impl<T> Stream<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The streams a scene is built from, decoded from a keyed-by-type payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStreams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<Stream<[f64; 2]>>,
    /// Elevation in meters. Individual samples may be null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<Stream<Option<f64>>>,
    /// Cumulative distance in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Stream<f64>>,
    /// Seconds since the activity start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Stream<f64>>,
}

impl ActivityStreams {
    /// Decode a keyed-by-type JSON payload.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build streams directly from samples, e.g. for tests or local files.
    pub fn from_samples(samples: &[GpsPoint], elevations: &[f64]) -> Self {
        Self {
            latlng: Some(Stream {
                data: samples.iter().map(|p| [p.latitude, p.longitude]).collect(),
                series_type: "distance".to_string(),
                original_size: samples.len(),
                resolution: "high".to_string(),
            }),
            altitude: Some(Stream {
                data: elevations.iter().copied().map(Some).collect(),
                series_type: "distance".to_string(),
                original_size: elevations.len(),
                resolution: "high".to_string(),
            }),
            distance: None,
            time: None,
        }
    }

    /// GPS samples in recording order, empty when there is no `latlng` stream.
    pub fn geo_samples(&self) -> Vec<GpsPoint> {
        self.latlng
            .as_ref()
            .map(|s| s.data.iter().map(|[lat, lng]| GpsPoint::new(*lat, *lng)).collect())
            .unwrap_or_default()
    }

    /// Elevations index-aligned with [`geo_samples`](Self::geo_samples).
    pub fn elevations(&self) -> Vec<Option<f64>> {
        self.altitude.as_ref().map(|s| s.data.clone()).unwrap_or_default()
    }

    /// Whether the payload has any GPS samples at all.
    pub fn has_route(&self) -> bool {
        self.latlng.as_ref().is_some_and(|s| !s.is_empty())
    }
}
