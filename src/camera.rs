//! Camera framing for normalized paths.
//!
//! [`fit_camera`] places the camera straight above the path's bounding-box
//! center, far enough back that the largest extent fits the vertical field
//! of view, then nudges it by the configured `initialPosition` offset. The
//! up vector is +z, the axis the normalizer uses for north, so a top-down
//! view shows north at the top of the screen.

use glam::{DMat4, DVec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::CameraOptions;

/// Scene axis that increasing latitude maps to.
pub const NORTH: DVec3 = DVec3::Z;

/// Scene axis that elevation maps to.
pub const VERTICAL: DVec3 = DVec3::Y;

const DEGENERATE_EPS: f64 = 1e-18;

/// Camera projection. Only perspective cameras expose a field of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in degrees.
        fov: f64,
        near: f64,
        far: f64,
    },
    Orthographic { near: f64, far: f64 },
}

impl Projection {
    /// Perspective projection from the configured intrinsics.
    pub fn perspective(options: &CameraOptions) -> Self {
        Self::Perspective { fov: options.fov, near: options.near, far: options.far }
    }

    /// Vertical field of view in degrees, if the projection has one.
    pub fn fov(&self) -> Option<f64> {
        match self {
            Self::Perspective { fov, .. } => Some(*fov),
            Self::Orthographic { .. } => None,
        }
    }

    /// (near, far) clipping distances.
    pub fn clip_range(&self) -> (f64, f64) {
        match *self {
            Self::Perspective { near, far, .. } | Self::Orthographic { near, far } => (near, far),
        }
    }
}

/// Position, look-at target and up vector to apply to the active camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: DVec3,
    pub target: DVec3,
    pub up: DVec3,
}

impl Default for CameraPose {
    /// The pose a camera has before any path was framed.
    fn default() -> Self {
        Self {
            position: DVec3::from_array(CameraOptions::default().initial_position),
            target: DVec3::ZERO,
            up: VERTICAL,
        }
    }
}

impl CameraPose {
    /// Right-handed view matrix for this pose.
    ///
    /// A single-sample path with a zero `initialPosition` puts the camera on
    /// its target. The view then looks straight down, and an up vector
    /// parallel to the view direction is swapped for north (or vertical).
    pub fn view_matrix(&self) -> DMat4 {
        let forward = self.target - self.position;
        let dir = if forward.length_squared() > DEGENERATE_EPS {
            forward.normalize()
        } else {
            -VERTICAL
        };

        let up = if dir.cross(self.up).length_squared() > DEGENERATE_EPS {
            self.up
        } else if dir.cross(NORTH).length_squared() > DEGENERATE_EPS {
            NORTH
        } else {
            VERTICAL
        };

        DMat4::look_to_rh(self.position, dir, up)
    }

    /// Distance from the camera to its target.
    pub fn distance_to_target(&self) -> f64 {
        self.position.distance(self.target)
    }

    /// Whether `point` falls inside the view, measured on the focal plane
    /// through the target.
    ///
    /// The point's offset from the view axis is compared against the frame's
    /// half extents at the target distance (`distance * tan(fov / 2)`
    /// vertically, times `aspect` horizontally). Depth is not considered
    /// beyond requiring the target to sit between the clip planes.
    pub fn frames_point(&self, projection: &Projection, aspect: f64, point: DVec3) -> bool {
        let Some(fov) = projection.fov() else {
            return false;
        };
        let distance = self.distance_to_target();
        let (near, far) = projection.clip_range();
        if distance < near || distance > far {
            return false;
        }

        let half_height = distance * (fov.to_radians() / 2.0).tan();
        let half_width = half_height * aspect;

        // View space: camera at origin looking down -z, x right, y up
        let view = self.view_matrix();
        let offset = view.transform_point3(point) - view.transform_point3(self.target);

        // Tolerance absorbs rounding when a point sits exactly on the frame edge
        let eps = 1e-9 * distance.max(1.0);
        offset.x.abs() <= half_width + eps && offset.y.abs() <= half_height + eps
    }
}

/// Axis-aligned bounding box of a point sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl PathBox {
    /// Bounding box of `points`, `None` when empty.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Largest per-axis extent.
    pub fn max_dim(&self) -> f64 {
        self.size().max_element()
    }
}

/// Distance at which an extent of `max_dim` fills a vertical field of view of
/// `fov_degrees`, scaled by `padding`.
pub fn fit_distance(max_dim: f64, fov_degrees: f64, padding: f64) -> f64 {
    let fov = fov_degrees.to_radians();
    (max_dim / (2.0 * (fov / 2.0).tan())) * padding
}

/// Compute a camera pose that frames every point.
///
/// Returns `previous` unchanged when `points` is empty.
///
/// For perspective projections the camera sits `fit_distance` above the
/// bounding-box center, looks at it, and is then translated by
/// `options.initial_position`. Projections without a field of view fall back
/// to `max_dim * padding` above the center with no offset.
///
/// ```rust
/// use glam::DVec3;
/// use route_scene::{fit_camera, CameraOptions, CameraPose, Projection};
///
/// let options = CameraOptions { initial_position: [0.0, 0.0, 0.0], ..CameraOptions::default() };
/// let points = vec![DVec3::new(-5.0, 0.0, -5.0), DVec3::new(5.0, 0.0, 5.0)];
///
/// let pose = fit_camera(&points, &Projection::perspective(&options), &options, CameraPose::default());
/// assert_eq!(pose.target, DVec3::ZERO);
/// assert!(pose.position.y > 0.0);
/// assert_eq!(pose.up, DVec3::Z);
/// ```
pub fn fit_camera(
    points: &[DVec3],
    projection: &Projection,
    options: &CameraOptions,
    previous: CameraPose,
) -> CameraPose {
    let Some(bbox) = PathBox::from_points(points) else {
        return previous;
    };

    let center = bbox.center();
    let max_dim = bbox.max_dim();

    match projection.fov() {
        Some(fov) => {
            let distance = fit_distance(max_dim, fov, options.auto_fit_padding);
            // Auto-fit first, then the configured nudge
            let position = center + VERTICAL * distance + DVec3::from_array(options.initial_position);

            debug!(
                "[Camera] Fit {} points: max_dim={:.3} fov={} distance={:.3}",
                points.len(),
                max_dim,
                fov,
                distance
            );

            CameraPose { position, target: center, up: NORTH }
        }
        None => {
            let position = center + VERTICAL * (max_dim * options.auto_fit_padding);
            debug!("[Camera] No field of view, placing {:.3} above center", max_dim * options.auto_fit_padding);
            CameraPose { position, target: center, up: NORTH }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn no_offset() -> CameraOptions {
        CameraOptions { initial_position: [0.0, 0.0, 0.0], ..CameraOptions::default() }
    }

    fn square_path() -> Vec<DVec3> {
        vec![
            DVec3::new(-5.0, 0.0, -5.0),
            DVec3::new(-5.0, 0.5, 5.0),
            DVec3::new(5.0, 1.0, 5.0),
            DVec3::new(5.0, 0.2, -5.0),
        ]
    }

    #[test]
    fn test_empty_keeps_previous_pose() {
        let previous = CameraPose {
            position: DVec3::new(1.0, 2.0, 3.0),
            target: DVec3::new(4.0, 5.0, 6.0),
            up: DVec3::X,
        };
        let projection = Projection::perspective(&CameraOptions::default());
        assert_eq!(fit_camera(&[], &projection, &CameraOptions::default(), previous), previous);
    }

    #[test]
    fn test_fit_distance_formula() {
        // 90 degrees: tan(45) = 1, so distance = max_dim / 2 * padding
        assert_abs_diff_eq!(fit_distance(10.0, 90.0, 1.0), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit_distance(10.0, 90.0, 1.2), 6.0, epsilon = 1e-9);
        assert_eq!(fit_distance(0.0, 75.0, 1.2), 0.0);
    }

    #[test]
    fn test_camera_directly_above_center() {
        let options = no_offset();
        let points = square_path();
        let pose = fit_camera(&points, &Projection::perspective(&options), &options, CameraPose::default());

        let expected_distance = fit_distance(10.0, options.fov, options.auto_fit_padding);
        assert_eq!(pose.target, DVec3::new(0.0, 0.5, 0.0));
        assert_abs_diff_eq!(pose.position.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.position.z, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.position.y, 0.5 + expected_distance, epsilon = 1e-9);
        assert_eq!(pose.up, NORTH);
    }

    #[test]
    fn test_initial_position_is_an_offset() {
        let points = square_path();
        let base = fit_camera(&points, &Projection::perspective(&no_offset()), &no_offset(), CameraPose::default());

        let nudged_options = CameraOptions { initial_position: [1.0, 5.0, 10.0], ..CameraOptions::default() };
        let nudged = fit_camera(
            &points,
            &Projection::perspective(&nudged_options),
            &nudged_options,
            CameraPose::default(),
        );

        assert_eq!(nudged.position, base.position + DVec3::new(1.0, 5.0, 10.0));
        assert_eq!(nudged.target, base.target);
    }

    #[test]
    fn test_orthographic_fallback() {
        let options = CameraOptions::default();
        let projection = Projection::Orthographic { near: 0.1, far: 1000.0 };
        let pose = fit_camera(&square_path(), &projection, &options, CameraPose::default());

        assert_eq!(pose.target, DVec3::new(0.0, 0.5, 0.0));
        assert_abs_diff_eq!(pose.position.y, 0.5 + 10.0 * 1.2, epsilon = 1e-9);
        assert_eq!(pose.position.x, 0.0);
        assert_eq!(pose.position.z, 0.0);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let options = CameraOptions::default();
        let projection = Projection::perspective(&options);
        let a = fit_camera(&square_path(), &projection, &options, CameraPose::default());
        let b = fit_camera(&square_path(), &projection, &options, CameraPose::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_point_is_framed() {
        let options = no_offset();
        let projection = Projection::perspective(&options);

        let spiral: Vec<DVec3> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.1;
                DVec3::new(t.cos() * t * 0.4, (t * 0.3).sin().abs(), t.sin() * t * 0.2)
            })
            .collect();

        for path in [square_path(), spiral] {
            let pose = fit_camera(&path, &projection, &options, CameraPose::default());
            for p in &path {
                assert!(pose.frames_point(&projection, 1.0, *p), "point {p:?} outside view");
            }
        }
    }

    #[test]
    fn test_point_outside_frame_is_rejected() {
        let options = no_offset();
        let projection = Projection::perspective(&options);
        let pose = fit_camera(&square_path(), &projection, &options, CameraPose::default());
        assert!(!pose.frames_point(&projection, 1.0, DVec3::new(100.0, 0.0, 0.0)));
        assert!(!pose.frames_point(&Projection::Orthographic { near: 0.1, far: 10.0 }, 1.0, DVec3::ZERO));
    }

    #[test]
    fn test_north_is_screen_up() {
        let options = no_offset();
        let pose = fit_camera(&square_path(), &Projection::perspective(&options), &options, CameraPose::default());
        let view = pose.view_matrix();
        let north = view.transform_point3(pose.target + NORTH) - view.transform_point3(pose.target);
        assert!(north.y > 0.99);
    }

    #[test]
    fn test_single_sample_view_is_finite() {
        let options = no_offset();
        let projection = Projection::perspective(&options);
        let point = DVec3::new(1.0, 2.0, 3.0);
        let pose = fit_camera(&[point], &projection, &options, CameraPose::default());
        assert_eq!(pose.position, pose.target);

        let view = pose.view_matrix();
        assert!(view.is_finite());
        // Looking straight down with north at the top of the screen
        let below = view.transform_point3(point - VERTICAL);
        assert!(below.z < 0.0);
        let north = view.transform_point3(point + NORTH);
        assert!(north.y > 0.99);
        assert!(!pose.frames_point(&projection, 1.0, point));

        let level = CameraPose { position: DVec3::ZERO, target: DVec3::new(0.0, 0.0, -1.0), up: NORTH };
        assert!(level.view_matrix().is_finite());
        let stacked = CameraPose { position: DVec3::ZERO, target: DVec3::ZERO, up: VERTICAL };
        assert!(stacked.view_matrix().is_finite());
    }

    #[test]
    fn test_path_box() {
        assert!(PathBox::from_points(&[]).is_none());
        let bbox = PathBox::from_points(&square_path()).unwrap();
        assert_eq!(bbox.min, DVec3::new(-5.0, 0.0, -5.0));
        assert_eq!(bbox.max, DVec3::new(5.0, 1.0, 5.0));
        assert_eq!(bbox.max_dim(), 10.0);
    }
}
