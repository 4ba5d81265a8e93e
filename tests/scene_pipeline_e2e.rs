//! End-to-end: config document + stream payload -> points and camera pose.

use approx::assert_abs_diff_eq;
use glam::DVec3;
use route_scene::{
    fit_camera, load_config_from_str, normalize_coordinates, prepare_from_streams, ActivityStreams,
    CameraPose, GpsPoint, Projection, SceneState,
};

const CONFIG: &str = r#"
coordinates:
  scale: 10.0
  elevationScale: 0.2
  centerAtOrigin: true
camera:
  fov: 90.0
  autoFitPadding: 1.0
  initialPosition: [0.0, 0.0, 0.0]
"#;

const STREAMS: &str = r#"{
    "latlng": {
        "data": [[45.0, -73.0], [45.01, -73.0], [45.01, -72.99]],
        "series_type": "distance", "original_size": 3, "resolution": "high"
    },
    "altitude": {
        "data": [10.0, 20.0, 15.0],
        "series_type": "distance", "original_size": 3, "resolution": "high"
    }
}"#;

#[test]
fn test_streams_to_framed_scene() {
    let config = load_config_from_str(CONFIG);
    let streams = ActivityStreams::from_json(STREAMS).unwrap();

    let state = prepare_from_streams(&streams, &config, CameraPose::default()).unwrap();
    let frame = state.frame().expect("route should produce a frame");

    assert_eq!(frame.points.len(), 3);
    assert_abs_diff_eq!(frame.points[0].x, -5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.points[0].z, -5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.points[1].y, 200.0, epsilon = 1e-6);

    // Elevation dominates: box is 10 x 200 x 10, centered at y = 100.
    // At 90 degrees the fit distance is max_dim / 2.
    assert_abs_diff_eq!(frame.pose.target.y, 100.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.pose.position.y, 200.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.pose.position.x, frame.pose.target.x, epsilon = 1e-12);
    assert_abs_diff_eq!(frame.pose.position.z, frame.pose.target.z, epsilon = 1e-12);
    assert_eq!(frame.pose.up, DVec3::Z);
}

#[test]
fn test_malformed_config_still_renders_with_defaults() {
    let config = load_config_from_str("[coordinates\nscale = ");
    let streams = ActivityStreams::from_json(STREAMS).unwrap();

    let state = prepare_from_streams(&streams, &config, CameraPose::default()).unwrap();
    let frame = state.frame().unwrap();
    assert!(frame.points.iter().all(|p| p.is_finite()));
    // Default initialPosition [0, 5, 10] is added on top of the auto-fit
    assert_abs_diff_eq!(frame.pose.position.z - frame.pose.target.z, 10.0, epsilon = 1e-9);
}

#[test]
fn test_empty_streams_leave_camera_alone() {
    let config = load_config_from_str(CONFIG);
    let streams = ActivityStreams::from_json(r#"{"latlng": {"data": []}}"#).unwrap();
    let previous = CameraPose { position: DVec3::new(7.0, 8.0, 9.0), ..CameraPose::default() };

    let state = prepare_from_streams(&streams, &config, previous).unwrap();
    assert_eq!(state, SceneState::NoData);

    let projection = Projection::perspective(&config.camera);
    assert_eq!(fit_camera(&[], &projection, &config.camera, previous), previous);
}

#[test]
fn test_every_point_framed_for_long_thin_route() {
    let config = load_config_from_str(CONFIG);
    // A long east-west route with a gentle climb
    let samples: Vec<GpsPoint> = (0..500)
        .map(|i| GpsPoint::new(45.0 + (i as f64 * 0.05).sin() * 0.001, -73.0 + i as f64 * 0.0004))
        .collect();
    let elevations: Vec<f64> = (0..500).map(|i| 100.0 + i as f64 * 0.01).collect();

    let mut coords = config.coordinates;
    coords.elevation_scale = 0.0005;
    let points = normalize_coordinates(&samples, &elevations, &coords);

    let projection = Projection::perspective(&config.camera);
    let pose = fit_camera(&points, &projection, &config.camera, CameraPose::default());
    for p in &points {
        assert!(pose.frames_point(&projection, 1.0, *p));
    }
}
