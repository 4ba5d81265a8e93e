//! Prepare a 3D scene from a saved stream payload.
//!
//! Run with: cargo run --example render_activity -- streams.json [visualization.yaml]
//!
//! Without arguments a short synthetic loop is used.

use std::path::Path;

use route_scene::{
    load_config_from_file, path_hue, prepare_from_streams, ActivityStreams, CameraPose, GpsPoint,
    SceneState, VisualizationConfig,
};

fn synthetic_loop() -> ActivityStreams {
    // ~1km loop around Mount Royal with a 60m climb
    let samples: Vec<GpsPoint> = (0..60)
        .map(|i| {
            let t = i as f64 / 60.0 * std::f64::consts::TAU;
            GpsPoint::new(45.5048 + t.sin() * 0.003, -73.5878 + t.cos() * 0.004)
        })
        .collect();
    let elevations: Vec<f64> = (0..60)
        .map(|i| 150.0 + 30.0 * (i as f64 / 60.0 * std::f64::consts::TAU).sin())
        .collect();
    ActivityStreams::from_samples(&samples, &elevations)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let streams = match args.first() {
        Some(path) => ActivityStreams::from_json(&std::fs::read_to_string(path)?)?,
        None => synthetic_loop(),
    };
    let config = match args.get(1) {
        Some(path) => load_config_from_file(Path::new(path)),
        None => VisualizationConfig::default(),
    };

    match prepare_from_streams(&streams, &config, CameraPose::default())? {
        SceneState::NoData => println!("{}", config.ui.no_data_text),
        SceneState::Ready(frame) => {
            println!("Scene");
            println!("  points:     {}", frame.points.len());
            println!("  length:     {:.0}m", frame.route_length_m);
            println!("  climb:      {:.0}m", frame.elevation_gain_m);
            println!("  extent:     {:.0}m x {:.0}m", frame.extent_m.0, frame.extent_m.1);
            println!("Camera");
            println!("  position:   {:.3?}", frame.pose.position);
            println!("  target:     {:.3?}", frame.pose.target);
            println!("  up:         {:?}", frame.pose.up);

            for t in [0.0, 2.5, 5.0] {
                match config.path.color_at(t) {
                    Some(rgb) => println!("  color@{t}s:  hue {:.2} -> {:.2?}", path_hue(t, config.path.animation.speed), rgb),
                    None => println!("  color@{t}s:  {}", config.path.default_color),
                }
            }
        }
    }

    Ok(())
}
