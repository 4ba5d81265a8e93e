//! Visualization configuration with YAML (and TOML) document support.
//!
//! Every section and field is `#[serde(default)]`, so a partial document
//! (for example one that only overrides `camera`) resolves into a complete
//! [`VisualizationConfig`] in a single parse. Keys are camelCase:
//!
//! ```yaml
//! coordinates:
//!   scale: 20.0
//!   elevationScale: 0.5
//! camera:
//!   autoFitPadding: 1.5
//!   initialPosition: [0.0, 0.0, 0.0]
//! ```
//!
//! YAML is the default format. Files ending in `.toml` are read and written
//! as TOML instead, see [`ConfigFormat::from_path`].
//!
//! Two loading flavours exist. [`VisualizationConfig::load`] is strict and
//! returns a [`SceneError`]. The `load_config_*` functions are soft: a
//! missing or malformed document logs a warning and yields the defaults, so
//! the normalizer and framer always receive a well-formed record.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Top-level visualization settings, resolved once per load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualizationConfig {
    /// Canvas presentation.
    pub canvas: CanvasOptions,
    /// Scene lighting.
    pub lighting: LightingOptions,
    /// Camera intrinsics and auto-fit behaviour.
    pub camera: CameraOptions,
    /// Path line appearance and color animation.
    pub path: PathOptions,
    /// Geographic to scene coordinate mapping.
    pub coordinates: CoordinateOptions,
    /// Orbit controls.
    pub controls: ControlOptions,
    /// Text shown for loading, error and empty states.
    pub ui: UiOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasOptions {
    pub height: String,
    pub background_color: String,
    pub border_radius: String,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            height: "500px".to_string(),
            background_color: "#1a1a2e".to_string(),
            border_radius: "0.5rem".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightingOptions {
    pub ambient: AmbientLight,
    pub point: PointLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AmbientLight {
    pub intensity: f64,
    pub color: String,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self { intensity: 0.5, color: "#ffffff".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointLight {
    pub position: [f64; 3],
    pub intensity: f64,
    pub color: String,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 10.0],
            intensity: 1.0,
            color: "#ffffff".to_string(),
        }
    }
}

/// Camera intrinsics and auto-fit parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraOptions {
    /// Offset added to the auto-fitted position. Not an absolute placement.
    pub initial_position: [f64; 3],
    /// Vertical field of view in degrees.
    pub fov: f64,
    /// Near clipping plane distance.
    pub near: f64,
    /// Far clipping plane distance.
    pub far: f64,
    /// Multiplier on the computed fit distance (1.2 = 20% slack).
    pub auto_fit_padding: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            initial_position: [0.0, 5.0, 10.0],
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            auto_fit_padding: 1.2,
        }
    }
}

/// Line appearance. See [`crate::color`] for the animation math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathOptions {
    pub line_width: f64,
    /// CSS color used when `animate` is off.
    pub default_color: String,
    pub animate: bool,
    pub animation: PathAnimation,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            default_color: "hotpink".to_string(),
            animate: true,
            animation: PathAnimation::default(),
        }
    }
}

/// Hue cycling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathAnimation {
    /// Hue revolutions per second.
    pub speed: f64,
    /// 0..=1
    pub saturation: f64,
    /// 0..=1
    pub lightness: f64,
}

impl Default for PathAnimation {
    fn default() -> Self {
        Self { speed: 0.1, saturation: 0.8, lightness: 0.5 }
    }
}

/// Geographic to scene mapping used by [`crate::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoordinateOptions {
    /// Scene-unit span of the larger of the latitude/longitude extents.
    pub scale: f64,
    /// Vertical multiplier applied on top of the planar scale.
    pub elevation_scale: f64,
    /// Subtract the midpoint of the lat/lng bounding box before scaling.
    pub center_at_origin: bool,
}

impl Default for CoordinateOptions {
    fn default() -> Self {
        Self { scale: 10.0, elevation_scale: 0.2, center_at_origin: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlOptions {
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    pub damping_factor: f64,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f64,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            enable_pan: true,
            enable_zoom: true,
            enable_rotate: true,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiOptions {
    pub loading_text: String,
    pub error_text: String,
    pub no_data_text: String,
    pub font_size: f64,
    pub text_color: String,
    pub error_color: String,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            loading_text: "Loading activity data...".to_string(),
            error_text: "Error: ".to_string(),
            no_data_text: "No route data available".to_string(),
            font_size: 0.5,
            text_color: "white".to_string(),
            error_color: "red".to_string(),
        }
    }
}

/// Document format of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file name or URL: `.toml` is TOML, anything
    /// else is YAML.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        if path.to_ascii_lowercase().ends_with(".toml") {
            Self::Toml
        } else {
            Self::Yaml
        }
    }
}

impl VisualizationConfig {
    /// Parse a YAML document. Missing fields use defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, SceneError> {
        Self::parse(content, ConfigFormat::Yaml)
    }

    /// Parse a TOML document. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SceneError> {
        Self::parse(content, ConfigFormat::Toml)
    }

    /// Parse a document in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, SceneError> {
        match format {
            // An empty YAML document is null; treat it as "all defaults"
            ConfigFormat::Yaml if content.trim().is_empty() => Ok(Self::default()),
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| SceneError::config(e.to_string())),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| SceneError::config(e.to_string())),
        }
    }

    /// Serialize to a document in the given format.
    pub fn to_string_as(&self, format: ConfigFormat) -> Result<String, SceneError> {
        match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| SceneError::config(e.to_string())),
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| SceneError::config(e.to_string())),
        }
    }

    /// Load a file, YAML or TOML by extension. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, ConfigFormat::from_path(&path.to_string_lossy()))
    }

    /// Save to a file, YAML or TOML by extension.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let content = self.to_string_as(ConfigFormat::from_path(&path.to_string_lossy()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace out-of-domain coordinate and camera values with their defaults.
    ///
    /// The normalizer and framer assume a well-formed record and never check
    /// it themselves; this is the loader-side check that makes the assumption
    /// hold.
    pub fn sanitized(mut self) -> Self {
        let coords = CoordinateOptions::default();
        let camera = CameraOptions::default();

        if !(self.coordinates.scale.is_finite() && self.coordinates.scale > 0.0) {
            warn!("[Config] coordinates.scale={} out of range, using {}", self.coordinates.scale, coords.scale);
            self.coordinates.scale = coords.scale;
        }
        if !(self.coordinates.elevation_scale.is_finite() && self.coordinates.elevation_scale >= 0.0) {
            warn!(
                "[Config] coordinates.elevationScale={} out of range, using {}",
                self.coordinates.elevation_scale, coords.elevation_scale
            );
            self.coordinates.elevation_scale = coords.elevation_scale;
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            warn!("[Config] camera.fov={} out of range, using {}", self.camera.fov, camera.fov);
            self.camera.fov = camera.fov;
        }
        if !(self.camera.near.is_finite() && self.camera.near > 0.0) {
            warn!("[Config] camera.near={} out of range, using {}", self.camera.near, camera.near);
            self.camera.near = camera.near;
        }
        if !(self.camera.far.is_finite() && self.camera.far > self.camera.near) {
            let far = camera.far.max(self.camera.near * 10.0);
            warn!("[Config] camera.far={} not beyond near, using {}", self.camera.far, far);
            self.camera.far = far;
        }
        if !(self.camera.auto_fit_padding.is_finite() && self.camera.auto_fit_padding >= 1.0) {
            warn!(
                "[Config] camera.autoFitPadding={} below 1, using {}",
                self.camera.auto_fit_padding, camera.auto_fit_padding
            );
            self.camera.auto_fit_padding = camera.auto_fit_padding;
        }
        if self.camera.initial_position.iter().any(|v| !v.is_finite()) {
            warn!("[Config] camera.initialPosition is not finite, using {:?}", camera.initial_position);
            self.camera.initial_position = camera.initial_position;
        }

        self
    }
}

/// Parse a YAML document, falling back to defaults on any error.
pub fn load_config_from_str(content: &str) -> VisualizationConfig {
    load_config_as(content, ConfigFormat::Yaml)
}

/// Parse a document in `format`, falling back to defaults on any error.
pub fn load_config_as(content: &str, format: ConfigFormat) -> VisualizationConfig {
    match VisualizationConfig::parse(content, format) {
        Ok(config) => config.sanitized(),
        Err(e) => {
            warn!("[Config] Error parsing {:?} configuration, using defaults: {}", format, e);
            VisualizationConfig::default()
        }
    }
}

/// Load a YAML (or `.toml`) file, falling back to defaults when it is missing
/// or malformed.
pub fn load_config_from_file(path: &Path) -> VisualizationConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!("[Config] Loaded {} ({} bytes)", path.display(), content.len());
            load_config_as(&content, ConfigFormat::from_path(&path.to_string_lossy()))
        }
        Err(e) => {
            warn!("[Config] Error reading {}, using defaults: {}", path.display(), e);
            VisualizationConfig::default()
        }
    }
}

/// Fetch a YAML (or `.toml`) document over HTTP, falling back to defaults on
/// any error.
#[cfg(feature = "http")]
pub async fn load_config_from_url(url: &str) -> VisualizationConfig {
    let content = match fetch_text(url).await {
        Ok(content) => content,
        Err(e) => {
            warn!("[Config] Error loading configuration from {}, using defaults: {}", url, e);
            return VisualizationConfig::default();
        }
    };
    load_config_as(&content, ConfigFormat::from_path(url))
}

#[cfg(feature = "http")]
async fn fetch_text(url: &str) -> Result<String, SceneError> {
    let resp = reqwest::get(url).await.map_err(SceneError::http)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SceneError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        });
    }
    resp.text().await.map_err(SceneError::http)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = VisualizationConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = VisualizationConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r"
[coordinates]
elevationScale = 0.5

[path.animation]
speed = 0.25
";
        let config = VisualizationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.coordinates.elevation_scale, 0.5);
        assert_eq!(config.coordinates.scale, 10.0);
        assert!(config.coordinates.center_at_origin);
        assert_eq!(config.path.animation.speed, 0.25);
        assert_eq!(config.path.animation.saturation, 0.8);
        assert_eq!(config.path.default_color, "hotpink");
        assert_eq!(config.camera, CameraOptions::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r"
coordinates:
  elevationScale: 0.5
camera:
  autoFitPadding: 1.5
  initialPosition: [0, 0, 0]
path:
  animation:
    speed: 0.25
";
        let config = load_config_from_str(yaml);
        assert_eq!(config.coordinates.elevation_scale, 0.5);
        assert_eq!(config.coordinates.scale, 10.0);
        assert_eq!(config.camera.auto_fit_padding, 1.5);
        assert_eq!(config.camera.initial_position, [0.0, 0.0, 0.0]);
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.path.animation.speed, 0.25);
        assert_eq!(config.path.animation.lightness, 0.5);
        assert_eq!(config.ui, UiOptions::default());
    }

    #[test]
    fn test_empty_yaml_is_defaults() {
        assert_eq!(VisualizationConfig::from_yaml_str("").unwrap(), VisualizationConfig::default());
        assert_eq!(VisualizationConfig::from_yaml_str("# comments only\n").unwrap(), VisualizationConfig::default());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path("visualization.yaml"), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("config.yml"), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("/etc/scene/Config.TOML"), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("http://host/config.toml?v=2"), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("http://host/api/config/visualization.yaml"), ConfigFormat::Yaml);
    }

    #[test]
    fn test_default_round_trips_through_yaml() {
        let config = VisualizationConfig::default();
        let yaml = config.to_string_as(ConfigFormat::Yaml).unwrap();
        assert_eq!(VisualizationConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_camel_case_keys() {
        let toml_str = r"
[camera]
autoFitPadding = 2.0
initialPosition = [1.0, 2.0, 3.0]
";
        let config = VisualizationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.camera.auto_fit_padding, 2.0);
        assert_eq!(config.camera.initial_position, [1.0, 2.0, 3.0]);
        assert_eq!(config.camera.fov, 75.0);
    }

    #[test]
    fn test_soft_loader_falls_back_on_garbage() {
        let config = load_config_from_str("camera: [unclosed\n  fov: {");
        assert_eq!(config, VisualizationConfig::default());

        let config = load_config_as("this is = = not toml [", ConfigFormat::Toml);
        assert_eq!(config, VisualizationConfig::default());
    }

    #[test]
    fn test_soft_loader_missing_file() {
        let config = load_config_from_file(Path::new("/definitely/not/here/visualization.toml"));
        assert_eq!(config, VisualizationConfig::default());
    }

    #[test]
    fn test_strict_loader_reports_errors() {
        let err = VisualizationConfig::from_toml_str("[camera]\nfov = \"wide\"\n").unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }

    #[test]
    fn test_sanitized_replaces_out_of_range_values() {
        let mut config = VisualizationConfig::default();
        config.coordinates.scale = 0.0;
        config.coordinates.elevation_scale = -1.0;
        config.camera.fov = 180.0;
        config.camera.auto_fit_padding = 0.5;
        config.camera.near = 5.0;
        config.camera.far = 1.0;

        let clean = config.sanitized();
        assert_eq!(clean.coordinates.scale, 10.0);
        assert_eq!(clean.coordinates.elevation_scale, 0.2);
        assert_eq!(clean.camera.fov, 75.0);
        assert_eq!(clean.camera.auto_fit_padding, 1.2);
        assert_eq!(clean.camera.near, 5.0);
        assert_eq!(clean.camera.far, 1000.0);
    }

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let mut config = VisualizationConfig::default();
        config.coordinates.elevation_scale = 0.0;
        config.camera.auto_fit_padding = 1.0;
        config.camera.initial_position = [0.0, 0.0, 0.0];
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("route-scene-config-{}", std::process::id()));
        let path = dir.join("visualization.toml");

        let mut config = VisualizationConfig::default();
        config.coordinates.scale = 42.0;
        config.save(&path).unwrap();

        let loaded = VisualizationConfig::load(&path).unwrap();
        assert_eq!(loaded.coordinates.scale, 42.0);
        assert!(std::fs::read_to_string(&path).unwrap().contains("[coordinates]"));

        let yaml_path = dir.join("visualization.yaml");
        config.camera.fov = 60.0;
        config.save(&yaml_path).unwrap();
        assert!(std::fs::read_to_string(&yaml_path).unwrap().contains("autoFitPadding:"));
        assert_eq!(load_config_from_file(&yaml_path), config);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
