//! Viewer configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! command line flags. Every section uses `#[serde(default)]` so a config file
//! only needs the keys it wants to change.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ViewerError};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "model-viewer.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Asset to open. `None` shows the textured cube field.
    pub model: Option<PathBuf>,
    /// Texture applied to the fallback cubes.
    pub cube_texture: PathBuf,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub render: RenderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: None,
            cube_texture: PathBuf::from("res/tex/dirt.jpg"),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Model Viewer".to_string(),
            width: 800,
            height: 800,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Radians per pixel of mouse drag.
    pub rotate_speed: f32,
    /// World units per scroll line.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 3.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees: 45.0,
            znear: 0.1,
            zfar: 100.0,
            rotate_speed: 0.005,
            zoom_speed: 0.5,
            min_distance: 0.5,
            max_distance: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub ambient_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
    pub object_color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [2.0, 4.0, 2.0],
            color: [1.0, 1.0, 1.0],
            ambient_strength: 0.3,
            specular_strength: 0.5,
            shininess: 32.0,
            object_color: [0.7, 0.7, 0.7],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f64; 4],
    pub wireframe: bool,
    pub cull_back_faces: bool,
    /// Optional WGSL file replacing the built-in Phong shader.
    pub shader: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3, 1.0],
            wireframe: false,
            cull_back_faces: false,
            shader: None,
        }
    }
}

impl ViewerConfig {
    /// Parses a config from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| ViewerError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads and parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Loads the explicit config file, or the default one if it exists, or
    /// falls back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    log::info!("Using config file {}", default_path.display());
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Rejects settings the window or the projection cannot work with.
    ///
    /// Comparisons are written so that NaN fails them.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<()> {
        let window = &self.window;
        if window.width == 0 || window.height == 0 {
            return Err(invalid(
                "window",
                format!("size must be non-zero, got {}x{}", window.width, window.height),
            ));
        }

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(invalid(
                "camera.fov_degrees",
                format!("must be between 0 and 180, got {}", camera.fov_degrees),
            ));
        }
        if !(camera.znear > 0.0) {
            return Err(invalid(
                "camera.znear",
                format!("must be positive, got {}", camera.znear),
            ));
        }
        if !(camera.zfar > camera.znear) {
            return Err(invalid(
                "camera.zfar",
                format!("must exceed znear ({}), got {}", camera.znear, camera.zfar),
            ));
        }
        if !(camera.min_distance > 0.0) {
            return Err(invalid(
                "camera.min_distance",
                format!("must be positive, got {}", camera.min_distance),
            ));
        }
        if !(camera.min_distance <= camera.max_distance) {
            return Err(invalid(
                "camera.max_distance",
                format!(
                    "must be at least min_distance ({}), got {}",
                    camera.min_distance, camera.max_distance
                ),
            ));
        }
        if !camera.distance.is_finite() {
            return Err(invalid(
                "camera.distance",
                format!("must be finite, got {}", camera.distance),
            ));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, message: String) -> ViewerError {
    ViewerError::InvalidConfig { key, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_viewer_setup() {
        let config = ViewerConfig::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.camera.distance, 3.0);
        assert_eq!(config.camera.zoom_speed, 0.5);
        assert_eq!(config.light.position, [2.0, 4.0, 2.0]);
        assert_eq!(config.render.clear_color, [0.2, 0.3, 0.3, 1.0]);
        assert!(config.model.is_none());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let text = r#"
            model = "assets/backpack.obj"

            [camera]
            distance = 10.0

            [render]
            wireframe = true
        "#;
        let config = ViewerConfig::from_toml_str(text, Path::new("test.toml")).unwrap();
        assert_eq!(config.model, Some(PathBuf::from("assets/backpack.obj")));
        assert_eq!(config.camera.distance, 10.0);
        assert_eq!(config.camera.zoom_speed, 0.5);
        assert!(config.render.wireframe);
        assert_eq!(config.window.title, "Model Viewer");
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let err = ViewerConfig::from_toml_str("[camera\ndistance = ", Path::new("bad.toml"))
            .unwrap_err();
        match err {
            ViewerError::Config { path, .. } => assert_eq!(path, PathBuf::from("bad.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let path = std::env::temp_dir().join("model-viewer-does-not-exist.toml");
        let err = ViewerConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
    }

    fn rejected_key(config: &ViewerConfig) -> &'static str {
        match config.validate() {
            Err(ViewerError::InvalidConfig { key, .. }) => key,
            other => panic!("expected an invalid config, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let mut config = ViewerConfig::default();
        config.window.width = 0;
        assert_eq!(rejected_key(&config), "window");

        let mut config = ViewerConfig::default();
        config.window.height = 0;
        assert_eq!(rejected_key(&config), "window");
    }

    #[test]
    fn field_of_view_must_be_inside_half_turn() {
        for fov in [0.0, -10.0, 180.0, 200.0, f32::NAN] {
            let mut config = ViewerConfig::default();
            config.camera.fov_degrees = fov;
            assert_eq!(rejected_key(&config), "camera.fov_degrees", "fov {fov}");
        }
    }

    #[test]
    fn clip_planes_must_be_ordered() {
        let mut config = ViewerConfig::default();
        config.camera.znear = 0.0;
        assert_eq!(rejected_key(&config), "camera.znear");

        let mut config = ViewerConfig::default();
        config.camera.zfar = config.camera.znear;
        assert_eq!(rejected_key(&config), "camera.zfar");

        let mut config = ViewerConfig::default();
        config.camera.zfar = f32::NAN;
        assert_eq!(rejected_key(&config), "camera.zfar");
    }

    #[test]
    fn distance_bounds_are_checked() {
        let mut config = ViewerConfig::default();
        config.camera.min_distance = 0.0;
        assert_eq!(rejected_key(&config), "camera.min_distance");

        let mut config = ViewerConfig::default();
        config.camera.min_distance = 5.0;
        config.camera.max_distance = 1.0;
        assert_eq!(rejected_key(&config), "camera.max_distance");

        let mut config = ViewerConfig::default();
        config.camera.distance = f32::INFINITY;
        assert_eq!(rejected_key(&config), "camera.distance");
    }

    #[test]
    fn equal_distance_bounds_are_allowed() {
        let mut config = ViewerConfig::default();
        config.camera.min_distance = 2.0;
        config.camera.max_distance = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_config_from_disk() {
        let path = std::env::temp_dir().join("model-viewer-config-test.toml");
        std::fs::write(&path, "[window]\ntitle = \"Inspector\"\nvsync = false\n").unwrap();
        let config = ViewerConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.window.title, "Inspector");
        assert!(!config.window.vsync);
        assert_eq!(config.window.width, 800);
    }
}
