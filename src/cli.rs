//! Command line interface
//!
//! Flags override whatever the config file (or the defaults) set.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;

#[derive(Debug, Parser)]
#[command(name = "model-viewer", version, about = "Minimal real-time 3D model viewer")]
pub struct Cli {
    /// OBJ, glTF or GLB file to open. Without one a field of textured cubes is shown.
    pub model: Option<PathBuf>,

    /// TOML config file (defaults to ./model-viewer.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// WGSL shader replacing the built-in Phong shader
    #[arg(long, value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Draw polygon outlines only
    #[arg(long)]
    pub wireframe: bool,

    /// Cull back faces
    #[arg(long)]
    pub cull: bool,

    /// Window width in pixels
    #[arg(long, value_name = "N")]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long, value_name = "N")]
    pub height: Option<u32>,
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    pub fn apply_to(&self, config: &mut ViewerConfig) {
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(shader) = &self.shader {
            config.render.shader = Some(shader.clone());
        }
        if self.wireframe {
            config.render.wireframe = true;
        }
        if self.cull {
            config.render.cull_back_faces = true;
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_leave_config_untouched() {
        let cli = Cli::parse_from(["model-viewer"]);
        let mut config = ViewerConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "model-viewer",
            "assets/backpack.obj",
            "--shader",
            "toon.wgsl",
            "--wireframe",
            "--cull",
            "--width",
            "1280",
            "--height",
            "720",
        ]);
        let mut config = ViewerConfig::default();
        cli.apply_to(&mut config);

        assert_eq!(config.model, Some(PathBuf::from("assets/backpack.obj")));
        assert_eq!(config.render.shader, Some(PathBuf::from("toon.wgsl")));
        assert!(config.render.wireframe);
        assert!(config.render.cull_back_faces);
        assert_eq!((config.window.width, config.window.height), (1280, 720));
    }

    #[test]
    fn config_path_is_parsed() {
        let cli = Cli::parse_from(["model-viewer", "-c", "viewer.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("viewer.toml")));
        assert!(cli.model.is_none());
    }
}
