//! Scene shader selection
//!
//! The viewer draws everything with one shader. By default that is the
//! built-in Phong shader; a WGSL file can replace it, in which case the file
//! must compile and link against the scene pipeline or the built-in shader is
//! used instead.

use std::path::{Path, PathBuf};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use crate::error::{report, Result, ViewerError};

pub const PHONG_WGSL: &str = include_str!("phong.wgsl");

/// Entry points the scene pipeline calls
pub const ENTRY_POINTS: [&str; 2] = ["vs_main", "fs_main"];

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderCode {
    pub source: String,
    /// File the source came from, `None` for the built-in shader
    pub path: Option<PathBuf>,
}

impl ShaderCode {
    pub fn builtin() -> Self {
        Self {
            source: PHONG_WGSL.to_string(),
            path: None,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let missing = missing_entry_points(&source);
        if !missing.is_empty() {
            return Err(ViewerError::Shader {
                name: path.display().to_string(),
                message: format!("missing entry point(s) {}", missing.join(", ")),
            });
        }

        Ok(Self {
            source,
            path: Some(path.to_path_buf()),
        })
    }

    /// The override file if it can be read, the built-in shader otherwise
    pub fn resolve(override_path: Option<&Path>) -> Self {
        match override_path {
            Some(path) => match Self::from_file(path) {
                Ok(shader) => shader,
                Err(err) => {
                    log::warn!("{}; using built-in Phong shader", report(&err));
                    Self::builtin()
                }
            },
            None => Self::builtin(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.path.is_none()
    }

    pub fn name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "built-in Phong".to_string(),
        }
    }
}

/// Entry points from [`ENTRY_POINTS`] not declared in `source`
pub fn missing_entry_points(source: &str) -> Vec<&'static str> {
    ENTRY_POINTS
        .into_iter()
        .filter(|entry| {
            !source.lines().any(|line| {
                let line = line.trim_start();
                line.strip_prefix("fn ")
                    .map(|rest| {
                        rest.trim_start()
                            .strip_prefix(entry)
                            .is_some_and(|after| after.trim_start().starts_with('('))
                    })
                    .unwrap_or(false)
            })
        })
        .collect()
}

/// Compiles the scene shader and creates the pipeline described by `pipeline`
///
/// An override that fails to compile or does not match the pipeline layout
/// is reported and replaced by the built-in shader. Returns the shader that
/// ended up in use.
pub fn build_scene_pipeline(
    manager: &mut PipelineManager,
    pipeline_name: &str,
    pipeline: PipelineConfig,
    override_path: Option<&Path>,
) -> Result<ShaderCode> {
    let candidate = ShaderCode::resolve(override_path);

    if !candidate.is_builtin() {
        match try_shader(manager, pipeline_name, &pipeline, &candidate) {
            Ok(()) => {
                log::info!("Using shader {}", candidate.name());
                return Ok(candidate);
            }
            Err(err) => log::warn!("{}; using built-in Phong shader", report(&err)),
        }
    }

    let builtin = ShaderCode::builtin();
    try_shader(manager, pipeline_name, &pipeline, &builtin)?;
    Ok(builtin)
}

fn try_shader(
    manager: &mut PipelineManager,
    pipeline_name: &str,
    pipeline: &PipelineConfig,
    shader: &ShaderCode,
) -> Result<()> {
    manager.load_shader(&pipeline.shader, &shader.source)?;
    manager.register_pipeline(pipeline_name, pipeline.clone());
    manager.create_all_pipelines()
}

/// Logs every GPU error that is not caught by an error scope
pub fn install_error_hook(device: &wgpu::Device) {
    device.on_uncaptured_error(Box::new(|error| {
        log::error!("GPU error: {}", error);
    }));
}
