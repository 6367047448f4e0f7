//! Error types shared across the viewer
//!
//! Every fallible library operation returns [`Result`]. Callers decide whether
//! a failure is fatal (GPU setup) or recoverable (model, texture and shader
//! loading fall back to placeholders).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to import OBJ file '{path}'")]
    ObjImport {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to import glTF file '{path}'")]
    GltfImport {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("unsupported model format '{0}' (expected .obj, .gltf or .glb)")]
    UnsupportedFormat(PathBuf),

    #[error("model '{0}' contains no drawable meshes")]
    EmptyScene(PathBuf),

    #[error("failed to decode image '{path}'")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unable to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}'")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting '{key}': {message}")]
    InvalidConfig { key: &'static str, message: String },

    #[error("shader '{name}' failed validation: {message}")]
    Shader { name: String, message: String },

    #[error("failed to create pipeline '{name}': {message}")]
    Pipeline { name: String, message: String },

    #[error("failed to create window")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create rendering surface")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("surface reports no usable texture format")]
    NoSurfaceFormat,

    #[error("no suitable graphics adapter found")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface ran out of memory")]
    SurfaceOutOfMemory,
}

pub type Result<T> = std::result::Result<T, ViewerError>;

/// Formats an error together with its chain of sources, outermost first
pub fn report(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_includes_sources() {
        let err = ViewerError::Io {
            path: PathBuf::from("model.obj"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(report(&err), "unable to read 'model.obj': no such file");
    }

    #[test]
    fn report_without_source_is_the_message() {
        let err = ViewerError::UnsupportedFormat(PathBuf::from("scene.fbx"));
        assert_eq!(
            report(&err),
            "unsupported model format 'scene.fbx' (expected .obj, .gltf or .glb)"
        );
    }
}
