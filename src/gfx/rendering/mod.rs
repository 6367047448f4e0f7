//! Core rendering functionality
//!
//! Handles the scene pipeline, shader selection and frame rendering.

pub mod pipeline_manager;
pub mod render_engine;
pub mod shader;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use shader::ShaderCode;
