//! # Graphics Module
//!
//! Everything between a model file on disk and pixels in the window.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera driven by mouse drag and scroll
//! - **Model Loading** ([`model`]) - OBJ and glTF import, mesh processing and texture sharing
//! - **Rendering Pipeline** ([`rendering`]) - Phong shading with a single point light
//! - **Scene Management** ([`scene`]) - The loaded model or the fallback cube field
//! - **Resource Management** ([`resources`]) - Textures, uniforms and bind groups
//! - **Geometry** ([`geometry`]) - Built-in shapes
//!
//! ## Usage
//!
//! The graphics system is driven by [`ViewerApp`](crate::app::ViewerApp), which
//! creates the [`RenderEngine`] once a window exists and loads the [`Scene`]
//! content against its device:
//!
//! ```no_run
//! use model_viewer::{app::ViewerApp, config::ViewerConfig};
//!
//! let app = ViewerApp::new(ViewerConfig::default())?;
//! app.run()?;
//! # Ok::<(), model_viewer::error::ViewerError>(())
//! ```
//!
//! [`Scene`]: scene::Scene

pub mod camera;
pub mod geometry;
pub mod model;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use model::Model;
pub use rendering::render_engine::RenderEngine;
