// src/lib.rs
//! Model Viewer
//!
//! A minimal real-time 3D model viewer built on wgpu and winit. Loads OBJ or
//! glTF assets (or shows a field of textured cubes), lights them with a
//! single Phong point light and lets the user orbit and zoom with the mouse.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
