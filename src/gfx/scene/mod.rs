//! # Scene Management Module
//!
//! Holds what is on screen: the orbit camera and either a loaded model or the
//! animated cube field shown when no model is available.
//!
//! ## Key Components
//!
//! - [`Scene`] - camera plus current content
//! - [`SceneContent`] - a [`Model`](crate::gfx::model::Model) or a [`CubeField`]
//! - [`Object`] - a world transform with its GPU uniform
//! - [`Vertex3D`] - vertex layout shared by every mesh

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{Object, ObjectBindings, ObjectUniform};
pub use scene::{cube_transform, CubeField, Scene, SceneContent};
pub use vertex::Vertex3D;
