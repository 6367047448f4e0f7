//! # Model Loading
//!
//! Turns a model file into GPU-ready meshes:
//!
//! - [`importer`] reads OBJ or glTF into a format-neutral scene graph
//! - [`ModelData`] walks the graph, centres each mesh and gathers the
//!   textures its material references
//! - [`Model`] uploads the result, sharing textures between meshes

pub mod importer;
pub mod mesh;
pub mod model;
pub mod texture;

pub use mesh::{DrawModel, Mesh, MeshData, MeshTexture};
pub use model::{Model, ModelData};
pub use texture::{TextureCache, TextureKind};
