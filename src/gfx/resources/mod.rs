// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, uniform buffers and bind groups for rendering.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use material::MaterialBindings;
pub use texture_resource::TextureResource;

use crate::gfx::scene::object::ObjectBindings;

/// Bind group layouts shared by everything drawn with the scene pipeline
///
/// Group 0 (globals) is owned by the render engine; these are groups 1 and 2.
pub struct SceneLayouts {
    pub object: ObjectBindings,
    pub material: MaterialBindings,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            object: ObjectBindings::new(device),
            material: MaterialBindings::new(device),
        }
    }
}
