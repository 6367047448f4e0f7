//! Per-mesh material bindings
//!
//! A material is the pair of textures the Phong shader samples (diffuse and
//! specular) plus a sampler. Meshes without one of those textures bind the
//! white placeholder in its place.

use wgpu::Device;

use super::TextureResource;
use crate::wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

/// Layout of bind group 2: diffuse texture, specular texture, sampler
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d()) // diffuse
            .next_binding_fragment(binding_types::texture_2d()) // specular
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Bind Group Layout");

        Self { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// Uses the diffuse texture's sampler for both maps.
    pub fn create_bind_group(
        &self,
        device: &Device,
        diffuse: &TextureResource,
        specular: &TextureResource,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.bind_group_layout)
            .texture(&diffuse.view)
            .texture(&specular.view)
            .sampler(&diffuse.sampler)
            .create(device, label)
    }
}
