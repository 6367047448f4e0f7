//! Global uniform bindings for camera and lighting data
//!
//! Manages the uniform buffer and bind group for per-frame state shared by
//! every draw call: the camera matrices and the Phong light parameters.

use crate::{
    config::LightConfig,
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],

    pub light_position: [f32; 3],
    pub ambient_strength: f32,
    pub light_color: [f32; 3],
    pub specular_strength: f32,
    pub object_color: [f32; 3],
    pub shininess: f32,
}
// 16 + 64 + 16 + 16 + 16 = 128 bytes

impl GlobalUBOContent {
    pub fn new(camera: &CameraUniform, light: &LightConfig) -> Self {
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            light_position: light.position,
            ambient_strength: light.ambient_strength,
            light_color: light.color,
            specular_strength: light.specular_strength,
            object_color: light.object_color,
            shininess: light.shininess,
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer with camera and light data
///
/// Called once per frame before encoding the render pass.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: &CameraUniform,
    light: &LightConfig,
) {
    ubo.update_content(queue, GlobalUBOContent::new(camera, light));
}

/// Manages bind group layouts and bind groups for global uniforms
///
/// This is bound to slot 0 in every render pipeline.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // camera + light
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_std140_sized() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 128);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>() % 16, 0);
    }

    #[test]
    fn content_packs_camera_and_light() {
        let camera = CameraUniform {
            view_position: [0.0, 1.0, 3.0, 1.0],
            ..Default::default()
        };
        let light = LightConfig::default();
        let content = GlobalUBOContent::new(&camera, &light);
        assert_eq!(content.view_position, [0.0, 1.0, 3.0, 1.0]);
        assert_eq!(content.light_position, [2.0, 4.0, 2.0]);
        assert_eq!(content.ambient_strength, 0.3);
        assert_eq!(content.specular_strength, 0.5);
        assert_eq!(content.shininess, 32.0);
        assert_eq!(content.object_color, [0.7, 0.7, 0.7]);
    }
}
