use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::Device;

use crate::{
    gfx::camera::camera_utils::convert_matrix4_to_array,
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

/// Per-object transform data, MUST match `ObjectUniform` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, used to transform normals
    pub normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn from_transform(transform: Matrix4<f32>) -> Self {
        let normal = transform
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);

        Self {
            model: convert_matrix4_to_array(transform),
            normal: convert_matrix4_to_array(normal),
        }
    }
}

type ObjectUBO = UniformBuffer<ObjectUniform>;

/// Layout of bind group 1: the object's transform uniform
pub struct ObjectBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl ObjectBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Transform Bind Group Layout");

        Self { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

// GPU resources struct to hold the uniform buffer and its bind group
pub struct ObjectGpuResources {
    transform_buffer: ObjectUBO,
    transform_bind_group: wgpu::BindGroup,
}

/// A placed instance of something drawable
///
/// Objects carry only a world transform; the geometry they place is owned by
/// the scene content (a loaded model or the shared cube mesh).
pub struct Object {
    pub transform: Matrix4<f32>, // cgmath 4x4 transformation matrix
    gpu_resources: ObjectGpuResources,
}

impl Object {
    pub fn new(device: &Device, bindings: &ObjectBindings, transform: Matrix4<f32>) -> Self {
        let transform_buffer =
            ObjectUBO::new_with_data(device, &ObjectUniform::from_transform(transform));
        let transform_bind_group = BindGroupBuilder::new(&bindings.bind_group_layout)
            .resource(transform_buffer.binding_resource())
            .create(device, "Transform Bind Group");

        Self {
            transform,
            gpu_resources: ObjectGpuResources {
                transform_buffer,
                transform_bind_group,
            },
        }
    }

    /// Sync the transformation matrix to the GPU
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        self.gpu_resources
            .transform_buffer
            .update_content(queue, ObjectUniform::from_transform(self.transform));
    }

    pub fn transform_bind_group(&self) -> &wgpu::BindGroup {
        &self.gpu_resources.transform_bind_group
    }
}
