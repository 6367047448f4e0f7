use wgpu::util::DeviceExt;

use super::{model::Model, texture::TextureKind};
use crate::gfx::{
    resources::{MaterialBindings, TextureResource},
    scene::vertex::Vertex3D,
};

/// Texture reference of a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshTexture {
    pub kind: TextureKind,
    /// Path relative to the model directory, or an embedded key
    pub path: String,
}

/// CPU-side mesh ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Ordered diffuse, specular, normal, height
    pub textures: Vec<MeshTexture>,
}

impl MeshData {
    /// Shader slot names (`texture_diffuse1`, `texture_specular1`, ...) paired
    /// with the texture bound to them. Numbering restarts for every kind.
    pub fn texture_slots(&self) -> Vec<(String, &MeshTexture)> {
        let mut counters = [0u32; TextureKind::ALL.len()];
        self.textures
            .iter()
            .map(|texture| {
                let counter = &mut counters[texture.kind as usize];
                *counter += 1;
                (format!("{}{}", texture.kind.slot_prefix(), counter), texture)
            })
            .collect()
    }

    pub fn first_texture(&self, kind: TextureKind) -> Option<&MeshTexture> {
        self.textures.iter().find(|texture| texture.kind == kind)
    }
}

/// Mesh uploaded to the GPU together with its material bind group
pub struct Mesh {
    pub name: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_bind_group: wgpu::BindGroup,
}

impl Mesh {
    pub fn upload(
        device: &wgpu::Device,
        data: &MeshData,
        materials: &MaterialBindings,
        diffuse: &TextureResource,
        specular: &TextureResource,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material_bind_group = materials.create_bind_group(
            device,
            diffuse,
            specular,
            &format!("{} Material Bind Group", data.name),
        );

        Self {
            name: data.name.clone(),
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            material_bind_group,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Draw calls for uploaded meshes. The caller binds groups 0 and 1.
pub trait DrawModel {
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_meshes<'m>(&mut self, meshes: impl IntoIterator<Item = &'m Mesh>);
    fn draw_model(&mut self, model: &Model);
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        self.set_bind_group(2, &mesh.material_bind_group, &[]);
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_meshes<'m>(&mut self, meshes: impl IntoIterator<Item = &'m Mesh>) {
        for mesh in meshes {
            self.draw_mesh(mesh);
        }
    }

    fn draw_model(&mut self, model: &Model) {
        self.draw_meshes(&model.meshes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(kind: TextureKind, path: &str) -> MeshTexture {
        MeshTexture {
            kind,
            path: path.to_string(),
        }
    }

    #[test]
    fn slot_names_count_per_kind() {
        let mesh = MeshData {
            textures: vec![
                texture(TextureKind::Diffuse, "a.png"),
                texture(TextureKind::Diffuse, "b.png"),
                texture(TextureKind::Specular, "c.png"),
                texture(TextureKind::Normal, "d.png"),
                texture(TextureKind::Height, "e.png"),
            ],
            ..Default::default()
        };

        let names: Vec<_> = mesh
            .texture_slots()
            .into_iter()
            .map(|(name, texture)| (name, texture.path.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("texture_diffuse1".to_string(), "a.png".to_string()),
                ("texture_diffuse2".to_string(), "b.png".to_string()),
                ("texture_specular1".to_string(), "c.png".to_string()),
                ("texture_normal1".to_string(), "d.png".to_string()),
                ("texture_height1".to_string(), "e.png".to_string()),
            ]
        );
    }

    #[test]
    fn first_texture_of_missing_kind_is_none() {
        let mesh = MeshData {
            textures: vec![texture(TextureKind::Specular, "s.png")],
            ..Default::default()
        };
        assert!(mesh.first_texture(TextureKind::Diffuse).is_none());
        assert_eq!(mesh.first_texture(TextureKind::Specular).unwrap().path, "s.png");
    }
}
