use std::path::{Path, PathBuf};

use cgmath::{Vector3, Zero};

use super::{
    importer::{self, ImportedMaterial, ImportedMesh, ImportedScene, SceneNode},
    mesh::{DrawModel, Mesh, MeshData, MeshTexture},
    texture::{TextureCache, TextureKind},
};
use crate::{
    error::{Result, ViewerError},
    gfx::{resources::SceneLayouts, scene::vertex::Vertex3D},
};

/// Meshes of an imported scene, flattened in draw order
///
/// Node transforms are not applied. Every mesh is instead moved so that its
/// own vertex centroid sits at the origin.
#[derive(Debug, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    /// Every distinct texture referenced by the model, in first-use order
    pub textures_loaded: Vec<MeshTexture>,
    pub directory: PathBuf,
}

impl ModelData {
    pub fn from_scene(scene: &ImportedScene) -> Self {
        let mut data = Self {
            directory: scene.directory.clone(),
            ..Default::default()
        };
        data.process_node(&scene.root, scene);
        data
    }

    /// Like [`ModelData::from_scene`], but a scene left with nothing to draw
    /// once broken meshes are skipped is an [`ViewerError::EmptyScene`] for
    /// `path`.
    pub fn from_drawable_scene(scene: &ImportedScene, path: &Path) -> Result<Self> {
        let data = Self::from_scene(scene);
        if data.meshes.is_empty() {
            return Err(ViewerError::EmptyScene(path.to_path_buf()));
        }
        Ok(data)
    }

    /// Depth-first: a node's own meshes come before its children's.
    fn process_node(&mut self, node: &SceneNode, scene: &ImportedScene) {
        for &index in &node.meshes {
            match scene.meshes.get(index) {
                Some(mesh) => {
                    if let Some(mesh) = self.process_mesh(mesh, scene) {
                        self.meshes.push(mesh);
                    }
                }
                None => log::warn!("Node '{}' references missing mesh {}", node.name, index),
            }
        }

        for child in &node.children {
            self.process_node(child, scene);
        }
    }

    fn process_mesh(&mut self, mesh: &ImportedMesh, scene: &ImportedScene) -> Option<MeshData> {
        if mesh.positions.is_empty() || mesh.indices.is_empty() {
            log::warn!("Skipping mesh '{}' without geometry", mesh.name);
            return None;
        }

        let vertex_count = mesh.positions.len();
        if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
            log::warn!(
                "Skipping mesh '{}': index {} out of range for {} vertices",
                mesh.name,
                index,
                vertex_count
            );
            return None;
        }

        let center = centroid(&mesh.positions);
        let vertices = mesh
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: (Vector3::from(*position) - center).into(),
                normal: mesh
                    .normals
                    .as_ref()
                    .and_then(|normals| normals.get(i))
                    .copied()
                    .unwrap_or([0.0; 3]),
                tex_coords: mesh
                    .tex_coords
                    .as_ref()
                    .and_then(|tex_coords| tex_coords.get(i))
                    .copied()
                    .unwrap_or([0.0; 2]),
            })
            .collect();

        let mut textures = Vec::new();
        if let Some(material) = mesh.material.and_then(|index| scene.materials.get(index)) {
            for kind in TextureKind::ALL {
                textures.extend(self.load_material_textures(material, kind));
            }
        }

        log::debug!(
            "Processed mesh '{}': {} vertices, {} triangles, {} textures",
            mesh.name,
            vertex_count,
            mesh.face_count(),
            textures.len()
        );

        Some(MeshData {
            name: mesh.name.clone(),
            vertices,
            indices: mesh.indices.clone(),
            textures,
        })
    }

    /// Texture references of one kind. A path seen before hands back the
    /// entry registered first, including its kind.
    fn load_material_textures(
        &mut self,
        material: &ImportedMaterial,
        kind: TextureKind,
    ) -> Vec<MeshTexture> {
        material
            .textures_of(kind)
            .map(|path| {
                let reused = self.textures_loaded.iter().find(|loaded| loaded.path == path);
                if let Some(loaded) = reused {
                    return loaded.clone();
                }
                let texture = MeshTexture {
                    kind,
                    path: path.to_string(),
                };
                self.textures_loaded.push(texture.clone());
                texture
            })
            .collect()
    }
}

fn centroid(positions: &[[f32; 3]]) -> Vector3<f32> {
    if positions.is_empty() {
        return Vector3::zero();
    }
    let sum = positions
        .iter()
        .fold(Vector3::zero(), |sum, p| sum + Vector3::from(*p));
    sum / positions.len() as f32
}

/// A loaded model: uploaded meshes plus the textures they share
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub textures_loaded: TextureCache,
    pub directory: PathBuf,
}

impl Model {
    /// Imports `path` and uploads it. Fails if the file cannot be imported or
    /// contains nothing drawable; missing textures only produce warnings.
    pub fn load(
        path: &Path,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &SceneLayouts,
    ) -> Result<Self> {
        let scene = importer::import(path)?;
        let data = ModelData::from_drawable_scene(&scene, path)?;
        Ok(Self::upload(&data, &scene, device, queue, layouts))
    }

    pub fn upload(
        data: &ModelData,
        scene: &ImportedScene,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &SceneLayouts,
    ) -> Self {
        let mut textures = TextureCache::new(device, queue);
        for texture in &data.textures_loaded {
            textures.load(
                device,
                queue,
                &texture.path,
                &scene.directory,
                &scene.embedded_images,
            );
        }
        log::info!("Loaded {} textures", textures.len());

        let meshes = data
            .meshes
            .iter()
            .map(|mesh| {
                let lookup = |kind| {
                    mesh.first_texture(kind)
                        .and_then(|texture| textures.get(&texture.path))
                        .unwrap_or_else(|| textures.white())
                };
                Mesh::upload(
                    device,
                    mesh,
                    &layouts.material,
                    lookup(TextureKind::Diffuse),
                    lookup(TextureKind::Specular),
                )
            })
            .collect();

        Self {
            meshes,
            textures_loaded: textures,
            directory: data.directory.clone(),
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_model(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(name: &str, offset: f32, material: Option<usize>) -> ImportedMesh {
        ImportedMesh {
            name: name.to_string(),
            positions: vec![
                [offset, 0.0, 0.0],
                [offset + 3.0, 0.0, 0.0],
                [offset, 3.0, 0.0],
            ],
            normals: Some(vec![[0.0, 0.0, 1.0]; 3]),
            tex_coords: None,
            indices: vec![0, 1, 2],
            material,
        }
    }

    fn material(textures: &[(TextureKind, &str)]) -> ImportedMaterial {
        ImportedMaterial {
            name: "mat".to_string(),
            textures: textures
                .iter()
                .map(|(kind, path)| (*kind, path.to_string()))
                .collect(),
        }
    }

    fn node(name: &str, meshes: Vec<usize>, children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            name: name.to_string(),
            meshes,
            children,
        }
    }

    #[test]
    fn meshes_follow_depth_first_node_order() {
        let mut scene = ImportedScene::new("assets");
        scene.meshes = vec![
            triangle("a", 0.0, None),
            triangle("b", 0.0, None),
            triangle("c", 0.0, None),
        ];
        scene.root = node(
            "root",
            vec![2],
            vec![node("left", vec![0], vec![node("deep", vec![1], vec![])])],
        );

        let data = ModelData::from_scene(&scene);
        let names: Vec<_> = data.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(data.directory, PathBuf::from("assets"));
    }

    #[test]
    fn each_mesh_is_centred_on_its_centroid() {
        let mut scene = ImportedScene::new(".");
        scene.meshes = vec![triangle("far", 100.0, None)];
        scene.root = node("root", vec![0], vec![]);

        let data = ModelData::from_scene(&scene);
        let vertices = &data.meshes[0].vertices;
        assert_eq!(vertices[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(vertices[1].position, [2.0, -1.0, 0.0]);
        assert_eq!(vertices[2].position, [-1.0, 2.0, 0.0]);
    }

    #[test]
    fn missing_attributes_are_zero_filled() {
        let mut mesh = triangle("bare", 0.0, None);
        mesh.normals = None;
        let mut scene = ImportedScene::new(".");
        scene.meshes = vec![mesh];
        scene.root = node("root", vec![0], vec![]);

        let data = ModelData::from_scene(&scene);
        for vertex in &data.meshes[0].vertices {
            assert_eq!(vertex.normal, [0.0; 3]);
            assert_eq!(vertex.tex_coords, [0.0; 2]);
        }
    }

    #[test]
    fn empty_and_broken_meshes_are_skipped() {
        let mut out_of_range = triangle("broken", 0.0, None);
        out_of_range.indices = vec![0, 1, 9];
        let mut scene = ImportedScene::new(".");
        scene.meshes = vec![
            ImportedMesh::default(),
            out_of_range,
            triangle("ok", 0.0, None),
        ];
        scene.root = node("root", vec![0, 1, 2, 7], vec![]);

        let data = ModelData::from_scene(&scene);
        assert_eq!(data.meshes.len(), 1);
        assert_eq!(data.meshes[0].name, "ok");
    }

    #[test]
    fn textures_are_ordered_by_kind_and_deduplicated() {
        let mut scene = ImportedScene::new(".");
        scene.materials = vec![
            material(&[
                (TextureKind::Height, "h.png"),
                (TextureKind::Specular, "shared.png"),
                (TextureKind::Diffuse, "d.png"),
            ]),
            material(&[(TextureKind::Diffuse, "shared.png")]),
        ];
        scene.meshes = vec![triangle("first", 0.0, Some(0)), triangle("second", 0.0, Some(1))];
        scene.root = node("root", vec![0, 1], vec![]);

        let data = ModelData::from_scene(&scene);

        let kinds: Vec<_> = data.meshes[0].textures.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TextureKind::Diffuse, TextureKind::Specular, TextureKind::Height]
        );

        let loaded: Vec<_> = data.textures_loaded.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(loaded, vec!["d.png", "shared.png", "h.png"]);

        // A path seen before hands back the first entry, kind included.
        assert_eq!(
            data.meshes[1].textures,
            vec![MeshTexture {
                kind: TextureKind::Specular,
                path: "shared.png".to_string(),
            }]
        );
    }

    #[test]
    fn scene_with_only_broken_meshes_is_empty() {
        let mut broken = triangle("broken", 0.0, None);
        broken.indices = vec![0, 1, 7];
        let mut scene = ImportedScene::new(".");
        scene.meshes = vec![broken];
        scene.root = node("root", vec![0], vec![]);

        let path = Path::new("broken.obj");
        assert!(matches!(
            ModelData::from_drawable_scene(&scene, path),
            Err(ViewerError::EmptyScene(p)) if p == path
        ));

        scene.meshes.push(triangle("fine", 0.0, None));
        scene.root = node("root", vec![0, 1], vec![]);
        let data = ModelData::from_drawable_scene(&scene, path).unwrap();
        assert_eq!(data.meshes.len(), 1);
        assert_eq!(data.meshes[0].name, "fine");
    }

    #[test]
    fn unknown_material_means_no_textures() {
        let mut scene = ImportedScene::new(".");
        scene.meshes = vec![triangle("lonely", 0.0, Some(4))];
        scene.root = node("root", vec![0], vec![]);

        let data = ModelData::from_scene(&scene);
        assert!(data.meshes[0].textures.is_empty());
        assert!(data.textures_loaded.is_empty());
    }
}
