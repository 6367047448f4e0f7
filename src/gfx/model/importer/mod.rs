//! Format-neutral scene import
//!
//! OBJ and glTF files are both converted into an [`ImportedScene`]: a tree of
//! nodes referencing a flat list of triangle meshes and materials. Everything
//! downstream (mesh processing, texture loading, drawing) only sees this type.
//!
//! Import applies the equivalent of "triangulate, generate smooth normals,
//! flip UVs", so meshes always come out as triangle lists with a normal per
//! vertex and texture coordinates with a top-left origin.

mod gltf_loader;
mod obj_loader;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use cgmath::{InnerSpace, Vector3, Zero};
use image::RgbaImage;

use super::texture::TextureKind;
use crate::error::{Result, ViewerError};

pub use self::gltf_loader::{import_gltf, triangulate};
pub use self::obj_loader::{import_obj, import_obj_buf};

/// A node of the imported scene graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`ImportedScene::meshes`]
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Triangle mesh as read from the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Triangle list
    pub indices: Vec<u32>,
    /// Index into [`ImportedScene::materials`]
    pub material: Option<usize>,
}

impl ImportedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMaterial {
    pub name: String,
    /// Texture references in file order. Paths are relative to the scene
    /// directory, or embedded keys (see [`super::texture::embedded_key`]).
    pub textures: Vec<(TextureKind, String)>,
}

impl ImportedMaterial {
    pub fn textures_of(&self, kind: TextureKind) -> impl Iterator<Item = &str> + '_ {
        self.textures
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, path)| path.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportedScene {
    pub root: SceneNode,
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
    /// Decoded images that live inside the asset, keyed by embedded key
    pub embedded_images: HashMap<String, RgbaImage>,
    /// Directory external texture paths are resolved against
    pub directory: PathBuf,
}

impl ImportedScene {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }
}

/// Imports an asset, picking the importer from the file extension
pub fn import(path: &Path) -> Result<ImportedScene> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let scene = match extension.as_deref() {
        Some("obj") => import_obj(path)?,
        Some("gltf") | Some("glb") => import_gltf(path)?,
        _ => return Err(ViewerError::UnsupportedFormat(path.to_path_buf())),
    };

    // tobj emits a model for trailing vertices even when no face uses them.
    if scene.meshes.iter().all(|mesh| mesh.face_count() == 0) {
        return Err(ViewerError::EmptyScene(path.to_path_buf()));
    }

    log::info!("Model has {} meshes", scene.meshes.len());
    log::info!("Model has {} materials", scene.materials.len());
    log::debug!("Scene graph has {} nodes", scene.root.node_count());

    Ok(scene)
}

/// Directory that texture paths of `path` are relative to
pub fn asset_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Smooth per-vertex normals from a triangle list
///
/// Each vertex receives the sum of the (area weighted) normals of the
/// triangles that use it, normalized. Vertices used by no triangle, or only by
/// degenerate ones, get a zero normal.
pub fn generate_smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vector3::<f32>::zero(); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }

        let v0 = Vector3::from(positions[i0]);
        let v1 = Vector3::from(positions[i1]);
        let v2 = Vector3::from(positions[i2]);
        let face_normal = (v1 - v0).cross(v2 - v0);

        for index in [i0, i1, i2] {
            accumulated[index] += face_normal;
        }
    }

    accumulated
        .into_iter()
        .map(|normal| {
            if normal.magnitude2() > f32::EPSILON * f32::EPSILON {
                normal.normalize().into()
            } else {
                [0.0; 3]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let err = import(Path::new("model.fbx")).unwrap_err();
        assert!(matches!(err, ViewerError::UnsupportedFormat(_)));
    }

    #[test]
    fn obj_without_faces_is_an_empty_scene() {
        let path = std::env::temp_dir().join("model-viewer-points-only.obj");
        std::fs::write(&path, "o Points\nv 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        let result = import(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ViewerError::EmptyScene(p)) if p == path));
    }

    #[test]
    fn asset_directory_defaults_to_current_dir() {
        assert_eq!(asset_directory(Path::new("cube.obj")), PathBuf::from("."));
        assert_eq!(
            asset_directory(Path::new("assets/backpack/backpack.obj")),
            PathBuf::from("assets/backpack")
        );
    }

    #[test]
    fn smooth_normals_of_a_flat_quad_point_up() {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, -1.0],
            [0.0, 0.0, -1.0],
        ];
        let indices = [0, 1, 2, 2, 3, 0];
        let normals = generate_smooth_normals(&positions, &indices);
        for normal in normals {
            assert!((normal[1] - 1.0).abs() < 1e-6, "normal {:?}", normal);
        }
    }

    #[test]
    fn smooth_normals_average_shared_edges() {
        // Two faces of a cube corner meeting at a right angle.
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0],
            [0.0, 1.0, 0.0],
        ];
        // Floor triangle (+Y) and wall triangle (+Z)
        let indices = [0, 1, 2, 0, 1, 3];
        let normals = generate_smooth_normals(&positions, &indices);
        let shared = normals[0];
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((shared[1] - expected).abs() < 1e-5);
        assert!((shared[2] - expected).abs() < 1e-5);
        assert_eq!(normals[2], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn unused_vertices_get_zero_normals() {
        let positions = [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = generate_smooth_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], [0.0; 3]);
        assert_eq!(normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn node_count_covers_subtree() {
        let mut root = SceneNode::new("root");
        let mut child = SceneNode::new("child");
        child.children.push(SceneNode::new("grandchild"));
        root.children.push(child);
        root.children.push(SceneNode::new("sibling"));
        assert_eq!(root.node_count(), 4);
    }
}
