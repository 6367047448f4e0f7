use std::path::Path;

use gltf::{image::Format, mesh::Mode};
use image::RgbaImage;

use super::{asset_directory, generate_smooth_normals, ImportedMaterial, ImportedMesh, ImportedScene, SceneNode};
use crate::{
    error::{Result, ViewerError},
    gfx::model::texture::{embedded_key, TextureKind},
};

/// Imports a `.gltf` or `.glb` asset
///
/// Images are decoded up front and stored as embedded images, so materials
/// only ever refer to embedded keys. An image that cannot be read or decoded
/// is left out, and the texture cache binds the white texture in its place.
pub fn import_gltf(path: &Path) -> Result<ImportedScene> {
    let import_error = |source: gltf::Error| ViewerError::GltfImport {
        path: path.to_path_buf(),
        source,
    };

    let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(import_error)?;
    let directory = asset_directory(path);
    let buffers =
        gltf::import_buffers(&document, Some(directory.as_path()), blob).map_err(import_error)?;

    let mut scene = ImportedScene::new(directory);

    scene.materials = document
        .materials()
        .enumerate()
        .map(|(index, material)| convert_material(index, &material))
        .collect();

    // glTF meshes are made of primitives; each primitive becomes one mesh.
    let mut primitives_of_mesh = Vec::new();
    for mesh in document.meshes() {
        let mut ids = Vec::new();
        for primitive in mesh.primitives() {
            if let Some(imported) = convert_primitive(&mesh, &primitive, &buffers) {
                ids.push(scene.meshes.len());
                scene.meshes.push(imported);
            }
        }
        primitives_of_mesh.push(ids);
    }

    for image in document.images() {
        let index = image.index();
        let decoded = gltf::image::Data::from_source(
            image.source(),
            Some(scene.directory.as_path()),
            &buffers,
        );
        match decoded {
            Ok(data) => match rgba_from_gltf(data) {
                Some(rgba) => {
                    scene.embedded_images.insert(embedded_key(index), rgba);
                }
                None => log::warn!("Image {index} uses an unsupported pixel format"),
            },
            Err(err) => log::warn!("Image {index} failed to load: {err}"),
        }
    }

    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    scene.root = match gltf_scene {
        Some(gltf_scene) => SceneNode {
            name: gltf_scene.name().unwrap_or_default().to_string(),
            meshes: Vec::new(),
            children: gltf_scene
                .nodes()
                .map(|node| convert_node(&node, &primitives_of_mesh))
                .collect(),
        },
        // No scene: expose every mesh directly under the root.
        None => SceneNode {
            name: String::new(),
            meshes: (0..scene.meshes.len()).collect(),
            children: Vec::new(),
        },
    };

    Ok(scene)
}

fn convert_node(node: &gltf::Node, primitives_of_mesh: &[Vec<usize>]) -> SceneNode {
    SceneNode {
        name: node.name().unwrap_or_default().to_string(),
        meshes: node
            .mesh()
            .and_then(|mesh| primitives_of_mesh.get(mesh.index()))
            .cloned()
            .unwrap_or_default(),
        children: node
            .children()
            .map(|child| convert_node(&child, primitives_of_mesh))
            .collect(),
    }
}

fn convert_primitive(
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<ImportedMesh> {
    let name = match mesh.name() {
        Some(name) => format!("{}#{}", name, primitive.index()),
        None => format!("mesh_{}#{}", mesh.index(), primitive.index()),
    };

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let Some(positions) = reader.read_positions() else {
        log::warn!("Skipping primitive '{name}' without positions");
        return None;
    };
    let positions: Vec<[f32; 3]> = positions.collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let Some(indices) = triangulate(primitive.mode(), indices) else {
        log::warn!(
            "Skipping primitive '{name}' with non-triangle mode {:?}",
            primitive.mode()
        );
        return None;
    };

    let normals = reader
        .read_normals()
        .map(|normals| normals.collect::<Vec<_>>())
        .filter(|normals| normals.len() == positions.len())
        .unwrap_or_else(|| generate_smooth_normals(&positions, &indices));

    // glTF already uses a top-left texture origin.
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|tex_coords| tex_coords.into_f32().collect::<Vec<_>>())
        .filter(|tex_coords| tex_coords.len() == positions.len());

    Some(ImportedMesh {
        name,
        positions,
        normals: Some(normals),
        tex_coords,
        indices,
        material: primitive.material().index(),
    })
}

/// Converts an index stream of the given primitive mode into a triangle list.
/// Returns `None` for point and line modes.
pub fn triangulate(mode: Mode, mut indices: Vec<u32>) -> Option<Vec<u32>> {
    match mode {
        Mode::Triangles => {
            indices.truncate(indices.len() - indices.len() % 3);
            Some(indices)
        }
        Mode::TriangleStrip => Some(
            indices
                .windows(3)
                .enumerate()
                .flat_map(|(i, w)| {
                    // Every other triangle of a strip is wound the other way.
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .collect(),
        ),
        Mode::TriangleFan => {
            let Some((&first, rest)) = indices.split_first() else {
                return Some(Vec::new());
            };
            Some(
                rest.windows(2)
                    .flat_map(|w| [first, w[0], w[1]])
                    .collect(),
            )
        }
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => None,
    }
}

fn convert_material(index: usize, material: &gltf::Material) -> ImportedMaterial {
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material_{}", index));

    let pbr = material.pbr_metallic_roughness();
    let mut textures = Vec::new();

    if let Some(info) = pbr.base_color_texture() {
        textures.push((TextureKind::Diffuse, embedded_key(info.texture().source().index())));
    }
    if let Some(info) = pbr.metallic_roughness_texture() {
        textures.push((TextureKind::Specular, embedded_key(info.texture().source().index())));
    }
    if let Some(normal) = material.normal_texture() {
        textures.push((TextureKind::Normal, embedded_key(normal.texture().source().index())));
    }
    if let Some(occlusion) = material.occlusion_texture() {
        textures.push((TextureKind::Height, embedded_key(occlusion.texture().source().index())));
    }

    ImportedMaterial { name, textures }
}

/// Expands 8-bit glTF images to RGBA. Higher bit depths are not supported.
fn rgba_from_gltf(data: gltf::image::Data) -> Option<RgbaImage> {
    let pixels = match data.format {
        Format::R8G8B8A8 => data.pixels,
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[1], 0, 255])
            .collect(),
        Format::R8 => data
            .pixels
            .iter()
            .flat_map(|&v| [v, v, v, 255])
            .collect(),
        _ => return None,
    };
    RgbaImage::from_raw(data.width, data.height, pixels)
}
