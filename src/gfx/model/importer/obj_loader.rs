use std::{io::BufRead, path::Path};

use super::{asset_directory, generate_smooth_normals, ImportedMaterial, ImportedMesh, ImportedScene, SceneNode};
use crate::{
    error::{Result, ViewerError},
    gfx::model::texture::TextureKind,
};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Imports an OBJ file and the MTL libraries it references
pub fn import_obj(path: &Path) -> Result<ImportedScene> {
    let (models, materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| ViewerError::ObjImport {
            path: path.to_path_buf(),
            source,
        })?;

    let root_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(build_scene(
        root_name,
        models,
        materials,
        asset_directory(path),
    ))
}

/// Imports OBJ text from a reader. `material_loader` resolves `mtllib`
/// statements, see [`tobj::load_obj_buf`].
pub fn import_obj_buf<B, ML>(
    reader: &mut B,
    directory: &Path,
    material_loader: ML,
) -> Result<ImportedScene>
where
    B: BufRead,
    ML: Fn(&Path) -> tobj::MTLLoadResult,
{
    let (models, materials) = tobj::load_obj_buf(reader, &load_options(), material_loader)
        .map_err(|source| ViewerError::ObjImport {
            path: directory.to_path_buf(),
            source,
        })?;

    Ok(build_scene(
        String::new(),
        models,
        materials,
        directory.to_path_buf(),
    ))
}

fn build_scene(
    root_name: String,
    models: Vec<tobj::Model>,
    materials: std::result::Result<Vec<tobj::Material>, tobj::LoadError>,
    directory: std::path::PathBuf,
) -> ImportedScene {
    let materials = materials.unwrap_or_else(|err| {
        log::warn!("No usable MTL file ({err}), meshes will be untextured");
        Vec::new()
    });

    let mut scene = ImportedScene::new(directory);
    scene.root = SceneNode::new(root_name);
    scene.materials = materials.iter().enumerate().map(convert_material).collect();

    // One child node per OBJ object / group, each owning its mesh.
    for model in models {
        let mesh = convert_mesh(model.name.clone(), model.mesh, scene.materials.len());
        let mut node = SceneNode::new(model.name);
        node.meshes.push(scene.meshes.len());
        scene.meshes.push(mesh);
        scene.root.children.push(node);
    }

    scene
}

fn convert_mesh(name: String, mesh: tobj::Mesh, material_count: usize) -> ImportedMesh {
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let vertex_count = positions.len();

    let mut normals = None;
    if !mesh.normals.is_empty() {
        if mesh.normals.len() == mesh.positions.len() {
            normals = Some(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect(),
            );
        } else {
            log::warn!("Mesh '{name}' has mismatched normals, regenerating them");
        }
    }

    let tex_coords = if mesh.texcoords.len() == vertex_count * 2 && vertex_count > 0 {
        // OBJ has its texture origin at the bottom left.
        Some(
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| [t[0], 1.0 - t[1]])
                .collect(),
        )
    } else {
        None
    };

    let normals =
        normals.unwrap_or_else(|| generate_smooth_normals(&positions, &mesh.indices));

    let material = mesh.material_id.filter(|&id| {
        let known = id < material_count;
        if !known {
            log::warn!("Mesh '{name}' references missing material {id}");
        }
        known
    });

    ImportedMesh {
        name,
        positions,
        normals: Some(normals),
        tex_coords,
        indices: mesh.indices,
        material,
    }
}

fn convert_material((index, material): (usize, &tobj::Material)) -> ImportedMaterial {
    let name = if material.name.is_empty() {
        format!("material_{}", index)
    } else {
        material.name.clone()
    };

    let slots = [
        (TextureKind::Diffuse, &material.diffuse_texture),
        (TextureKind::Specular, &material.specular_texture),
        (TextureKind::Normal, &material.normal_texture),
        (TextureKind::Height, &material.ambient_texture),
    ];

    let textures = slots
        .into_iter()
        .filter_map(|(kind, texture)| {
            texture
                .as_deref()
                .filter(|path| !path.trim().is_empty())
                .map(|path| (kind, normalize_texture_path(path)))
        })
        .collect();

    ImportedMaterial { name, textures }
}

/// MTL files written on Windows use backslashes.
fn normalize_texture_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o Quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
usemtl Painted
f 1/1 2/2 3/3 4/4
";

    const QUAD_MTL: &str = "\
newmtl Painted
Kd 1.0 1.0 1.0
map_Kd textures\\paint.png
map_Ks spec.png
map_Bump normal.png
map_Ka height.png
";

    fn import(obj: &str, mtl: Option<&'static str>) -> ImportedScene {
        import_obj_buf(&mut obj.as_bytes(), Path::new("assets"), move |_| match mtl {
            Some(text) => tobj::load_mtl_buf(&mut text.as_bytes()),
            None => Err(tobj::LoadError::OpenFileFailed),
        })
        .unwrap()
    }

    #[test]
    fn quads_are_triangulated_with_generated_normals() {
        let scene = import(QUAD_OBJ, Some(QUAD_MTL));
        assert_eq!(scene.meshes.len(), 1);

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);

        let normals = mesh.normals.as_ref().unwrap();
        for normal in normals {
            assert!((normal[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn texture_coordinates_are_flipped() {
        let scene = import(QUAD_OBJ, Some(QUAD_MTL));
        let tex_coords = scene.meshes[0].tex_coords.as_ref().unwrap();
        assert!(tex_coords.contains(&[0.0, 1.0]));
        assert!(tex_coords.contains(&[1.0, 0.0]));
    }

    #[test]
    fn material_textures_map_to_kinds() {
        let scene = import(QUAD_OBJ, Some(QUAD_MTL));
        assert_eq!(scene.meshes[0].material, Some(0));

        let material = &scene.materials[0];
        assert_eq!(material.name, "Painted");
        assert_eq!(
            material.textures,
            vec![
                (TextureKind::Diffuse, "textures/paint.png".to_string()),
                (TextureKind::Specular, "spec.png".to_string()),
                (TextureKind::Normal, "normal.png".to_string()),
                (TextureKind::Height, "height.png".to_string()),
            ]
        );
    }

    #[test]
    fn missing_mtl_leaves_meshes_untextured() {
        let scene = import(QUAD_OBJ, None);
        assert!(scene.materials.is_empty());
        assert_eq!(scene.meshes[0].material, None);
    }

    #[test]
    fn objects_become_child_nodes() {
        let obj = "\
o First
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o Second
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
";
        let scene = import(obj, None);
        assert_eq!(scene.root.children.len(), 2);
        assert_eq!(scene.root.children[0].name, "First");
        assert_eq!(scene.root.children[1].meshes, vec![1]);
        assert!(scene.meshes[0].tex_coords.is_none());
    }
}
