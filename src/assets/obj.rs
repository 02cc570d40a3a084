//! Wavefront OBJ import through `tobj`. OBJ carries no animation.

use std::path::Path;

use log::warn;

use super::{AssetError, LoadedAsset};
use crate::galaxy::Rgb;
use crate::gfx::scene::object::{Material, Mesh, Object};

pub fn load(path: &Path) -> Result<LoadedAsset, AssetError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let materials = materials.unwrap_or_else(|err| {
        warn!("No usable MTL for {}: {}", path.display(), err);
        Vec::new()
    });

    let meshes: Vec<Mesh> = models
        .iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(|model| {
            let mesh = &model.mesh;
            Mesh::new(mesh.positions.clone(), mesh.normals.clone(), mesh.indices.clone())
        })
        .collect();

    if meshes.is_empty() {
        return Err(AssetError::Empty(path.display().to_string()));
    }

    // First model's diffuse color, if its material has one
    let color = models
        .first()
        .and_then(|model| model.mesh.material_id)
        .and_then(|id| materials.get(id))
        .and_then(|material| material.diffuse)
        .map(Rgb::from_array)
        .unwrap_or(Rgb::WHITE);

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model");

    Ok(LoadedAsset {
        object: Object::new(name, meshes, Material::toon(color)),
        clips: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_is_triangulated() {
        let path = std::env::temp_dir().join("galaxy_scene_quad.obj");
        std::fs::write(
            &path,
            "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        )
        .unwrap();

        let asset = load(&path).unwrap();
        assert_eq!(asset.object.name, "galaxy_scene_quad");
        assert_eq!(asset.object.triangle_count(), 2);
        assert_eq!(asset.object.material.color, Rgb::WHITE);
        assert!(asset.clips.is_empty());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_obj_without_faces_is_empty() {
        let path = std::env::temp_dir().join("galaxy_scene_points.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\n").unwrap();

        assert!(matches!(load(&path), Err(AssetError::Empty(_))));
        let _ = std::fs::remove_file(path);
    }
}
