//! glTF 2.0 import (`.gltf` with external buffers, or binary `.glb`).
//!
//! Node transforms of the default scene are baked into the vertices, so the
//! resulting [`Object`] starts with an identity transform. Only triangle
//! primitives are kept. Skins are not applied.

use std::path::Path;

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

use super::{AssetError, LoadedAsset};
use crate::animation::AnimationClip;
use crate::galaxy::Rgb;
use crate::gfx::scene::object::{Material, Mesh, Object};

pub fn load(path: &Path) -> Result<LoadedAsset, AssetError> {
    let (document, buffers, _images) = ::gltf::import(path)?;
    let buffer_data = |buffer: ::gltf::Buffer| buffers.get(buffer.index()).map(|b| b.0.as_slice());

    let mut meshes = Vec::new();
    let mut color = None;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    let roots: Vec<::gltf::Node> = match scene {
        Some(scene) => scene.nodes().collect(),
        None => Vec::new(),
    };

    // Depth-first walk carrying each node's world matrix
    let mut stack: Vec<(::gltf::Node, Matrix4<f32>)> = roots
        .into_iter()
        .map(|node| (node, Matrix4::identity()))
        .collect();

    while let Some((node, parent)) = stack.pop() {
        let world = parent * Matrix4::from(node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            let normal_matrix = normal_matrix(&world);

            for primitive in mesh.primitives() {
                if primitive.mode() != ::gltf::mesh::Mode::Triangles {
                    continue;
                }
                let reader = primitive.reader(buffer_data);
                let Some(positions) = reader.read_positions() else {
                    continue;
                };

                let positions: Vec<f32> = positions
                    .flat_map(|p| {
                        let p = world * Vector3::from(p).extend(1.0);
                        [p.x, p.y, p.z]
                    })
                    .collect();
                let vertex_count = (positions.len() / 3) as u32;

                let normals: Vec<f32> = reader
                    .read_normals()
                    .map(|normals| {
                        normals
                            .flat_map(|n| {
                                let n = (normal_matrix * Vector3::from(n)).normalize();
                                [n.x, n.y, n.z]
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|indices| indices.into_u32().collect())
                    .unwrap_or_else(|| (0..vertex_count).collect());

                if color.is_none() {
                    let [r, g, b, _] = primitive
                        .material()
                        .pbr_metallic_roughness()
                        .base_color_factor();
                    color = Some(Rgb::new(r, g, b));
                }

                meshes.push(Mesh::new(positions, normals, indices));
            }
        }

        stack.extend(node.children().map(|child| (child, world)));
    }

    if meshes.is_empty() {
        return Err(AssetError::Empty(path.display().to_string()));
    }

    let clips = document
        .animations()
        .enumerate()
        .map(|(index, animation)| {
            let duration = animation
                .channels()
                .filter_map(|channel| channel.reader(buffer_data).read_inputs())
                .flatten()
                .fold(0.0_f32, f32::max);
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("clip_{index}"));
            AnimationClip::new(name, duration)
        })
        .collect();

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model");

    Ok(LoadedAsset {
        object: Object::new(name, meshes, Material::toon(color.unwrap_or(Rgb::WHITE))),
        clips,
    })
}

/// Inverse-transpose of the upper 3x3, for transforming normals
fn normal_matrix(world: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let world = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let n = (normal_matrix(&world) * Vector3::new(1.0, 1.0, 0.0)).normalize();

        // The surface stretched along x, so its normal tilts toward y
        assert!(n.y > n.x);
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_gltf_is_an_error() {
        let path = std::env::temp_dir().join("galaxy_scene_invalid.gltf");
        std::fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(load(&path), Err(AssetError::Gltf(_))));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_minimal_embedded_triangle() {
        // One triangle, positions as a base64 data URI
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bytes: Vec<u8> = positions.iter().flat_map(|f| f.to_le_bytes()).collect();
        let json = format!(
            r#"{{
                "asset": {{ "version": "2.0" }},
                "scene": 0,
                "scenes": [{{ "nodes": [0] }}],
                "nodes": [{{ "mesh": 0, "translation": [0.0, 2.0, 0.0] }}],
                "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
                "accessors": [{{
                    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                    "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
                }}],
                "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
                "buffers": [{{ "byteLength": 36, "uri": "data:application/octet-stream;base64,{}" }}]
            }}"#,
            encode_base64(&bytes)
        );
        let path = std::env::temp_dir().join("galaxy_scene_triangle.gltf");
        std::fs::write(&path, json).unwrap();

        let asset = load(&path).unwrap();
        assert_eq!(asset.object.triangle_count(), 1);
        assert!(asset.clips.is_empty());
        // Node translation is baked in
        assert_eq!(asset.object.meshes[0].vertices()[0].position, [0.0, 2.0, 0.0]);

        let _ = std::fs::remove_file(path);
    }

    fn encode_base64(bytes: &[u8]) -> String {
        const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
        let mut out = String::new();
        for chunk in bytes.chunks(3) {
            let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
            let n = (b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32;
            for i in 0..4 {
                if i <= chunk.len() {
                    out.push(ALPHABET[(n >> (18 - 6 * i) & 63) as usize] as char);
                } else {
                    out.push('=');
                }
            }
        }
        out
    }
}
