use cgmath::Matrix4;

use super::{transform::Transform, vertex::Vertex3D};
use crate::galaxy::Rgb;
use crate::gfx::geometry::GeometryData;
use crate::gfx::picking::AABB;

/// Triangle mesh with CPU-side geometry and lazily created GPU buffers
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    bounds: AABB,
    pub(crate) vertex_buffer: Option<wgpu::Buffer>,
    pub(crate) index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    /// Builds a mesh from flat position/normal arrays and triangle indices
    ///
    /// Missing or mismatched normals are replaced by averaged face normals.
    pub fn new(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Self {
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            Self::calculate_face_normals(&positions, &indices)
        };

        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
            })
            .collect();

        Self::from_vertices(vertices, indices)
    }

    pub fn from_vertices(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
        Self {
            bounds: AABB::from_vertices(&positions),
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let vertices = geometry
            .vertices
            .iter()
            .zip(&geometry.normals)
            .map(|(position, normal)| Vertex3D {
                position: *position,
                normal: *normal,
            })
            .collect();
        Self::from_vertices(vertices, geometry.indices.clone())
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Bounding box in the mesh's local space
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Iterates triangles as position triples, skipping out-of-range indices
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([a.position, b.position, c.position])
        })
    }

    /// Averaged face normals for geometry that ships without normals
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0; vertex_count * 3];

        let position = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }
            let (v0, v1, v2) = (position(i0), position(i1), position(i2));

            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];

            for vertex_idx in [i0, i1, i2] {
                for axis in 0..3 {
                    normals[vertex_idx * 3 + axis] += face_normal[axis];
                }
            }
        }

        for normal in normals.chunks_exact_mut(3) {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            if length > 0.0 {
                normal.iter_mut().for_each(|n| *n /= length);
            }
        }

        normals
    }
}

/// Flat surface color, optionally shaded by the scene's toon lighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    /// Unlit materials ignore scene lighting entirely
    pub lit: bool,
}

impl Material {
    pub fn basic(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            lit: false,
        }
    }

    pub fn toon(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            lit: true,
        }
    }
}

/// GPU uniform data shared by every drawable: model matrix, color, parameters
///
/// `params.x` carries the point size for point clouds, `params.y` the lit flag.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>, color: Rgb, opacity: f32, params: [f32; 4]) -> Self {
        Self {
            model: model.into(),
            color: [color.r, color.g, color.b, opacity],
            params,
        }
    }
}

/// Per-drawable uniform buffer and its bind group
pub struct ObjectGpuResources {
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// A named mesh group with a transform, material and visibility flag
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Transform,
    pub material: Material,
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>, // None until the renderer uploads it
}

impl Object {
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>, material: Material) -> Self {
        Self {
            name: name.into(),
            meshes,
            transform: Transform::default(),
            material,
            visible: true,
            gpu_resources: None,
        }
    }

    /// World matrix from the current transform
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.transform.matrix()
    }

    pub fn uniform(&self) -> ObjectUniform {
        ObjectUniform::new(
            self.world_matrix(),
            self.material.color,
            self.material.opacity,
            [0.0, if self.material.lit { 1.0 } else { 0.0 }, 0.0, 0.0],
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices().len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices().len() / 3).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_normals_for_flat_triangle() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = Mesh::new(positions, Vec::new(), vec![0, 1, 2]);

        for vertex in mesh.vertices() {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = Mesh::new(positions, Vec::new(), vec![0, 1, 2, 0, 1, 9]);

        assert_eq!(mesh.triangles().count(), 1);
    }
}
