//! # Procedural Geometry Generation
//!
//! Generates the scene's built-in shapes so they need no model files.
//!
//! ## Supported Primitives
//!
//! - **Sphere**: UV sphere with configurable radius and resolution
//! - **Starfield**: uniformly scattered white points filling a cube
//!
//! ## Usage
//!
//! ```rust
//! use galaxy_scene::gfx::geometry::generate_sphere;
//!
//! let sphere = generate_sphere(0.3, 32, 32);
//! assert_eq!(sphere.vertex_count(), 33 * 33);
//! ```

pub mod primitives;
pub mod starfield;

pub use primitives::*;
pub use starfield::generate_starfield;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
