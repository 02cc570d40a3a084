//! # Scene Management Module
//!
//! Scene nodes and the frame-to-frame scene state.
//!
//! ## Key Components
//!
//! - [`SceneContext`] - The aggregate the frame loop reads and mutates
//! - [`Object`] - Triangle meshes with a material and transform
//! - [`PointCloud`] - Colored points drawn as camera-facing quads
//! - [`Transform`] - Position, Euler rotation and scale
//! - [`Vertex3D`] / [`PointInstance`] - GPU vertex formats

pub mod object;
pub mod point_cloud;
pub mod scene;
pub mod transform;
pub mod vertex;

// Re-export main types
pub use object::{Material, Mesh, Object, ObjectUniform};
pub use point_cloud::{PointCloud, PointMaterial};
pub use scene::{SceneContext, Viewport};
pub use transform::Transform;
pub use vertex::{PointInstance, Vertex3D};
