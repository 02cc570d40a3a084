//! # Graphics Module
//!
//! Everything between scene state and pixels on screen.
//!
//! - **Camera** ([`camera`]) - Perspective camera mounted on a scroll-driven rig
//! - **Geometry** ([`geometry`]) - Procedural spheres and the starfield
//! - **Picking** ([`picking`]) - Pointer rays and triangle hit tests
//! - **Rendering** ([`rendering`]) - wgpu pipelines for meshes and point sprites
//! - **Scene** ([`scene`]) - Objects, point clouds and the [`SceneContext`]
//!
//! [`SceneContext`]: scene::SceneContext

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod scene;

// Re-export commonly used types
pub use rendering::render_engine::RenderEngine;
