// src/lib.rs
//! Galaxy Scene
//!
//! An interactive point-cloud scene built on wgpu and winit: a procedural
//! spiral galaxy, a starfield, two loaded models and a swarm of hoverable
//! markers, with the camera following page scroll.

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod events;
pub mod galaxy;
pub mod gfx;
pub mod interaction;
pub mod ui;

// Re-export main types for convenience
pub use app::GalaxyApp;
pub use config::SceneConfig;
pub use galaxy::{GalaxyBuffers, GalaxyParameters};
