//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the scene. [`UiManager`] owns the ImGui
//! context and its winit/wgpu glue; [`GalaxyPanel`] edits the galaxy
//! parameters and object visibility and reports changes through the scene's
//! event queue.
//!
//! When the UI wants the mouse, pointer and wheel input is not forwarded to
//! the scene, so dragging a slider neither scrolls the camera nor hovers
//! markers.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{GalaxyPanel, PanelStatus};
