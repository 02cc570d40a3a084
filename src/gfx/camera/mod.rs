pub mod camera_utils;
pub mod perspective_camera;

// Re-export main types
pub use camera_utils::{Camera, CameraUniform};
pub use perspective_camera::{CameraRig, PerspectiveCamera};
