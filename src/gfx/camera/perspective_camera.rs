use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera looking down -Z from a position local to its rig
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    /// Position relative to the owning [`CameraRig`]
    pub position: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl PerspectiveCamera {
    pub fn new(fovy: Deg<f32>, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position: Vector3::zero(),
            aspect,
            fovy,
            znear,
            zfar,
        }
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// OpenGL-convention projection (NDC depth in [-1, 1])
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Group node carrying the camera; its vertical offset follows the scroll
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub offset: Vector3<f32>,
    pub camera: PerspectiveCamera,
    pub uniform: CameraUniform,
}

impl Camera for CameraRig {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.view_projection_gl()
    }
}

impl CameraRig {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            offset: Vector3::zero(),
            camera,
            uniform: CameraUniform::default(),
        }
    }

    /// Camera position in world space
    pub fn world_position(&self) -> Vector3<f32> {
        self.offset + self.camera.position
    }

    /// Inverse of the camera's world transform; the camera never rotates
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(-self.world_position())
    }

    /// Projection * view in OpenGL clip conventions, as used for picking
    pub fn view_projection_gl(&self) -> Matrix4<f32> {
        self.camera.projection_matrix() * self.view_matrix()
    }

    pub fn update_view_proj(&mut self) {
        let eye = self.world_position();
        self.uniform.view_position = [eye.x, eye.y, eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
        self.uniform.point_scale = [1.0 / self.camera.aspect.max(f32::EPSILON), 1.0, 0.0, 0.0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rig_offset_moves_eye() {
        let mut camera = PerspectiveCamera::new(Deg(35.0), 1.5, 0.1, 1000.0);
        camera.position = Vector3::new(0.0, 0.0, 6.0);
        let mut rig = CameraRig::new(camera);
        rig.offset.y = -4.0;
        rig.update_view_proj();

        assert_eq!(rig.world_position(), Vector3::new(0.0, -4.0, 6.0));
        assert_eq!(rig.uniform.view_position, [0.0, -4.0, 6.0, 1.0]);
        assert_relative_eq!(rig.uniform.point_scale[0], 1.0 / 1.5);
    }

    #[test]
    fn test_point_in_front_projects_to_centre() {
        let mut camera = PerspectiveCamera::new(Deg(35.0), 1.0, 0.1, 1000.0);
        camera.position = Vector3::new(0.0, 0.0, 6.0);
        let rig = CameraRig::new(camera);

        let clip = rig.view_projection_gl() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0);
        assert_relative_eq!(clip.y / clip.w, 0.0);
    }

    #[test]
    fn test_resize_ignores_zero_height() {
        let mut camera = PerspectiveCamera::new(Deg(35.0), 1.0, 0.1, 1000.0);
        camera.resize_projection(800, 0);
        assert_eq!(camera.aspect, 1.0);
        camera.resize_projection(800, 400);
        assert_eq!(camera.aspect, 2.0);
    }
}
