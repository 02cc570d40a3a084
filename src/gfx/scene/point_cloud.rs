use super::{object::ObjectUniform, transform::Transform, vertex::PointInstance};
use crate::galaxy::{GalaxyBuffers, Rgb};

/// Point size, tint and opacity for a point cloud
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Diameter of each point in world units
    pub size: f32,
    /// Multiplied with the per-point colors
    pub tint: Rgb,
    pub opacity: f32,
    /// Translucent clouds are drawn after opaque geometry without depth writes
    pub transparent: bool,
}

impl PointMaterial {
    pub fn vertex_colors(size: f32) -> Self {
        Self {
            size,
            tint: Rgb::WHITE,
            opacity: 1.0,
            transparent: false,
        }
    }
}

/// Instance buffer for a point cloud
pub struct PointCloudGpuResources {
    pub instance_buffer: Option<wgpu::Buffer>, // None for an empty cloud
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// A renderable set of colored points with no connecting geometry
pub struct PointCloud {
    pub name: String,
    buffers: GalaxyBuffers,
    pub transform: Transform,
    pub material: PointMaterial,
    pub visible: bool,
    pub gpu_resources: Option<PointCloudGpuResources>,
}

impl PointCloud {
    pub fn new(name: impl Into<String>, buffers: GalaxyBuffers, material: PointMaterial) -> Self {
        Self {
            name: name.into(),
            buffers,
            transform: Transform::default(),
            material,
            visible: true,
            gpu_resources: None,
        }
    }

    pub fn buffers(&self) -> &GalaxyBuffers {
        &self.buffers
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Interleaves the flat buffers into GPU instance data
    pub fn instances(&self) -> Vec<PointInstance> {
        self.buffers
            .positions()
            .zip(self.buffers.colors())
            .map(|(position, color)| PointInstance { position, color })
            .collect()
    }

    pub fn uniform(&self) -> ObjectUniform {
        ObjectUniform::new(
            self.transform.matrix(),
            self.material.tint,
            self.material.opacity,
            [self.material.size, 0.0, 0.0, 0.0],
        )
    }
}
