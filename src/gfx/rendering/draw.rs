//! Render pass extensions for scene drawables.

use std::ops::Range;

use crate::gfx::scene::object::{Mesh, Object};
use crate::gfx::scene::point_cloud::PointCloud;

/// Corners of the two triangles forming one point sprite
pub const POINT_QUAD_VERTICES: u32 = 6;

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    fn draw_object(&mut self, object: &'a Object);
    fn draw_point_cloud(&mut self, cloud: &'a PointCloud);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count(), 0, instances);
    }

    fn draw_object(&mut self, object: &'b Object) {
        let Some(resources) = &object.gpu_resources else {
            return;
        };
        self.set_bind_group(1, &resources.bind_group, &[]);
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }

    fn draw_point_cloud(&mut self, cloud: &'b PointCloud) {
        let Some(resources) = &cloud.gpu_resources else {
            return;
        };
        let Some(instance_buffer) = &resources.instance_buffer else {
            return; // Empty cloud
        };

        self.set_bind_group(1, &resources.bind_group, &[]);
        self.set_vertex_buffer(0, instance_buffer.slice(..));
        self.draw(0..POINT_QUAD_VERTICES, 0..cloud.len() as u32);
    }
}
