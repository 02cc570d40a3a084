//! WGPU-based rendering engine
//!
//! Owns the surface, device and pipelines, uploads scene drawables lazily and
//! draws a frame in three steps: opaque meshes, the opaque galaxy, then
//! translucent point clouds without depth writes. An optional UI callback
//! renders on top.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use wgpu::util::DeviceExt;
use wgpu::{Device, TextureFormat};

use super::draw::DrawObject;
use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::texture::DepthTexture;
use crate::gfx::camera::CameraUniform;
use crate::gfx::scene::object::{Object, ObjectGpuResources, ObjectUniform};
use crate::gfx::scene::point_cloud::{PointCloud, PointCloudGpuResources};
use crate::gfx::scene::vertex::{PointInstance, Vertex3D};
use crate::gfx::scene::SceneContext;

const MESH_PIPELINE: &str = "Mesh";
const POINTS_PIPELINE: &str = "Points";
const TRANSPARENT_POINTS_PIPELINE: &str = "PointsTransparent";

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.012,
    g: 0.010,
    b: 0.020,
    a: 1.0,
};

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no texture formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!("Surface configured: {:?} {}x{}", format, config.width, config.height);

        let depth_texture = DepthTexture::new(&device, &config, "depth_texture");

        let uniform_layout = |label: &str| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            })
        };
        let camera_layout = uniform_layout("Camera Bind Group Layout");
        let object_layout = uniform_layout("Object Bind Group Layout");

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Wrap device and queue in Arc for pipeline manager
        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("mesh", include_str!("mesh.wgsl"));
        pipeline_manager.load_shader("points", include_str!("points.wgsl"));

        let layouts = vec![camera_layout, object_layout.clone()];

        pipeline_manager.register_pipeline(
            MESH_PIPELINE,
            PipelineConfig::default()
                .with_label("MESH")
                .with_shader("mesh")
                .with_bind_group_layouts(layouts.clone())
                .with_vertex_layouts(vec![Vertex3D::desc()])
                .with_depth(DepthTexture::DEPTH_FORMAT, true)
                .with_color_target(format, Some(wgpu::BlendState::REPLACE)),
        );

        pipeline_manager.register_pipeline(
            POINTS_PIPELINE,
            PipelineConfig::default()
                .with_label("POINTS")
                .with_shader("points")
                .with_bind_group_layouts(layouts.clone())
                .with_vertex_layouts(vec![PointInstance::desc()])
                .with_depth(DepthTexture::DEPTH_FORMAT, true)
                .with_color_target(format, Some(wgpu::BlendState::REPLACE)),
        );

        pipeline_manager.register_pipeline(
            TRANSPARENT_POINTS_PIPELINE,
            PipelineConfig::default()
                .with_label("POINTS TRANSPARENT")
                .with_shader("points")
                .with_bind_group_layouts(layouts)
                .with_vertex_layouts(vec![PointInstance::desc()])
                .with_depth(DepthTexture::DEPTH_FORMAT, false)
                .with_color_target(format, Some(wgpu::BlendState::ALPHA_BLENDING)),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for e in errors {
                error!("{e}");
            }
        }

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            camera_buffer,
            camera_bind_group,
            object_layout,
        })
    }

    /// Uploads camera and per-drawable uniforms, creating GPU buffers for
    /// anything new since the last frame
    pub fn prepare(&mut self, scene: &mut SceneContext) {
        scene.camera.update_view_proj();
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[scene.camera.uniform]),
        );

        for object in scene.mesh_objects_mut() {
            upload_object(&self.device, &self.object_layout, object);
            if let Some(resources) = &object.gpu_resources {
                write_uniform(&self.queue, &resources.uniform_buffer, object.uniform());
            }
        }

        for cloud in scene.point_clouds_mut() {
            upload_point_cloud(&self.device, &self.object_layout, cloud);
            if let Some(resources) = &cloud.gpu_resources {
                write_uniform(&self.queue, &resources.uniform_buffer, cloud.uniform());
            }
        }
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, scene: &SceneContext, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                error!("Failed to acquire surface texture: {err}");
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            if let Some(pipeline) = self.pipeline_manager.pipeline(MESH_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                for object in scene.mesh_objects().filter(|o| o.visible) {
                    render_pass.draw_object(object);
                }
            }

            for (pipeline_name, transparent) in [
                (POINTS_PIPELINE, false),
                (TRANSPARENT_POINTS_PIPELINE, true),
            ] {
                let Some(pipeline) = self.pipeline_manager.pipeline(pipeline_name) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                for cloud in scene
                    .point_clouds()
                    .filter(|c| c.visible && c.material.transparent == transparent)
                {
                    render_pass.draw_point_cloud(cloud);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Resizes the surface and recreates the depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = DepthTexture::new(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format, for creating compatible UI renderers
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn create_uniform_resources(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    uniform: ObjectUniform,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });
    (uniform_buffer, bind_group)
}

fn upload_object(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, object: &mut Object) {
    for mesh in &mut object.meshes {
        if mesh.vertex_buffer.is_some() || mesh.vertices().is_empty() {
            continue;
        }
        mesh.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        mesh.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    if object.gpu_resources.is_none() {
        let (uniform_buffer, bind_group) =
            create_uniform_resources(device, layout, &object.name, object.uniform());
        object.gpu_resources = Some(ObjectGpuResources {
            uniform_buffer,
            bind_group,
        });
    }
}

fn upload_point_cloud(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, cloud: &mut PointCloud) {
    if cloud.gpu_resources.is_some() {
        return;
    }

    let instance_buffer = (!cloud.is_empty()).then(|| {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Instance Buffer"),
            contents: bytemuck::cast_slice(&cloud.instances()),
            usage: wgpu::BufferUsages::VERTEX,
        })
    });
    let (uniform_buffer, bind_group) =
        create_uniform_resources(device, layout, &cloud.name, cloud.uniform());

    cloud.gpu_resources = Some(PointCloudGpuResources {
        instance_buffer,
        uniform_buffer,
        bind_group,
    });
}

fn write_uniform(queue: &wgpu::Queue, buffer: &wgpu::Buffer, uniform: ObjectUniform) {
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[uniform]));
}
