use anyhow::{anyhow, Context, Result};
use log::{error, info};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::animation::{self, AnimationClock};
use crate::assets::AssetLoader;
use crate::config::SceneConfig;
use crate::events::{EventQueue, SceneEvent};
use crate::gfx::{scene::SceneContext, RenderEngine};
use crate::interaction::{HoverState, InteractionEngine};
use crate::ui::{GalaxyPanel, PanelStatus, UiManager};

/// Window, renderer and scene wired into a winit event loop
pub struct GalaxyApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Option<SceneContext>,
    panel: GalaxyPanel,
    events: EventQueue,
    clock: AnimationClock,
    interaction: InteractionEngine,
    loader: AssetLoader,
    hover: HoverState,
    init_error: Option<anyhow::Error>,
}

impl GalaxyApp {
    pub fn new(config: SceneConfig) -> Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let panel = GalaxyPanel::new(config.galaxy.sanitized(), config.visibility);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene: None,
                panel,
                events: EventQueue::new(),
                clock: AnimationClock::new(),
                interaction: InteractionEngine::default(),
                loader: AssetLoader::new(),
                hover: HoverState::default(),
                init_error: None,
            },
        })
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| anyhow!("Event loop already consumed"))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated with an error")?;

        match self.app_state.init_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.window.title.clone())
                    .with_inner_size(LogicalSize::new(
                        self.config.window.width,
                        self.config.window.height,
                    )),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);
        let PhysicalSize { width, height } = window.inner_size();

        let renderer = pollster::block_on(RenderEngine::new(window.clone(), width, height))?;
        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );

        let mut scene = SceneContext::new(&self.config, width, height, window.scale_factor());
        scene.request_assets(&self.loader, &self.config.assets);
        info!(
            "Window created at {}x{} (scale {})",
            width,
            height,
            window.scale_factor()
        );

        self.clock = AnimationClock::new();
        self.scene = Some(scene);
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    /// Translates raw window input into scene events
    fn queue_input(&mut self, window: &Window, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.events.push(SceneEvent::PointerMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * self.config.scroll.pixels_per_line,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                self.events.push(SceneEvent::Scrolled { delta });
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.events.push(SceneEvent::Resized {
                    width: *width,
                    height: *height,
                    scale_factor: window.scale_factor(),
                });
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let PhysicalSize { width, height } = window.inner_size();
                self.events.push(SceneEvent::Resized {
                    width,
                    height,
                    scale_factor: *scale_factor,
                });
            }
            _ => (),
        }
    }

    fn redraw(&mut self, window: &Window) {
        let (Some(render_engine), Some(ui_manager), Some(scene)) = (
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
            self.scene.as_mut(),
        ) else {
            return;
        };

        let status = PanelStatus {
            particles: scene.galaxy.len(),
            generation: scene.generation(),
            hovered_markers: self.hover.agents,
            duck_hovered: self.hover.duck,
            assets_loading: scene.assets_pending(),
        };
        let panel = &mut self.panel;
        let events = &mut self.events;
        ui_manager.update_logic(window, |ui| panel.draw(ui, events, &status));

        scene.process_events(&mut self.events);
        scene.poll_assets();

        let time = self.clock.advance();
        animation::tick(scene, time);
        self.hover = self.interaction.update(scene);

        render_engine.prepare(scene);
        render_engine.render_frame(
            scene,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 view: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, view);
                },
            ),
        );
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            error!("Failed to initialise: {err:#}");
            self.init_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_input(&window, window_id, &event) {
                window.request_redraw();
                return;
            }
        }

        self.queue_input(&window, &event);

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(&window),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
