use std::f32::consts::PI;

use cgmath::{Deg, Vector2, Vector3};
use log::{debug, error, info};

use super::object::Object;
use super::point_cloud::{PointCloud, PointMaterial};
use super::transform::Transform;
use crate::animation::clock::OBJECTS_DISTANCE;
use crate::animation::swarm::SWARM_BASE_COLOR;
use crate::animation::{AgentSwarm, AnimationPlayer};
use crate::assets::{AssetHandle, AssetLoader, LoadState, LoadedAsset};
use crate::config::{AssetPaths, SceneConfig, ScrollConfig, Visibility};
use crate::events::{EventQueue, SceneEvent};
use crate::galaxy::{self, GalaxyParameters, Rgb};
use crate::gfx::camera::{CameraRig, PerspectiveCamera};
use crate::gfx::geometry::generate_starfield;

pub const GALAXY_POSITION: Vector3<f32> = Vector3::new(2.0, 0.0, 0.0);

pub const FOX_POSITION: Vector3<f32> = Vector3::new(-2.0, -OBJECTS_DISTANCE * 1.3, 0.0);
pub const FOX_SCALE: f32 = 0.03;
/// Clip played on the skeletal model, when it has that many clips
pub const FOX_CLIP_INDEX: usize = 2;

pub const DUCK_POSITION: Vector3<f32> = Vector3::new(2.0, -OBJECTS_DISTANCE * 2.2, 0.0);
pub const DUCK_SCALE: f32 = 0.2;
pub const DUCK_ROTATION_Y: f32 = PI * 1.5;

pub const SWARM_ANCHOR: Vector3<f32> = Vector3::new(2.0, -6.0, 0.0);

pub const STAR_COUNT: usize = 10_000;
pub const STARFIELD_EXTENT: f32 = 1000.0;
pub const STAR_SIZE: f32 = 2.0;
pub const STAR_OPACITY: f32 = 0.8;

pub const CAMERA_FOV: f32 = 35.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_DISTANCE: f32 = 6.0;

pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Drawable area in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Display scale factor, capped at [`MAX_PIXEL_RATIO`]
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: (scale_factor as f32).min(MAX_PIXEL_RATIO),
        }
    }

    /// Maps a pixel position to normalized device coordinates, +Y up
    pub fn to_ndc(&self, x: f32, y: f32) -> Vector2<f32> {
        if self.width == 0 || self.height == 0 {
            return Vector2::new(0.0, 0.0);
        }
        Vector2::new(
            2.0 * x / self.width as f32 - 1.0,
            -(2.0 * y / self.height as f32 - 1.0),
        )
    }
}

/// Everything the frame loop reads and mutates
///
/// Loaded models start as `None` and are filled in by [`SceneContext::poll_assets`]
/// whenever their loads finish; every consumer checks for presence.
pub struct SceneContext {
    pub camera: CameraRig,
    pub viewport: Viewport,
    /// Pointer in normalized device coordinates
    pub pointer: Vector2<f32>,
    /// Scroll position in pixels
    pub scroll_offset: f32,
    pub galaxy: PointCloud,
    pub starfield: PointCloud,
    pub duck: Option<Object>,
    pub fox: Option<Object>,
    /// Looped clip bound to the fox
    pub mixer: Option<AnimationPlayer>,
    pub swarm: AgentSwarm,
    parameters: GalaxyParameters,
    visibility: Visibility,
    scroll: ScrollConfig,
    generation: u64,
    pending_duck: Option<AssetHandle>,
    pending_fox: Option<AssetHandle>,
}

impl SceneContext {
    /// Builds the procedural parts of the scene; models are requested separately
    pub fn new(config: &SceneConfig, width: u32, height: u32, scale_factor: f64) -> Self {
        let viewport = Viewport::new(width, height, scale_factor);
        let mut rng = rand::rng();

        let mut camera = PerspectiveCamera::new(
            Deg(CAMERA_FOV),
            width.max(1) as f32 / height.max(1) as f32,
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        camera.position = Vector3::new(0.0, 0.0, CAMERA_DISTANCE);

        let parameters = config.galaxy.sanitized();
        let mut galaxy = Self::build_galaxy(&parameters);
        galaxy.visible = config.visibility.show_galaxy;

        let starfield = PointCloud::new(
            "starfield",
            generate_starfield(STAR_COUNT, STARFIELD_EXTENT, &mut rng),
            PointMaterial {
                size: STAR_SIZE,
                tint: Rgb::WHITE,
                opacity: STAR_OPACITY,
                transparent: true,
            },
        );

        Self {
            camera: CameraRig::new(camera),
            viewport,
            pointer: Vector2::new(0.0, 0.0),
            scroll_offset: 0.0,
            galaxy,
            starfield,
            duck: None,
            fox: None,
            mixer: None,
            swarm: AgentSwarm::new(SWARM_ANCHOR, SWARM_BASE_COLOR, &mut rng),
            parameters,
            visibility: config.visibility,
            scroll: config.scroll,
            generation: 1,
            pending_duck: None,
            pending_fox: None,
        }
    }

    fn build_galaxy(parameters: &GalaxyParameters) -> PointCloud {
        let buffers = galaxy::generate(parameters, &mut rand::rng());
        let mut cloud = PointCloud::new(
            "galaxy",
            buffers,
            PointMaterial::vertex_colors(parameters.size),
        );
        cloud.transform = Transform::from_position(GALAXY_POSITION);
        cloud
    }

    /// Starts loading both models in the background
    pub fn request_assets(&mut self, loader: &AssetLoader, paths: &AssetPaths) {
        info!("Loading {} and {}", paths.fox.display(), paths.duck.display());
        self.pending_fox = Some(loader.load(&paths.fox));
        self.pending_duck = Some(loader.load(&paths.duck));
    }

    /// Moves finished loads into the scene; failures are logged and never retried
    pub fn poll_assets(&mut self) {
        if let Some(asset) = Self::poll_handle(&mut self.pending_fox) {
            self.insert_fox(asset);
        }
        if let Some(asset) = Self::poll_handle(&mut self.pending_duck) {
            self.insert_duck(asset);
        }
    }

    fn poll_handle(slot: &mut Option<AssetHandle>) -> Option<LoadedAsset> {
        let handle = slot.as_mut()?;
        match handle.try_take() {
            LoadState::Pending => None,
            LoadState::Loaded(asset) => {
                *slot = None;
                Some(asset)
            }
            LoadState::Failed(err) => {
                error!("Error loading {}: {}", handle.path().display(), err);
                *slot = None;
                None
            }
        }
    }

    /// True while either model load is still in flight
    pub fn assets_pending(&self) -> bool {
        self.pending_fox.is_some() || self.pending_duck.is_some()
    }

    /// Places the skeletal model and starts its looped clip if it has one
    pub fn insert_fox(&mut self, asset: LoadedAsset) {
        let LoadedAsset { mut object, clips } = asset;
        object.name = "fox".to_string();
        object.transform = Transform::from_position(FOX_POSITION).with_uniform_scale(FOX_SCALE);
        object.visible = self.visibility.show_fox;

        self.mixer = if clips.len() > FOX_CLIP_INDEX {
            clips
                .into_iter()
                .nth(FOX_CLIP_INDEX)
                .map(|clip| AnimationPlayer::new(clip, object.name.clone()))
        } else {
            None
        };
        self.fox = Some(object);
    }

    pub fn insert_duck(&mut self, asset: LoadedAsset) {
        let mut object = asset.object;
        object.name = "duck".to_string();
        object.transform = Transform::from_position(DUCK_POSITION)
            .with_uniform_scale(DUCK_SCALE)
            .with_rotation_y(DUCK_ROTATION_Y);
        object.visible = self.visibility.show_duck;
        self.duck = Some(object);
    }

    /// Applies every queued event, in order; returns how many were applied
    pub fn process_events(&mut self, queue: &mut EventQueue) -> usize {
        let mut applied = 0;
        for event in queue.drain() {
            self.apply_event(event);
            applied += 1;
        }
        if applied > 0 {
            debug!("Applied {applied} scene events");
        }
        applied
    }

    pub fn apply_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::PointerMoved { x, y } => self.pointer = self.viewport.to_ndc(x, y),
            SceneEvent::Scrolled { delta } => self.scroll_by(delta),
            SceneEvent::Resized {
                width,
                height,
                scale_factor,
            } => self.resize(width, height, scale_factor),
            SceneEvent::ParametersChanged(parameters) => self.regenerate_galaxy(parameters),
            SceneEvent::VisibilityChanged(visibility) => self.set_visibility(visibility),
        }
    }

    /// Zero sizes (a minimized window) are ignored so the scroll position survives
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport::new(width, height, scale_factor);
        self.camera.camera.resize_projection(width, height);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    /// Largest scroll position for the current viewport
    pub fn max_scroll(&self) -> f32 {
        self.scroll.max_pages * self.viewport.height as f32
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_offset = (self.scroll_offset + delta).clamp(0.0, self.max_scroll());
    }

    pub fn scroll_config(&self) -> ScrollConfig {
        self.scroll
    }

    /// Replaces the galaxy with a freshly generated one
    ///
    /// The new cloud takes over position, rotation and visibility, and is in
    /// place before the old buffers are dropped.
    pub fn regenerate_galaxy(&mut self, parameters: GalaxyParameters) {
        let parameters = parameters.sanitized();
        let mut galaxy = Self::build_galaxy(&parameters);
        galaxy.transform = self.galaxy.transform;
        galaxy.visible = self.galaxy.visible;

        let previous = std::mem::replace(&mut self.galaxy, galaxy);
        drop(previous);

        self.parameters = parameters;
        self.generation += 1;
        info!(
            "Regenerated galaxy: {} particles, {} branches",
            self.parameters.count, self.parameters.branches
        );
    }

    /// Shows or hides objects without touching their geometry
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        self.galaxy.visible = visibility.show_galaxy;
        if let Some(duck) = self.duck.as_mut() {
            duck.visible = visibility.show_duck;
        }
        if let Some(fox) = self.fox.as_mut() {
            fox.visible = visibility.show_fox;
        }
    }

    pub fn parameters(&self) -> &GalaxyParameters {
        &self.parameters
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Number of galaxies generated so far, starting at 1
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Triangle-mesh objects currently in the scene
    pub fn mesh_objects(&self) -> impl Iterator<Item = &Object> {
        self.fox
            .iter()
            .chain(self.duck.iter())
            .chain(self.swarm.objects())
    }

    pub fn mesh_objects_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.fox
            .iter_mut()
            .chain(self.duck.iter_mut())
            .chain(self.swarm.objects_mut())
    }

    /// Opaque clouds first, translucent ones last
    pub fn point_clouds(&self) -> impl Iterator<Item = &PointCloud> {
        [&self.galaxy, &self.starfield].into_iter()
    }

    pub fn point_clouds_mut(&mut self) -> impl Iterator<Item = &mut PointCloud> {
        [&mut self.galaxy, &mut self.starfield].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationClip;
    use crate::gfx::scene::object::Material;
    use approx::assert_relative_eq;

    fn scene() -> SceneContext {
        SceneContext::new(&SceneConfig::default(), 800, 600, 1.0)
    }

    fn model(clips: usize) -> LoadedAsset {
        LoadedAsset {
            object: Object::new("model", Vec::new(), Material::toon(Rgb::WHITE)),
            clips: (0..clips)
                .map(|i| AnimationClip::new(format!("clip_{i}"), 1.0))
                .collect(),
        }
    }

    #[test]
    fn test_initial_galaxy_matches_config() {
        let scene = scene();
        assert_eq!(scene.galaxy.len(), 1000);
        assert_eq!(scene.galaxy.transform.position, GALAXY_POSITION);
        assert_eq!(scene.starfield.len(), STAR_COUNT);
        assert_eq!(scene.swarm.len(), 5);
        assert!(scene.duck.is_none() && scene.fox.is_none() && scene.mixer.is_none());
    }

    #[test]
    fn test_pointer_maps_to_ndc() {
        let mut scene = scene();
        scene.apply_event(SceneEvent::PointerMoved { x: 0.0, y: 0.0 });
        assert_eq!(scene.pointer, Vector2::new(-1.0, 1.0));

        scene.apply_event(SceneEvent::PointerMoved { x: 400.0, y: 300.0 });
        assert_eq!(scene.pointer, Vector2::new(0.0, 0.0));

        scene.apply_event(SceneEvent::PointerMoved { x: 800.0, y: 600.0 });
        assert_eq!(scene.pointer, Vector2::new(1.0, -1.0));
    }

    #[test]
    fn test_scroll_is_clamped_to_page_range() {
        let mut scene = scene();
        scene.apply_event(SceneEvent::Scrolled { delta: -50.0 });
        assert_eq!(scene.scroll_offset, 0.0);

        scene.apply_event(SceneEvent::Scrolled { delta: 10_000.0 });
        assert_eq!(scene.scroll_offset, 2.5 * 600.0);
    }

    #[test]
    fn test_minimize_keeps_scroll_offset() {
        let mut scene = scene();
        scene.apply_event(SceneEvent::Scrolled { delta: 900.0 });
        scene.apply_event(SceneEvent::Resized {
            width: 0,
            height: 0,
            scale_factor: 1.0,
        });
        assert_eq!(scene.viewport.height, 600);

        scene.apply_event(SceneEvent::Resized {
            width: 800,
            height: 600,
            scale_factor: 1.0,
        });
        assert_eq!(scene.scroll_offset, 900.0);
    }

    #[test]
    fn test_resize_updates_viewport_and_aspect() {
        let mut scene = scene();
        scene.apply_event(SceneEvent::Resized {
            width: 1000,
            height: 500,
            scale_factor: 3.0,
        });

        assert_eq!(scene.viewport.width, 1000);
        assert_eq!(scene.viewport.pixel_ratio, 2.0);
        assert_relative_eq!(scene.camera.camera.aspect, 2.0);
    }

    #[test]
    fn test_visibility_toggle_does_not_regenerate() {
        let mut scene = scene();
        scene.insert_duck(model(0));
        let generation = scene.generation();
        let first_position = scene.galaxy.buffers().positions.clone();

        let mut queue = EventQueue::new();
        queue.push(SceneEvent::VisibilityChanged(Visibility {
            show_duck: false,
            show_fox: true,
            show_galaxy: false,
        }));
        assert_eq!(scene.process_events(&mut queue), 1);

        assert_eq!(scene.generation(), generation);
        assert_eq!(scene.galaxy.buffers().positions, first_position);
        assert!(!scene.galaxy.visible);
        assert!(!scene.duck.as_ref().unwrap().visible);
    }

    #[test]
    fn test_parameter_change_replaces_galaxy() {
        let mut scene = scene();
        scene.set_visibility(Visibility {
            show_galaxy: false,
            ..Default::default()
        });

        scene.apply_event(SceneEvent::ParametersChanged(GalaxyParameters {
            count: 0,
            branches: 0,
            ..Default::default()
        }));

        assert_eq!(scene.generation(), 2);
        assert!(scene.galaxy.is_empty());
        assert_eq!(scene.parameters().branches, 1);
        assert!(!scene.galaxy.visible);
        assert_eq!(scene.galaxy.transform.position, GALAXY_POSITION);
    }

    #[test]
    fn test_fox_plays_third_clip_only_when_present() {
        let mut scene = scene();
        scene.insert_fox(model(2));
        assert!(scene.mixer.is_none());

        scene.insert_fox(model(3));
        let mixer = scene.mixer.as_ref().unwrap();
        assert_eq!(mixer.clip().name, "clip_2");
        assert_eq!(mixer.target(), "fox");

        let fox = scene.fox.as_ref().unwrap();
        assert_eq!(fox.transform.position, FOX_POSITION);
        assert_eq!(fox.transform.scale, Vector3::new(0.03, 0.03, 0.03));
    }

    #[test]
    fn test_duck_inserted_hidden_when_toggle_off() {
        let mut scene = SceneContext::new(
            &SceneConfig {
                visibility: Visibility {
                    show_duck: false,
                    ..Default::default()
                },
                ..Default::default()
            },
            800,
            600,
            1.0,
        );
        scene.insert_duck(model(0));

        let duck = scene.duck.as_ref().unwrap();
        assert!(!duck.visible);
        assert_eq!(duck.transform.position, DUCK_POSITION);
        assert_relative_eq!(duck.transform.rotation.y, DUCK_ROTATION_Y);
    }

    #[test]
    fn test_failed_load_leaves_slot_empty() {
        let mut scene = scene();
        let (sender, handle) = AssetHandle::channel("Duck.glb".into());
        scene.pending_duck = Some(handle);

        scene.poll_assets();
        assert!(scene.assets_pending());

        drop(sender);
        scene.poll_assets();
        assert!(!scene.assets_pending());
        assert!(scene.duck.is_none());
    }

    #[test]
    fn test_loaded_asset_arrives_between_frames() {
        let mut scene = scene();
        let (sender, handle) = AssetHandle::channel("Duck.glb".into());
        scene.pending_duck = Some(handle);

        assert!(sender.send(Ok(model(0))).is_ok());
        scene.poll_assets();
        assert!(scene.duck.is_some());
        assert_eq!(scene.mesh_objects().count(), 1 + scene.swarm.len());
    }
}
