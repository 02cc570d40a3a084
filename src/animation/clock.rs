//! Frame clock and the per-frame scene update.

use std::time::Instant;

use crate::gfx::scene::SceneContext;

/// Angular rate of the galaxy about its x and y axes, radians per second
pub const GALAXY_ROTATION_RATE: f32 = 0.03;

/// Vertical spacing between scroll sections; one viewport height of scroll
/// moves the camera down by this much
pub const OBJECTS_DISTANCE: f32 = 4.0;

/// Time sample for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the clock started
    pub elapsed: f32,
    /// Seconds since the previous sample, never negative
    pub delta: f32,
}

/// Monotonic clock producing one [`FrameTime`] per frame
#[derive(Debug, Clone)]
pub struct AnimationClock {
    start: Instant,
    previous: f32,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            previous: 0.0,
        }
    }

    /// Samples wall time since [`AnimationClock::new`]
    pub fn advance(&mut self) -> FrameTime {
        let elapsed = self.start.elapsed().as_secs_f32();
        self.advance_to(elapsed)
    }

    /// Samples an explicit elapsed time
    pub fn advance_to(&mut self, elapsed: f32) -> FrameTime {
        let delta = (elapsed - self.previous).max(0.0);
        self.previous = elapsed;
        FrameTime { elapsed, delta }
    }
}

/// Vertical camera group offset for a scroll position
///
/// A zero-height viewport leaves the camera at rest.
pub fn camera_offset_for_scroll(scroll_offset: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 {
        return 0.0;
    }
    -scroll_offset / viewport_height * OBJECTS_DISTANCE
}

/// Advances the scene by one frame
///
/// Steps run in a fixed order: galaxy rotation, swarm oscillation, camera
/// offset, then skeletal playback. Objects that have not loaded yet are
/// skipped.
pub fn tick(scene: &mut SceneContext, time: FrameTime) {
    let angle = time.elapsed * GALAXY_ROTATION_RATE;
    scene.galaxy.transform.rotation.x = angle;
    scene.galaxy.transform.rotation.y = angle;

    scene.swarm.update(time.elapsed);

    scene.camera.offset.y =
        camera_offset_for_scroll(scene.scroll_offset, scene.viewport.height as f32);

    if let (Some(_), Some(mixer)) = (scene.fox.as_ref(), scene.mixer.as_mut()) {
        mixer.update(time.delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationClip;
    use crate::animation::AnimationPlayer;
    use crate::config::SceneConfig;
    use crate::gfx::scene::object::{Material, Object};
    use crate::galaxy::Rgb;
    use approx::assert_relative_eq;

    fn scene() -> SceneContext {
        SceneContext::new(&SceneConfig::default(), 800, 600, 1.0)
    }

    #[test]
    fn test_delta_is_clamped_non_negative() {
        let mut clock = AnimationClock::new();
        assert_eq!(clock.advance_to(1.0).delta, 1.0);
        assert_eq!(clock.advance_to(1.5).delta, 0.5);
        assert_eq!(clock.advance_to(1.2).delta, 0.0);
    }

    #[test]
    fn test_scroll_of_one_viewport_moves_camera_by_objects_distance() {
        assert_eq!(camera_offset_for_scroll(600.0, 600.0), -OBJECTS_DISTANCE);
        assert_eq!(camera_offset_for_scroll(0.0, 600.0), 0.0);
        assert_eq!(camera_offset_for_scroll(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_tick_applies_scroll_and_rotation() {
        let mut scene = scene();
        scene.scroll_offset = 600.0;

        tick(&mut scene, FrameTime { elapsed: 10.0, delta: 0.016 });

        assert_eq!(scene.camera.offset.y, -4.0);
        assert_relative_eq!(scene.galaxy.transform.rotation.x, 0.3);
        assert_relative_eq!(scene.galaxy.transform.rotation.y, 0.3);
    }

    #[test]
    fn test_tick_moves_swarm_before_returning() {
        let mut scene = scene();
        tick(&mut scene, FrameTime { elapsed: 2.0, delta: 0.016 });

        for agent in scene.swarm.agents() {
            assert_relative_eq!(agent.object.transform.position.y, agent.offset_at(2.0));
        }
    }

    #[test]
    fn test_mixer_waits_for_skeletal_model() {
        let mut scene = scene();
        scene.mixer = Some(AnimationPlayer::new(
            AnimationClip::new("Run", 1.0),
            "fox",
        ));

        tick(&mut scene, FrameTime { elapsed: 0.25, delta: 0.25 });
        assert_eq!(scene.mixer.as_ref().map(|m| m.time()), Some(0.0));

        scene.fox = Some(Object::new("fox", Vec::new(), Material::toon(Rgb::WHITE)));
        tick(&mut scene, FrameTime { elapsed: 0.5, delta: 0.25 });
        assert_eq!(scene.mixer.as_ref().map(|m| m.time()), Some(0.25));
    }
}
