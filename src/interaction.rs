//! # Pointer Interaction
//!
//! Hover feedback for the static model and the marker swarm, recomputed from
//! scratch every frame from a fresh pointer ray.
//!
//! - The duck grows to `hover_scale` while any part of it is under the
//!   pointer and returns to `base_scale` otherwise.
//! - Every swarm agent under the pointer turns `hover_color`, not only the
//!   nearest one. All others are reset to `base_color` first.
//!
//! Hidden objects are still hit-tested: visibility only affects drawing.

use log::debug;

use crate::animation::swarm::{SWARM_BASE_COLOR, SWARM_HOVER_COLOR};
use crate::animation::AgentSwarm;
use crate::galaxy::Rgb;
use crate::gfx::picking::Raycaster;
use crate::gfx::scene::object::Object;
use crate::gfx::scene::SceneContext;

/// Outcome of one interaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverState {
    pub duck: bool,
    pub agents: usize,
}

/// Hover policy constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionEngine {
    pub hover_scale: f32,
    pub base_scale: f32,
    pub base_color: Rgb,
    pub hover_color: Rgb,
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self {
            hover_scale: 1.5,
            base_scale: 1.0,
            base_color: SWARM_BASE_COLOR,
            hover_color: SWARM_HOVER_COLOR,
        }
    }
}

impl InteractionEngine {
    /// Casts the pointer ray against the current frame's transforms
    pub fn update(&self, scene: &mut SceneContext) -> HoverState {
        let raycaster = Raycaster::from_camera(scene.pointer, &scene.camera);

        let duck = match scene.duck.as_mut() {
            Some(duck) => self.hover_duck(&raycaster, duck),
            None => false,
        };
        let agents = self.hover_swarm(&raycaster, &mut scene.swarm);

        HoverState { duck, agents }
    }

    /// Binary scale on the whole model; returns whether it is hovered
    pub fn hover_duck(&self, raycaster: &Raycaster, duck: &mut Object) -> bool {
        let hovered = !raycaster.intersect_object(duck).is_empty();
        let scale = if hovered {
            self.hover_scale
        } else {
            self.base_scale
        };
        duck.transform.set_uniform_scale(scale);
        hovered
    }

    /// Resets every agent, then highlights each one the ray passes through
    ///
    /// Returns the number of highlighted agents.
    pub fn hover_swarm(&self, raycaster: &Raycaster, swarm: &mut AgentSwarm) -> usize {
        let hits = raycaster.intersect_objects(swarm.objects());
        let previously_hovered = swarm.agents().iter().filter(|a| a.hovered).count();

        for agent in swarm.agents_mut() {
            agent.hovered = false;
            agent.object.material.color = self.base_color;
        }

        let agents = swarm.agents_mut();
        for hit in &hits {
            if let Some(agent) = agents.get_mut(hit.object_index) {
                agent.hovered = true;
                agent.object.material.color = self.hover_color;
            }
        }

        let hovered = agents.iter().filter(|a| a.hovered).count();
        if hovered != previously_hovered {
            debug!("Hovered markers: {previously_hovered} -> {hovered}");
        }
        hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::gfx::geometry::generate_sphere;
    use crate::gfx::picking::Ray;
    use crate::gfx::scene::object::{Material, Mesh};
    use cgmath::Vector3;
    use rand::{rngs::StdRng, SeedableRng};

    /// Swarm with agents spread out along x so a vertical ray hits at most one
    fn swarm() -> AgentSwarm {
        let mut swarm = AgentSwarm::new(
            Vector3::new(2.0, -6.0, 0.0),
            Rgb::WHITE,
            &mut StdRng::seed_from_u64(11),
        );
        for (i, object) in swarm.objects_mut().enumerate() {
            object.transform.position = Vector3::new(i as f32 * 2.0, -8.0, 0.0);
        }
        swarm
    }

    fn ray_through(point: Vector3<f32>) -> Raycaster {
        Raycaster::new(Ray::new(
            Vector3::new(point.x, point.y, 10.0),
            Vector3::new(0.0, 0.0, -1.0),
        ))
    }

    fn miss() -> Raycaster {
        Raycaster::new(Ray::new(
            Vector3::new(100.0, 100.0, 10.0),
            Vector3::new(0.0, 0.0, -1.0),
        ))
    }

    #[test]
    fn test_swarm_hover_reverts_next_frame() {
        let engine = InteractionEngine::default();
        let mut swarm = swarm();
        let target = swarm.agents()[2].object.transform.position;

        assert_eq!(engine.hover_swarm(&ray_through(target), &mut swarm), 1);
        assert!(swarm.agents()[2].hovered);
        assert_eq!(swarm.agents()[2].object.material.color, engine.hover_color);

        assert_eq!(engine.hover_swarm(&miss(), &mut swarm), 0);
        for agent in swarm.agents() {
            assert!(!agent.hovered);
            assert_eq!(agent.object.material.color, engine.base_color);
        }
    }

    #[test]
    fn test_markers_spawn_in_the_reset_color() {
        let engine = InteractionEngine::default();
        let scene = SceneContext::new(&SceneConfig::default(), 800, 600, 1.0);

        for agent in scene.swarm.agents() {
            assert_eq!(agent.object.material.color, engine.base_color);
        }
    }

    #[test]
    fn test_every_agent_on_the_ray_is_highlighted() {
        let engine = InteractionEngine::default();
        let mut swarm = swarm();

        // Line two agents up along the ray, one behind the other
        let front = swarm.agents()[0].object.transform.position;
        swarm.agents_mut()[3].object.transform.position =
            Vector3::new(front.x, front.y, front.z - 2.0);

        assert_eq!(engine.hover_swarm(&ray_through(front), &mut swarm), 2);
        assert!(swarm.agents()[0].hovered);
        assert!(swarm.agents()[3].hovered);
    }

    #[test]
    fn test_duck_scale_is_binary() {
        let engine = InteractionEngine::default();
        let mut duck = Object::new(
            "duck",
            vec![Mesh::from_geometry(&generate_sphere(0.5, 16, 16))],
            Material::toon(Rgb::WHITE),
        );
        duck.transform.position = Vector3::new(2.0, -8.8, 0.0);

        assert!(engine.hover_duck(&ray_through(duck.transform.position), &mut duck));
        assert_eq!(duck.transform.scale, Vector3::new(1.5, 1.5, 1.5));

        assert!(!engine.hover_duck(&miss(), &mut duck));
        assert_eq!(duck.transform.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_missing_duck_is_skipped() {
        let engine = InteractionEngine::default();
        let mut scene = SceneContext::new(&crate::config::SceneConfig::default(), 800, 600, 1.0);
        scene.pointer = cgmath::Vector2::new(0.99, 0.99);

        let state = engine.update(&mut scene);
        assert!(!state.duck);
        assert!(scene.duck.is_none());
    }
}
