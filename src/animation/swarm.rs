//! Marker spheres bobbing around a fixed anchor.

use cgmath::Vector3;
use rand::Rng;

use crate::galaxy::Rgb;
use crate::gfx::geometry::generate_sphere;
use crate::gfx::scene::object::{Material, Mesh, Object};
use crate::gfx::scene::transform::Transform;

/// Oscillation frequency per agent; the swarm has one agent per entry
pub const SWARM_FREQUENCIES: [f32; 5] = [0.3, 0.8, 1.4, 1.1, 0.5];

/// Marker color at rest (`#ffea00`)
pub const SWARM_BASE_COLOR: Rgb = Rgb::new(1.0, 234.0 / 255.0, 0.0);
/// Marker color under the pointer (`#be0aff`)
pub const SWARM_HOVER_COLOR: Rgb = Rgb::new(190.0 / 255.0, 10.0 / 255.0, 1.0);

/// Peak vertical displacement from an agent's base position
pub const SWARM_AMPLITUDE: f32 = 1.5;

pub const SPHERE_RADIUS: f32 = 0.3;
pub const SPHERE_SEGMENTS: u32 = 32;

/// One marker sphere
pub struct SwarmAgent {
    base_position: Vector3<f32>,
    frequency: f32,
    pub object: Object,
    /// Set by the interaction pass each frame
    pub hovered: bool,
}

impl SwarmAgent {
    pub fn base_position(&self) -> Vector3<f32> {
        self.base_position
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Vertical position at `elapsed` seconds
    pub fn offset_at(&self, elapsed: f32) -> f32 {
        self.base_position.y + SWARM_AMPLITUDE * (elapsed * self.frequency).sin()
    }
}

/// Fixed-size set of marker agents
///
/// Agents are created once; there is no way to add or remove them later.
pub struct AgentSwarm {
    agents: Vec<SwarmAgent>,
}

impl AgentSwarm {
    /// Places one sphere per frequency at `anchor + (u, -2, v)`, with `u` and
    /// `v` drawn uniformly from `[-1, 1)`
    pub fn new<R: Rng + ?Sized>(anchor: Vector3<f32>, color: Rgb, rng: &mut R) -> Self {
        let geometry = generate_sphere(SPHERE_RADIUS, SPHERE_SEGMENTS, SPHERE_SEGMENTS);

        let agents = SWARM_FREQUENCIES
            .iter()
            .enumerate()
            .map(|(index, &frequency)| {
                let base_position = anchor
                    + Vector3::new(
                        rng.random::<f32>() * 2.0 - 1.0,
                        -2.0,
                        rng.random::<f32>() * 2.0 - 1.0,
                    );

                let mut object = Object::new(
                    format!("marker_{index}"),
                    vec![Mesh::from_geometry(&geometry)],
                    Material::basic(color),
                );
                object.transform = Transform::from_position(base_position);

                SwarmAgent {
                    base_position,
                    frequency,
                    object,
                    hovered: false,
                }
            })
            .collect();

        Self { agents }
    }

    /// Moves every agent to its vertical offset at `elapsed`; x and z stay at the base
    pub fn update(&mut self, elapsed: f32) {
        for agent in &mut self.agents {
            let y = agent.offset_at(elapsed);
            let position = &mut agent.object.transform.position;
            position.x = agent.base_position.x;
            position.y = y;
            position.z = agent.base_position.z;
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[SwarmAgent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [SwarmAgent] {
        &mut self.agents
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.agents.iter().map(|agent| &agent.object)
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.agents.iter_mut().map(|agent| &mut agent.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use std::f32::consts::TAU;

    fn swarm() -> AgentSwarm {
        AgentSwarm::new(
            Vector3::new(2.0, -6.0, 0.0),
            Rgb::WHITE,
            &mut StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn test_agents_surround_anchor() {
        let swarm = swarm();
        assert_eq!(swarm.len(), SWARM_FREQUENCIES.len());

        for (agent, &frequency) in swarm.agents().iter().zip(&SWARM_FREQUENCIES) {
            let base = agent.base_position();
            assert!((1.0..3.0).contains(&base.x));
            assert_eq!(base.y, -8.0);
            assert!((-1.0..1.0).contains(&base.z));
            assert_eq!(agent.frequency(), frequency);
        }
    }

    #[test]
    fn test_offset_is_periodic() {
        let swarm = swarm();
        for agent in swarm.agents() {
            let period = TAU / agent.frequency();
            for t in [0.0, 0.7, 3.2, 11.0] {
                assert_relative_eq!(agent.offset_at(t), agent.offset_at(t + period), epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_update_only_moves_vertically() {
        let mut swarm = swarm();
        swarm.update(1.3);

        for agent in swarm.agents() {
            let position = agent.object.transform.position;
            let base = agent.base_position();
            assert_eq!(position.x, base.x);
            assert_eq!(position.z, base.z);
            assert_relative_eq!(position.y, agent.offset_at(1.3));
            assert!((position.y - base.y).abs() <= SWARM_AMPLITUDE + 1e-5);
        }
        assert_eq!(swarm.len(), 5);
    }
}
