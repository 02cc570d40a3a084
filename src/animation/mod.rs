//! # Animation
//!
//! Time-driven motion for the scene: the frame clock and its ordered
//! [`tick`], looped clip playback for the skeletal model, and the oscillating
//! marker swarm.

pub mod clock;
pub mod player;
pub mod swarm;

pub use clock::{camera_offset_for_scroll, tick, AnimationClock, FrameTime};
pub use player::{AnimationClip, AnimationPlayer};
pub use swarm::{AgentSwarm, SwarmAgent};
