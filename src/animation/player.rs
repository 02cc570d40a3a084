use log::debug;

/// A named animation clip as far as playback timing is concerned
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Clip length in seconds
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Plays one clip on a loop for the object it is bound to
///
/// Keeps the playhead only; sampling joint transforms from it is up to the
/// consumer.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: AnimationClip,
    target: String,
    time: f32,
    loops: u32,
}

impl AnimationPlayer {
    pub fn new(clip: AnimationClip, target: impl Into<String>) -> Self {
        let target = target.into();
        debug!("Playing clip '{}' on '{}'", clip.name, target);
        Self {
            clip,
            target,
            time: 0.0,
            loops: 0,
        }
    }

    /// Advances the playhead, wrapping at the clip's end
    pub fn update(&mut self, delta: f32) {
        if !(self.clip.duration > 0.0) {
            self.time = 0.0;
            return;
        }

        let time = self.time + delta.max(0.0);
        self.loops += (time / self.clip.duration) as u32;
        self.time = time.rem_euclid(self.clip.duration);
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    /// Name of the object this player drives
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Playhead position in `[0, duration)`
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of times playback wrapped around
    pub fn loops(&self) -> u32 {
        self.loops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_playback_loops() {
        let mut player = AnimationPlayer::new(AnimationClip::new("Run", 0.5), "fox");

        player.update(0.3);
        assert_relative_eq!(player.time(), 0.3);
        assert_eq!(player.loops(), 0);

        player.update(0.3);
        assert_relative_eq!(player.time(), 0.1, epsilon = 1e-6);
        assert_eq!(player.loops(), 1);
    }

    #[test]
    fn test_zero_length_clip_stays_at_start() {
        let mut player = AnimationPlayer::new(AnimationClip::new("Pose", 0.0), "fox");
        player.update(1.0);
        assert_eq!(player.time(), 0.0);
        assert_eq!(player.target(), "fox");
    }
}
