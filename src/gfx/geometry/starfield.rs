//! Background starfield: white points scattered uniformly through a cube.

use rand::Rng;

use crate::galaxy::GalaxyBuffers;

/// Scatters `count` white points uniformly in `(-extent / 2, extent / 2)` on every axis
pub fn generate_starfield<R: Rng + ?Sized>(count: usize, extent: f32, rng: &mut R) -> GalaxyBuffers {
    let mut buffers = GalaxyBuffers::with_capacity(count);

    for _ in 0..count {
        for _ in 0..3 {
            buffers.positions.push((rng.random::<f32>() - 0.5) * extent);
            buffers.colors.push(1.0);
        }
    }

    buffers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_starfield_fills_cube() {
        let mut rng = StdRng::seed_from_u64(7);
        let stars = generate_starfield(10_000, 1000.0, &mut rng);

        assert_eq!(stars.len(), 10_000);
        assert!(stars.positions.iter().all(|c| c.abs() <= 500.0));
        assert!(stars.colors.iter().all(|&c| c == 1.0));
    }

    #[test]
    fn test_empty_starfield() {
        let stars = generate_starfield(0, 1000.0, &mut rand::rng());
        assert!(stars.is_empty());
    }
}
