//! # Procedural Galaxy Generator
//!
//! Maps a [`GalaxyParameters`] set to flat position and color buffers for a
//! spiral point cloud. Each particle sits on one of `branches` arms at a random
//! distance from the centre, twisted by `spin` radians per unit of radius, with
//! a small vertical jitter. Colors fade from `inside_color` at the core to
//! `outside_color` at the rim.
//!
//! ## Usage
//!
//! ```no_run
//! use galaxy_scene::galaxy::{generate, GalaxyParameters};
//!
//! let params = GalaxyParameters::default();
//! let buffers = generate(&params, &mut rand::rng());
//! assert_eq!(buffers.len(), params.count);
//! ```

use std::f32::consts::TAU;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An RGB color with channels in `[0, 1]`
///
/// Serialized as a `#rrggbb` hex string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Failure to parse a `#rrggbb` color string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color '{0}' must start with '#'")]
    MissingHash(String),
    #[error("color '{0}' must have exactly 6 hex digits")]
    BadLength(String),
    #[error("color '{0}' contains a non-hex digit")]
    BadDigit(String),
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` string
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(hex.to_string()))?;
        if digits.len() != 6 {
            return Err(ColorParseError::BadLength(hex.to_string()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(hex.to_string()));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorParseError::BadDigit(hex.to_string()))?;

        Ok(Self::new(
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        ))
    }

    /// Formats as a lowercase `#rrggbb` string
    pub fn to_hex(&self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`
    pub fn lerp(&self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| (a * (1.0 - t) + b * t).clamp(0.0, 1.0);
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parameters controlling galaxy generation
///
/// Any change to these triggers a full regeneration of the point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyParameters {
    /// Number of particles
    pub count: usize,
    /// Rendered point diameter in world units
    pub size: f32,
    /// Maximum distance of a particle from the centre
    pub radius: f32,
    /// Number of spiral arms
    pub branches: usize,
    /// Twist in radians per unit of radius
    pub spin: f32,
    /// Full span of the vertical jitter
    pub randomness: f32,
    /// Exponent for jitter shaping. Kept for configuration compatibility;
    /// the generator draws plain uniform jitter and does not read it.
    pub randomness_power: f32,
    pub inside_color: Rgb,
    pub outside_color: Rgb,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: 1000,
            size: 0.05,
            radius: 3.0,
            branches: 3,
            spin: 2.0,
            randomness: 0.3,
            randomness_power: 2.0,
            inside_color: Rgb::new(1.0, 234.0 / 255.0, 0.0),
            outside_color: Rgb::new(190.0 / 255.0, 10.0 / 255.0, 1.0),
        }
    }
}

impl GalaxyParameters {
    /// Returns a copy with out-of-domain values pulled back into range
    ///
    /// `branches` becomes at least 1, `radius` and `size` strictly positive,
    /// `randomness` and `randomness_power` non-negative/positive. Any
    /// non-finite value, `spin` included, is replaced as well.
    pub fn sanitized(&self) -> Self {
        let mut params = self.clone();
        params.branches = params.branches.max(1);
        if !(params.radius > 0.0 && params.radius.is_finite()) {
            params.radius = f32::EPSILON;
        }
        if !(params.size > 0.0 && params.size.is_finite()) {
            params.size = f32::EPSILON;
        }
        if !params.spin.is_finite() {
            params.spin = 0.0;
        }
        if !(params.randomness >= 0.0 && params.randomness.is_finite()) {
            params.randomness = 0.0;
        }
        if !(params.randomness_power > 0.0 && params.randomness_power.is_finite()) {
            params.randomness_power = 1.0;
        }
        params
    }
}

/// Flat per-particle buffers, three floats per particle in each
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalaxyBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl GalaxyBuffers {
    pub fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count * 3),
            colors: Vec::with_capacity(count * 3),
        }
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    pub fn colors(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.colors.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }
}

/// Angle of the arm particle `index` belongs to
///
/// Depends only on `index % branches`; `branches` of zero is treated as one.
pub fn branch_angle(index: usize, branches: usize) -> f32 {
    let branches = branches.max(1);
    (index % branches) as f32 / branches as f32 * TAU
}

/// Generates a galaxy point cloud
///
/// Parameters are sanitized first, so a zero branch count cannot divide by
/// zero. `count == 0` yields empty buffers.
pub fn generate<R: Rng + ?Sized>(params: &GalaxyParameters, rng: &mut R) -> GalaxyBuffers {
    let params = params.sanitized();
    let mut buffers = GalaxyBuffers::with_capacity(params.count);

    for i in 0..params.count {
        let radius = rng.random::<f32>() * params.radius;
        let spin_angle = radius * params.spin;
        let angle = branch_angle(i, params.branches) + spin_angle;

        let x = angle.cos() * radius;
        let y = rng.random::<f32>() * params.randomness - params.randomness / 2.0;
        let z = angle.sin() * radius;
        buffers.positions.extend_from_slice(&[x, y, z]);

        let color = params
            .inside_color
            .lerp(params.outside_color, radius / params.radius);
        buffers.colors.extend_from_slice(&color.to_array());
    }

    buffers
}
