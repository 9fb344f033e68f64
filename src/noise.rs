//! Deterministic gradient noise over 3D space.
//!
//! [`NoiseField`] wraps a seeded Perlin generator and adds fractal (fBm)
//! summation. Results are normalized by the total amplitude so the output stays
//! in `[-1, 1]` whatever the octave count.
//!
//! # Example
//!
//! ```ignore
//! use wavesphere::noise::{FractalParams, NoiseField};
//!
//! let field = NoiseField::new(7);
//! let n = field.noise(Vec3::new(0.3, 1.2, -0.4));
//! let f = field.fractal_noise(Vec3::ONE, FractalParams::default());
//! ```

use glam::Vec3;
use ::noise::{NoiseFn, Perlin};

/// Octave settings for [`NoiseField::fractal_noise`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    /// Number of layers to sum. `0` yields a flat field.
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    pub gain: f32,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

impl FractalParams {
    /// Same defaults with a different octave count.
    pub fn with_octaves(octaves: u32) -> Self {
        Self {
            octaves,
            ..Self::default()
        }
    }
}

/// Pure, seeded scalar noise field.
///
/// Holds no mutable state: the same point always yields the same value.
#[derive(Clone)]
pub struct NoiseField {
    seed: u32,
    perlin: Perlin,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl NoiseField {
    /// Create a noise field for the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            perlin: Perlin::new(seed),
        }
    }

    /// Seed this field was built with.
    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Single-octave gradient noise in `[-1, 1]`.
    pub fn noise(&self, p: Vec3) -> f32 {
        let value = self.perlin.get([p.x as f64, p.y as f64, p.z as f64]) as f32;
        value.clamp(-1.0, 1.0)
    }

    /// Fractal sum of `params.octaves` layers, normalized by the amplitude sum.
    pub fn fractal_noise(&self, p: Vec3, params: FractalParams) -> f32 {
        if params.octaves == 0 {
            return 0.0;
        }

        let mut value = 0.0f32;
        let mut amplitude = 1.0f32;
        let mut frequency = 1.0f32;
        let mut amplitude_sum = 0.0f32;

        for _ in 0..params.octaves {
            value += self.noise(p * frequency) * amplitude;
            amplitude_sum += amplitude;
            amplitude *= params.gain;
            frequency *= params.lacunarity;
        }

        if amplitude_sum <= f32::EPSILON {
            return 0.0;
        }
        (value / amplitude_sum).clamp(-1.0, 1.0)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}
