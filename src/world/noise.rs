use noise::{NoiseFn, Perlin};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Starting frequency of the first octave in [`fractal`].
pub const BASE_FREQUENCY: f64 = 0.05;

/// Width of the phase interval a seed is hashed into.
const PHASE_SPAN: f64 = std::f64::consts::TAU * 1024.0;

/// A deterministic 2D scalar field with values in `[0, 1]`.
pub trait NoiseSource: Send + Sync {
    fn sample(&self, x: f64, y: f64, seed: u64, frequency: f64) -> f64;
}

/// Which noise backend a generator uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    #[default]
    Sine,
    Perlin,
}

impl NoiseKind {
    pub fn build(self) -> Box<dyn NoiseSource> {
        match self {
            NoiseKind::Sine => Box::new(SineNoise),
            NoiseKind::Perlin => Box::new(PerlinNoise::new()),
        }
    }
}

/// Phase offset for `seed`, hashed from all 64 bits so no two seeds alias
/// by simple arithmetic.
fn seed_phase(seed: u64) -> f64 {
    ChaCha8Rng::seed_from_u64(seed).r#gen::<f64>() * PHASE_SPAN
}

/// Sum of sine/cosine products. Smooth everywhere, cheap, and periodic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SineNoise;

impl NoiseSource for SineNoise {
    fn sample(&self, x: f64, y: f64, seed: u64, frequency: f64) -> f64 {
        let s = seed_phase(seed);
        let value = (x * frequency + s).sin() * (y * frequency + s).cos()
            + (x * frequency * 2.0 + s * 1.5).sin() * 0.5
            + (y * frequency * 2.0 + s * 2.0).cos() * 0.5;
        // value lies in [-2, 2]
        ((value + 2.0) / 4.0).clamp(0.0, 1.0)
    }
}

/// Gradient noise from the `noise` crate. The seed selects a slice along the
/// third axis, so one permutation table serves every seed.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(0),
        }
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSource for PerlinNoise {
    fn sample(&self, x: f64, y: f64, seed: u64, frequency: f64) -> f64 {
        let z = seed_phase(seed) * 0.618_033_988_75 + 0.5;
        let v = self.perlin.get([x * frequency, y * frequency, z]);
        ((v + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Multi-octave noise: each octave halves amplitude, doubles frequency, and
/// offsets the seed by its index. Normalized by total amplitude.
pub fn fractal(noise: &dyn NoiseSource, x: f64, y: f64, seed: u64, octaves: u32) -> f64 {
    if octaves == 0 {
        return 0.0;
    }
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = BASE_FREQUENCY;
    let mut max_value = 0.0;

    for i in 0..octaves {
        value += noise.sample(x, y, seed.wrapping_add(i as u64), frequency) * amplitude;
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    value / max_value
}
