//! Seeded 2-D gradient noise.
//!
//! Classic permutation-table Perlin noise summed over a few octaves and
//! remapped to [0, 1], so `TAU * noise(x, y)` gives a smoothly varying angle
//! across the canvas. The permutation is drawn from the injected RNG, which
//! keeps particle motion reproducible for a given seed.

use rand::seq::SliceRandom;
use rand::Rng;

const OCTAVES: usize = 4;
const FALLOFF: f32 = 0.5;

const GRADIENTS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2),
    (-std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2),
    (std::f32::consts::FRAC_1_SQRT_2, -std::f32::consts::FRAC_1_SQRT_2),
    (-std::f32::consts::FRAC_1_SQRT_2, -std::f32::consts::FRAC_1_SQRT_2),
];

#[derive(Debug, Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl NoiseField {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    #[inline]
    fn hash(&self, xi: usize, yi: usize) -> usize {
        self.perm[self.perm[xi & 255] as usize + (yi & 255)] as usize
    }

    #[inline]
    fn corner(&self, xi: usize, yi: usize, dx: f32, dy: f32) -> f32 {
        let (gx, gy) = GRADIENTS[self.hash(xi, yi) & 7];
        gx * dx + gy * dy
    }

    /// Single octave, roughly in [-1, 1].
    fn octave(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        // wrapping into the 256-periodic lattice
        let xi = (x0 as i64).rem_euclid(256) as usize;
        let yi = (y0 as i64).rem_euclid(256) as usize;

        let n00 = self.corner(xi, yi, fx, fy);
        let n10 = self.corner(xi + 1, yi, fx - 1.0, fy);
        let n01 = self.corner(xi, yi + 1, fx, fy - 1.0);
        let n11 = self.corner(xi + 1, yi + 1, fx - 1.0, fy - 1.0);

        let u = fade(fx);
        let v = fade(fy);
        lerp(lerp(n00, n10, u), lerp(n01, n11, u), v) * std::f32::consts::SQRT_2
    }

    /// Fractal noise in [0, 1].
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut norm = 0.0;
        let mut frequency = 1.0;

        for _ in 0..OCTAVES {
            total += self.octave(x * frequency, y * frequency) * amplitude;
            norm += amplitude;
            amplitude *= FALLOFF;
            frequency *= 2.0;
        }

        ((total / norm) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
