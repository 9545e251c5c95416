// Field module - fixed pool of independently animated particles
//
// Kinematics per active mode:
// - ShootingStar: dx = dir_x * speed * 2,   dy = dir_y * speed * 0.5
// - Kick:         dx = dir_x * speed * 1.1, dy = dir_y * speed * 2
// - WaterInk:     angle = TAU * noise; dx = cos * speed * 0.5, dy = sin * speed * 0.5
// - otherwise:    angle = TAU * noise; dx = cos * dir_x * speed, dy = sin * dir_y * speed
//
// After each move the new position is appended to the trail. A particle
// found outside the canvas (before or after moving) respawns at a random
// in-bounds position with both directions reversed and an empty trail.
// Particles never interact.

mod noise;
mod particle;

pub use noise::NoiseField;
pub use particle::{Bounds, Particle, Point, TRAIL_LENGTH};

use std::f32::consts::TAU;

use rand::Rng;

use crate::config::FieldConfig;
use crate::modes::ActiveMode;

pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: Bounds,
    noise: NoiseField,
    noise_scale: f32,
    noise_scale_range: [f32; 2],
}

impl ParticleField {
    /// Build `config.particle_count` particles with randomized position,
    /// size, speed and direction.
    pub fn new<R: Rng + ?Sized>(config: &FieldConfig, rng: &mut R) -> Self {
        let bounds = Bounds::new(config.width, config.height);
        let noise = NoiseField::new(rng);

        let particles = (0..config.particle_count)
            .map(|_| {
                let p = bounds.random_point(rng);
                Particle::with_trail_capacity(
                    p.x,
                    p.y,
                    rng.gen_range(config.size_range[0]..config.size_range[1]),
                    rng.gen_range(config.speed_range[0]..config.speed_range[1]),
                    random_direction(rng),
                    random_direction(rng),
                    config.trail_length,
                )
            })
            .collect();

        Self {
            particles,
            bounds,
            noise,
            noise_scale: config.noise_scale,
            noise_scale_range: config.noise_scale_range,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    /// Pick a fresh noise scale so the drift pattern visibly changes.
    pub fn reroll_noise_scale<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let [lo, hi] = self.noise_scale_range;
        self.noise_scale = if hi > lo { rng.gen_range(lo..hi) } else { lo };
    }

    /// Advance every particle by one animation frame.
    pub fn advance<R: Rng + ?Sized>(&mut self, mode: ActiveMode, rng: &mut R) {
        let bounds = self.bounds;
        for index in 0..self.particles.len() {
            if !bounds.contains(self.particles[index].x, self.particles[index].y) {
                self.particles[index].respawn(&bounds, rng);
                continue;
            }

            let (dx, dy) = self.velocity(&self.particles[index], mode);
            let p = &mut self.particles[index];
            p.x += dx;
            p.y += dy;
            p.record_trail();

            if !bounds.contains(p.x, p.y) {
                p.respawn(&bounds, rng);
            }
        }
    }

    fn drift_angle(&self, p: &Particle) -> f32 {
        TAU * self
            .noise
            .sample(p.x * self.noise_scale, p.y * self.noise_scale)
    }

    fn velocity(&self, p: &Particle, mode: ActiveMode) -> (f32, f32) {
        match mode {
            ActiveMode::ShootingStar => (p.dir_x * p.speed * 2.0, p.dir_y * p.speed * 0.5),
            ActiveMode::Kick => (p.dir_x * p.speed * 1.1, p.dir_y * p.speed * 2.0),
            ActiveMode::WaterInk => {
                let angle = self.drift_angle(p);
                (angle.cos() * p.speed * 0.5, angle.sin() * p.speed * 0.5)
            }
            ActiveMode::FrequencyHigh | ActiveMode::Metallic | ActiveMode::Organic => {
                let angle = self.drift_angle(p);
                (
                    angle.cos() * p.dir_x * p.speed,
                    angle.sin() * p.dir_y * p.speed,
                )
            }
        }
    }
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}
