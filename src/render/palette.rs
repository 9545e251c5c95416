//! Colors per mode.
//!
//! The core decides colors; the sink only paints them.

use serde::{Deserialize, Serialize};

use crate::field::{Bounds, Particle};
use crate::modes::{ActiveMode, ColorScheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

const SHOOTING_STAR: Rgba = Rgba::rgb(0, 255, 0);
const KICK: Rgba = Rgba::rgb(255, 0, 0);
const FREQUENCY: Rgba = Rgba::rgb(255, 20, 147);
const WATER_INK: Rgba = Rgba::rgba(50, 50, 255, 150);
const ORGANIC_CENTER: Rgba = Rgba::rgb(0, 100, 255);
const ORGANIC_EDGE: Rgba = Rgba::rgb(255, 0, 150);
pub const METALLIC_BLOB: Rgba = Rgba::rgba(0, 255, 150, 100);

pub fn background(scheme: ColorScheme) -> Rgba {
    match scheme {
        ColorScheme::Dark => BLACK,
        ColorScheme::Light => WHITE,
    }
}

pub fn text(scheme: ColorScheme) -> Rgba {
    match scheme {
        ColorScheme::Dark => WHITE,
        ColorScheme::Light => BLACK,
    }
}

/// How one particle and its trail should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleStyle {
    pub fill: Rgba,
    pub trail: Rgba,
    pub trail_weight: f32,
    /// Drawn diameter = particle size * this
    pub diameter_scale: f32,
}

pub fn particle_style(
    mode: ActiveMode,
    scheme: ColorScheme,
    particle: &Particle,
    bounds: &Bounds,
) -> ParticleStyle {
    let plain = |fill: Rgba, trail_alpha: u8| ParticleStyle {
        fill,
        trail: Rgba { a: trail_alpha, ..fill },
        trail_weight: 1.0,
        diameter_scale: 1.0,
    };

    match mode {
        ActiveMode::ShootingStar => plain(SHOOTING_STAR, 150),
        ActiveMode::Kick => ParticleStyle {
            trail_weight: 3.0,
            ..plain(KICK, 200)
        },
        ActiveMode::FrequencyHigh => plain(FREQUENCY, 150),
        ActiveMode::WaterInk => ParticleStyle {
            diameter_scale: 2.0,
            ..plain(WATER_INK, 100)
        },
        ActiveMode::Metallic => ParticleStyle {
            trail: Rgba::rgba(255, 255, 255, 100),
            ..plain(text(scheme), 100)
        },
        ActiveMode::Organic => {
            let center = bounds.center();
            let half_width = (bounds.width / 2.0).max(f32::EPSILON);
            let d = ((particle.x - center.x).powi(2) + (particle.y - center.y).powi(2)).sqrt()
                / half_width;
            plain(ORGANIC_CENTER.lerp(ORGANIC_EDGE, d), 100)
        }
    }
}
