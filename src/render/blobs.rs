//! Metallic liquid blobs.
//!
//! Ten translucent ellipses wander around the canvas center, driven by the
//! field's noise, while their radii breathe with the frame counter.

use serde::{Deserialize, Serialize};

use super::palette::{Rgba, METALLIC_BLOB};
use crate::field::{Bounds, NoiseField};

pub const BLOB_COUNT: usize = 10;

const WANDER_PX: f32 = 200.0;
const NOISE_STEP: f32 = 0.01;
const BREATH_STEP: f32 = 0.05;
// off-lattice row so the 1-D walk never sits on a zero of the noise
const NOISE_ROW: f32 = 0.37;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Rgba,
}

pub fn metallic_blobs(frame: u64, bounds: &Bounds, noise: &NoiseField) -> Vec<Blob> {
    let t = frame as f32 * NOISE_STEP;
    let phase = frame as f32 * BREATH_STEP;
    let center = bounds.center();
    let width = 300.0 + phase.sin() * 50.0;
    let height = 200.0 + phase.cos() * 50.0;

    (0..BLOB_COUNT)
        .map(|i| {
            let i = i as f32;
            Blob {
                x: center.x + noise.sample(t + i, NOISE_ROW) * WANDER_PX,
                y: center.y + noise.sample(t + i + 10.0, NOISE_ROW) * WANDER_PX,
                width,
                height,
                fill: METALLIC_BLOB,
            }
        })
        .collect()
}
