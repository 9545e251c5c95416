// Render module - the boundary between the core and whatever paints pixels
//
// Each animation frame the driver builds a FrameSnapshot (read-only view of
// mode flags, colors, particles and metallic blobs) and hands it to a
// RenderSink. Drawing itself lives outside this crate.

mod blobs;
mod palette;
mod sinks;

pub use blobs::{metallic_blobs, Blob, BLOB_COUNT};
pub use palette::{background, particle_style, text, ParticleStyle, Rgba};
pub use sinks::{JsonLinesSink, LogSink};

use std::io;

use serde::{Deserialize, Serialize};

use crate::field::{Bounds, Particle, Point};
use crate::modes::{ActiveMode, ColorScheme, ModeState};

/// Consumer of per-frame state.
pub trait RenderSink {
    fn render(&mut self, frame: &FrameSnapshot<'_>);

    /// Flush buffered output once the run is over.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl RenderSink for Vec<Box<dyn RenderSink>> {
    fn render(&mut self, frame: &FrameSnapshot<'_>) {
        for sink in self.iter_mut() {
            sink.render(frame);
        }
    }

    /// Finishes every sink, reporting the first failure.
    fn finish(&mut self) -> io::Result<()> {
        let mut first_err = None;
        for sink in self.iter_mut() {
            if let Err(err) = sink.finish() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn render(&mut self, frame: &FrameSnapshot<'_>) {
        (**self).render(frame);
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// Everything a sink needs to draw one frame.
#[derive(Debug)]
pub struct FrameSnapshot<'a> {
    pub frame: u64,
    pub mode: ActiveMode,
    pub flags: ModeState,
    pub scheme: ColorScheme,
    pub bounds: Bounds,
    pub particles: &'a [Particle],
    /// Non-empty only while metallic is the active mode
    pub blobs: Vec<Blob>,
}

impl FrameSnapshot<'_> {
    pub fn background(&self) -> Rgba {
        background(self.scheme)
    }

    pub fn text_color(&self) -> Rgba {
        text(self.scheme)
    }

    pub fn style_for(&self, particle: &Particle) -> ParticleStyle {
        particle_style(self.mode, self.scheme, particle, &self.bounds)
    }

    pub fn summary(&self) -> FrameSummary {
        let count = self.particles.len();
        let (sum_x, sum_y, trail_total) =
            self.particles
                .iter()
                .fold((0.0_f32, 0.0_f32, 0usize), |(sx, sy, tl), p| {
                    (sx + p.x, sy + p.y, tl + p.trail_len())
                });
        let (centroid, mean_trail_len) = if count == 0 {
            (None, 0.0)
        } else {
            let n = count as f32;
            (
                Some(Point {
                    x: sum_x / n,
                    y: sum_y / n,
                }),
                trail_total as f32 / n,
            )
        };

        FrameSummary {
            frame: self.frame,
            mode: self.mode,
            flags: self.flags,
            scheme: self.scheme,
            background: self.background(),
            particle_count: count,
            centroid,
            mean_trail_len,
            blob_count: self.blobs.len(),
        }
    }
}

/// Serializable digest of a frame for logs and JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub frame: u64,
    pub mode: ActiveMode,
    pub flags: ModeState,
    pub scheme: ColorScheme,
    pub background: Rgba,
    pub particle_count: usize,
    pub centroid: Option<Point>,
    pub mean_trail_len: f32,
    pub blob_count: usize,
}
