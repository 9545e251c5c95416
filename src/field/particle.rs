//! Particle entity and canvas bounds.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Positions kept per particle for the trail effect.
pub const TRAIL_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Canvas rectangle `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    /// Uniform point inside the canvas.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point {
            x: rng.gen_range(0.0..=self.width),
            y: rng.gen_range(0.0..=self.height),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    /// Horizontal direction, -1.0 or 1.0
    pub dir_x: f32,
    /// Vertical direction, -1.0 or 1.0
    pub dir_y: f32,
    trail: VecDeque<Point>,
    trail_capacity: usize,
}

impl Particle {
    pub fn new(x: f32, y: f32, size: f32, speed: f32, dir_x: f32, dir_y: f32) -> Self {
        Self::with_trail_capacity(x, y, size, speed, dir_x, dir_y, TRAIL_LENGTH)
    }

    pub fn with_trail_capacity(
        x: f32,
        y: f32,
        size: f32,
        speed: f32,
        dir_x: f32,
        dir_y: f32,
        trail_capacity: usize,
    ) -> Self {
        Self {
            x,
            y,
            size,
            speed,
            dir_x,
            dir_y,
            trail: VecDeque::with_capacity(trail_capacity),
            trail_capacity,
        }
    }

    pub fn position(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    /// Past positions, oldest first.
    pub fn trail(&self) -> impl ExactSizeIterator<Item = &Point> {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Record the current position, evicting the oldest beyond capacity.
    pub(crate) fn record_trail(&mut self) {
        if self.trail_capacity == 0 {
            return;
        }
        if self.trail.len() == self.trail_capacity {
            self.trail.pop_front();
        }
        self.trail.push_back(self.position());
    }

    /// Jump to a random in-bounds position, reverse both directions and drop
    /// the trail.
    pub(crate) fn respawn<R: Rng + ?Sized>(&mut self, bounds: &Bounds, rng: &mut R) {
        let p = bounds.random_point(rng);
        self.x = p.x;
        self.y = p.y;
        self.dir_x = -self.dir_x;
        self.dir_y = -self.dir_y;
        self.trail.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bounds_are_inclusive() {
        let bounds = Bounds::new(100.0, 50.0);
        assert!(bounds.contains(0.0, 0.0));
        assert!(bounds.contains(100.0, 50.0));
        assert!(!bounds.contains(-0.1, 10.0));
        assert!(!bounds.contains(10.0, 50.1));
    }

    #[test]
    fn trail_is_capped() {
        let mut p = Particle::new(1.0, 1.0, 5.0, 1.0, 1.0, 1.0);
        for i in 0..25 {
            p.x = i as f32;
            p.record_trail();
        }
        assert_eq!(p.trail_len(), TRAIL_LENGTH);
        let xs: Vec<f32> = p.trail().map(|pt| pt.x).collect();
        assert_eq!(xs, (15..25).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn respawn_flips_direction_and_clears_trail() {
        let bounds = Bounds::new(200.0, 100.0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = Particle::new(-10.0, 500.0, 5.0, 2.0, 1.0, -1.0);
        p.record_trail();

        p.respawn(&bounds, &mut rng);

        assert!(bounds.contains(p.x, p.y));
        assert_eq!((p.dir_x, p.dir_y), (-1.0, 1.0));
        assert_eq!(p.trail_len(), 0);
    }
}
