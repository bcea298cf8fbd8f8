//! Heart curve cloud.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Point, PointCloud};

/// Total depth of the random z jitter.
const DEPTH: f32 = 0.15;

/// Points along the classic heart curve
/// `x = 16 sin³t`, `y = 13 cos t − 5 cos 2t − 2 cos 3t − cos 4t`.
///
/// The curve lies in the xy plane; z gets a small jitter from a seeded RNG,
/// so the same seed always yields the same cloud.
#[derive(Debug, Clone, Copy)]
pub struct HeartCloud {
    count: usize,
    scale: f32,
    seed: u64,
}

impl HeartCloud {
    /// Creates a heart cloud.
    #[must_use]
    pub const fn new(count: usize, scale: f32, seed: u64) -> Self {
        Self { count, scale, seed }
    }
}

impl PointCloud for HeartCloud {
    #[allow(clippy::cast_precision_loss)]
    fn points(&self) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.count as f32;
        (0..self.count)
            .map(|i| {
                let t = i as f32 / n * TAU;
                let x = 16.0 * t.sin().powi(3);
                let y = 13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos();
                let z = (rng.random::<f32>() - 0.5) * DEPTH;
                [x * self.scale, y * self.scale, z]
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.count
    }

    fn name(&self) -> &'static str {
        "heart"
    }
}
