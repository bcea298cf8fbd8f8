//! Sphere surface cloud.

use std::f32::consts::PI;

use super::{Point, PointCloud};

/// Points spread over a sphere surface along a spiral.
///
/// Point `i` sits at polar angle `acos(-1 + 2i/n)` and azimuth
/// `sqrt(n·π)` times that angle, which walks a spiral from pole to pole
/// with roughly even spacing. Deterministic.
#[derive(Debug, Clone, Copy)]
pub struct SphereCloud {
    count: usize,
    radius: f32,
}

impl SphereCloud {
    /// Creates a sphere cloud.
    #[must_use]
    pub const fn new(count: usize, radius: f32) -> Self {
        Self { count, radius }
    }
}

impl PointCloud for SphereCloud {
    #[allow(clippy::cast_precision_loss)]
    fn points(&self) -> Vec<Point> {
        let n = self.count as f32;
        let winding = (n * PI).sqrt();
        (0..self.count)
            .map(|i| {
                let phi = (-1.0 + 2.0 * i as f32 / n).acos();
                let theta = winding * phi;
                [
                    self.radius * theta.cos() * phi.sin(),
                    self.radius * theta.sin() * phi.sin(),
                    self.radius * phi.cos(),
                ]
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.count
    }

    fn name(&self) -> &'static str {
        "sphere"
    }
}
