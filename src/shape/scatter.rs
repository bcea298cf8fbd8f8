//! Uniform scatter field.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Point, PointCloud};

/// Points scattered uniformly in a box centered on the origin.
#[derive(Debug, Clone, Copy)]
pub struct ScatterCloud {
    count: usize,
    extent: [f32; 3],
    seed: u64,
}

impl ScatterCloud {
    /// Creates a scatter field whose box has edge lengths `extent`.
    #[must_use]
    pub const fn new(count: usize, extent: [f32; 3], seed: u64) -> Self {
        Self {
            count,
            extent,
            seed,
        }
    }
}

impl PointCloud for ScatterCloud {
    fn points(&self) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|_| self.extent.map(|edge| (rng.random::<f32>() - 0.5) * edge))
            .collect()
    }

    fn len(&self) -> usize {
        self.count
    }

    fn name(&self) -> &'static str {
        "scatter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_stay_inside_the_box() {
        let cloud = ScatterCloud::new(1000, [15.0, 15.0, 10.0], 3);
        for [x, y, z] in cloud.points() {
            assert!(x.abs() <= 7.5);
            assert!(y.abs() <= 7.5);
            assert!(z.abs() <= 5.0);
        }
    }

    #[test]
    fn seeded_output_is_stable() {
        let a = ScatterCloud::new(20, [1.0; 3], 11).points();
        let b = ScatterCloud::new(20, [1.0; 3], 11).points();
        assert_eq!(a, b);
    }
}
