//! Particle point clouds.
//!
//! Closed-form point sets used by the decorative particle fields. Each
//! cloud is a small factory: parameters are validated up front and points
//! are produced on demand.
//!
//! | Type | Shape |
//! |------|-------|
//! | [`SphereCloud`] | evenly spread points on a sphere surface |
//! | [`HeartCloud`] | heart curve with a thin random depth |
//! | [`ScatterCloud`] | uniform random points in a box |

mod heart;
mod scatter;
mod sphere;

pub use heart::HeartCloud;
pub use scatter::ScatterCloud;
pub use sphere::SphereCloud;

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// A single `[x, y, z]` point.
pub type Point = [f32; 3];

/// Limits applied when building clouds.
#[derive(Debug, Clone, Copy)]
pub struct ShapeLimits {
    /// Maximum number of points in one cloud.
    pub max_points: usize,
}

impl Default for ShapeLimits {
    fn default() -> Self {
        Self {
            max_points: std::env::var("KEEPSAKE_MAX_POINTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100_000),
        }
    }
}

/// Kinds of point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// [`SphereCloud`]
    Sphere,
    /// [`HeartCloud`]
    Heart,
    /// [`ScatterCloud`]
    Scatter,
}

/// A point cloud factory.
pub trait PointCloud: Send + Sync + std::fmt::Debug {
    /// Produces the points.
    fn points(&self) -> Vec<Point>;

    /// Number of points [`points`](Self::points) returns.
    fn len(&self) -> usize;

    /// Whether the cloud is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Builds a cloud of `kind`.
///
/// `size` is the radius for spheres, the scale factor for hearts and the
/// edge length of the box for scatter fields. `seed` only affects the
/// randomized shapes.
///
/// # Errors
///
/// Returns [`ShapeError::LimitExceeded`] if `count` exceeds
/// `limits.max_points`, and [`ShapeError::InvalidParameters`] if `size` is
/// not a finite positive number.
pub fn create_cloud(
    kind: ShapeKind,
    count: usize,
    size: f32,
    seed: u64,
    limits: &ShapeLimits,
) -> Result<Box<dyn PointCloud>, ShapeError> {
    check_count(count, limits)?;
    check_size(size)?;

    let cloud: Box<dyn PointCloud> = match kind {
        ShapeKind::Sphere => Box::new(SphereCloud::new(count, size)),
        ShapeKind::Heart => Box::new(HeartCloud::new(count, size, seed)),
        ShapeKind::Scatter => Box::new(ScatterCloud::new(count, [size; 3], seed)),
    };
    tracing::debug!(shape = cloud.name(), count, size, "point cloud created");
    Ok(cloud)
}

/// Interleaves points into an `x0, y0, z0, x1, ...` buffer.
#[must_use]
pub fn flatten(points: &[Point]) -> Vec<f32> {
    points.iter().flatten().copied().collect()
}

fn check_count(count: usize, limits: &ShapeLimits) -> Result<(), ShapeError> {
    if count > limits.max_points {
        return Err(ShapeError::LimitExceeded(format!(
            "count {count} exceeds max_points {}",
            limits.max_points
        )));
    }
    Ok(())
}

fn check_size(size: f32) -> Result<(), ShapeError> {
    if !size.is_finite() || size <= 0.0 {
        return Err(ShapeError::InvalidParameters(format!(
            "size must be a finite positive number, got {size}"
        )));
    }
    Ok(())
}
