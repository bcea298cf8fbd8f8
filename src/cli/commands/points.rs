//! `points`: print a particle point cloud.

use crate::cli::args::PointsArgs;
use crate::error::KeepsakeError;
use crate::shape::{ShapeLimits, create_cloud, flatten};

/// Generates the requested cloud and prints it as JSON.
///
/// # Errors
///
/// Returns a shape error for an oversized count or an invalid size.
pub fn run(args: &PointsArgs) -> Result<(), KeepsakeError> {
    let cloud = create_cloud(
        args.shape.into(),
        args.count,
        args.size,
        args.seed,
        &ShapeLimits::default(),
    )?;
    let points = cloud.points();

    let json = if args.flat {
        serde_json::to_string(&flatten(&points))?
    } else {
        serde_json::to_string(&points)?
    };
    println!("{json}");
    Ok(())
}
