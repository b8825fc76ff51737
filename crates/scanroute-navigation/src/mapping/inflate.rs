//! Safety-margin inflation around occupied cells.

use tracing::{debug, warn};

use crate::error::NavigationError;
use crate::map::{GridPoint, OccupancyGrid};

/// Radius in cells covering `distance` meters along an axis with `cell_size`.
fn radius_cells(distance: f32, cell_size: f32) -> usize {
    if cell_size > 0.0 {
        (distance / cell_size).ceil() as usize
    } else {
        0
    }
}

/// Inflates obstacles in the grid by `safety_distance` meters.
///
/// For every occupied cell, free cells up to the per-axis radius along its
/// row and along its column become occupied. Diagonal cells are not touched,
/// so the margin is a cross rather than a disk. Only cells occupied before
/// the pass spread; newly inflated cells do not.
///
/// # Returns
/// * `Result<usize, NavigationError>` - Number of cells newly marked occupied
pub fn inflate_obstacles(
    grid: &mut OccupancyGrid,
    safety_distance: f32,
) -> Result<usize, NavigationError> {
    if !(safety_distance.is_finite() && safety_distance >= 0.0) {
        return Err(NavigationError::InvalidParameter(
            "safety distance must be a non-negative number",
        ));
    }

    let geometry = *grid.geometry();
    if geometry.is_degenerate() && safety_distance > 0.0 {
        warn!("Grid has zero-sized cells, skipping obstacle inflation");
        return Ok(0);
    }
    let (width, height) = (grid.width(), grid.height());
    // A radius past the grid edge marks the same cells as one reaching it.
    let rx = radius_cells(safety_distance, geometry.cell_size_x).min(width);
    let rz = radius_cells(safety_distance, geometry.cell_size_z).min(height);

    let snapshot = grid.occupancy_snapshot();
    let mut to_mark: Vec<GridPoint> = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !snapshot[y * width + x] {
                continue;
            }
            let row = x.saturating_sub(rx)..=x.saturating_add(rx).min(width - 1);
            let column = y.saturating_sub(rz)..=y.saturating_add(rz).min(height - 1);
            to_mark.extend(
                row.filter(|&nx| !snapshot[y * width + nx])
                    .map(|nx| GridPoint::new(nx, y)),
            );
            to_mark.extend(
                column
                    .filter(|&ny| !snapshot[ny * width + x])
                    .map(|ny| GridPoint::new(x, ny)),
            );
        }
    }

    let mut added = 0;
    for p in to_mark {
        if !grid.is_occupied(p)? {
            grid.set_occupied(p, true)?;
            added += 1;
        }
    }

    debug!(
        safety_distance,
        radius_x = rx,
        radius_z = rz,
        added,
        "Inflated obstacles"
    );
    Ok(added)
}
