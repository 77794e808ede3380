//! Default training-ground layout.
//!
//! Buildings sit on every cell whose coordinates are both even within
//! `[-5, 5)`, which leaves a lattice of one-cell alleys between them.

use tracing::debug;

use crate::error::WorldError;
use crate::grid::ObstacleGrid;

/// Lower (inclusive) bound of the building lattice on both axes.
const LAYOUT_MIN: i32 = -5;

/// Upper (exclusive) bound of the building lattice on both axes.
const LAYOUT_MAX: i32 = 5;

/// Place the default building lattice on `grid`.
///
/// Returns the number of obstacles added.
///
/// # Errors
///
/// Returns [`WorldError::OutOfBounds`] if the grid is too small to hold
/// the lattice.
pub fn seed_default_buildings(grid: &mut ObstacleGrid) -> Result<usize, WorldError> {
    let mut added: usize = 0;
    for x in LAYOUT_MIN..LAYOUT_MAX {
        for y in LAYOUT_MIN..LAYOUT_MAX {
            if x % 2 == 0 && y % 2 == 0 {
                grid.add_obstacle(f64::from(x), f64::from(y))?;
                added = added.saturating_add(1);
            }
        }
    }
    debug!(added, "default building lattice seeded");
    Ok(added)
}

/// Place additional obstacles from a list of real-valued points.
///
/// # Errors
///
/// Returns the first [`WorldError`] raised by
/// [`ObstacleGrid::add_obstacle`].
pub fn seed_points(grid: &mut ObstacleGrid, points: &[(f64, f64)]) -> Result<usize, WorldError> {
    for &(x, y) in points {
        grid.add_obstacle(x, y)?;
    }
    Ok(points.len())
}
