//! Bounded obstacle grid.
//!
//! The grid spans `[-half_extent, half_extent]` on both axes. Obstacles
//! are registered by rounding real-valued coordinates to the nearest
//! cell (ties to even). There is no removal: once the grid is handed to
//! a [`Pathfinder`](crate::Pathfinder) it is frozen behind an `Arc` and
//! read concurrently by every path query.

use std::collections::HashSet;

use aftershock_types::GridCoordinate;

use crate::error::WorldError;

/// Default half-extent of the training ground.
pub const DEFAULT_HALF_EXTENT: i32 = 20;

/// Round a real-valued coordinate to its grid cell index.
///
/// Halves round to the even neighbour (`0.5 -> 0`, `1.5 -> 2`). Values
/// beyond the `i32` range saturate; non-finite values map to `None`.
pub fn round_to_cell(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round_ties_even();
    #[allow(clippy::cast_possible_truncation)]
    let cell = rounded.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    Some(cell)
}

/// Round a real-valued point to a grid cell.
pub fn cell_at(x: f64, y: f64) -> Option<GridCoordinate> {
    Some(GridCoordinate::new(round_to_cell(x)?, round_to_cell(y)?))
}

/// Static set of blocked cells over a bounded square grid.
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    half_extent: i32,
    obstacles: HashSet<GridCoordinate>,
}

impl ObstacleGrid {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidExtent`] if `half_extent` is not
    /// strictly positive.
    pub fn new(half_extent: i32) -> Result<Self, WorldError> {
        if half_extent <= 0 {
            return Err(WorldError::InvalidExtent(half_extent));
        }
        Ok(Self {
            half_extent,
            obstacles: HashSet::new(),
        })
    }

    /// Block the cell nearest to `(x, y)`.
    ///
    /// Returns the cell that was blocked. Adding the same cell twice is
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NonFiniteCoordinate`] for NaN or infinite
    /// input and [`WorldError::OutOfBounds`] if the rounded cell falls
    /// outside the grid.
    pub fn add_obstacle(&mut self, x: f64, y: f64) -> Result<GridCoordinate, WorldError> {
        let cell = cell_at(x, y).ok_or(WorldError::NonFiniteCoordinate { x, y })?;
        if !self.in_bounds(cell) {
            return Err(WorldError::OutOfBounds {
                cell,
                half_extent: self.half_extent,
            });
        }
        self.obstacles.insert(cell);
        Ok(cell)
    }

    /// Whether `cell` is an obstacle.
    pub fn is_blocked(&self, cell: GridCoordinate) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Whether `cell` lies within `[-half_extent, half_extent]` on both axes.
    pub const fn in_bounds(&self, cell: GridCoordinate) -> bool {
        let h = self.half_extent;
        cell.x >= -h && cell.x <= h && cell.y >= -h && cell.y <= h
    }

    /// Whether `cell` can be stepped on.
    pub fn is_walkable(&self, cell: GridCoordinate) -> bool {
        self.in_bounds(cell) && !self.is_blocked(cell)
    }

    /// The grid's half-extent.
    pub const fn half_extent(&self) -> i32 {
        self.half_extent
    }

    /// Number of blocked cells.
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}
