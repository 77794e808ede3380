//! Error types for the `aftershock-world` crate.
//!
//! Only grid construction can fail. Path queries never return an error:
//! an unreachable goal is an empty path.

use aftershock_types::GridCoordinate;

/// Errors that can occur while building the obstacle grid.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The half-extent must be strictly positive.
    #[error("grid half-extent must be positive, got {0}")]
    InvalidExtent(i32),

    /// A real-valued coordinate was NaN or infinite.
    #[error("obstacle coordinate ({x}, {y}) is not finite")]
    NonFiniteCoordinate {
        /// Raw x value.
        x: f64,
        /// Raw y value.
        y: f64,
    },

    /// An obstacle was placed outside the grid bounds.
    #[error("obstacle {cell:?} lies outside the grid (half-extent {half_extent})")]
    OutOfBounds {
        /// The rounded cell.
        cell: GridCoordinate,
        /// The grid's half-extent.
        half_extent: i32,
    },
}
