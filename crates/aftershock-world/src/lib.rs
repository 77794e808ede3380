//! Training-ground geometry for the Aftershock disaster trainer.
//!
//! The world is a bounded integer grid with a static set of blocked
//! cells (buildings). AI agents ask for routes across it; queries are
//! pure reads and share the grid without locking.
//!
//! # Modules
//!
//! - [`error`] -- Grid construction errors.
//! - [`grid`] -- [`ObstacleGrid`]: bounds, obstacles, and coordinate
//!   rounding.
//! - [`layout`] -- Default building lattice and extra obstacle seeding.
//! - [`pathfinding`] -- [`Pathfinder`]: A* search with a Manhattan
//!   heuristic.

pub mod error;
pub mod grid;
pub mod layout;
pub mod pathfinding;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::{DEFAULT_HALF_EXTENT, ObstacleGrid, cell_at, round_to_cell};
pub use layout::{seed_default_buildings, seed_points};
pub use pathfinding::Pathfinder;
