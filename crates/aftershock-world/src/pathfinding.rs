//! A* search over the [`ObstacleGrid`].
//!
//! Movement is 4-directional with unit cost, so the Manhattan distance
//! heuristic is admissible and consistent and every returned path is a
//! shortest one. The open set is an ordered set keyed by
//! `(f_score, insertion_seq, cell)` alongside a best-known `g_score` map:
//! membership is answered by the map, and an entry whose score improves
//! is removed and re-inserted rather than duplicated. The sequence
//! number makes ties on `f_score` pop in insertion order, so path
//! selection is deterministic.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use aftershock_types::{GridCoordinate, PlanarPoint};
use tracing::trace;

use crate::grid::{ObstacleGrid, cell_at};

/// Stateless path query service sharing one frozen obstacle grid.
///
/// Cloning is cheap; all clones read the same grid.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    grid: Arc<ObstacleGrid>,
}

impl Pathfinder {
    /// Freeze `grid` and build a pathfinder over it.
    pub fn new(grid: ObstacleGrid) -> Self {
        Self {
            grid: Arc::new(grid),
        }
    }

    /// The grid this pathfinder searches.
    pub fn grid(&self) -> &ObstacleGrid {
        &self.grid
    }

    /// Find a path between two ground-plane points.
    ///
    /// Both points are rounded to their nearest cells first. Returns an
    /// empty path for non-finite input as well as for unreachable goals.
    pub fn find_path(&self, start: PlanarPoint, goal: PlanarPoint) -> Vec<GridCoordinate> {
        match (cell_at(start.x, start.z), cell_at(goal.x, goal.z)) {
            (Some(s), Some(g)) => self.find_path_between(s, g),
            _ => Vec::new(),
        }
    }

    /// Find a shortest 4-directional path from `start` to `goal`.
    ///
    /// The result runs start to goal inclusive. It is empty when either
    /// endpoint is blocked or out of bounds, or when no path exists.
    pub fn find_path_between(
        &self,
        start: GridCoordinate,
        goal: GridCoordinate,
    ) -> Vec<GridCoordinate> {
        if !self.grid.is_walkable(start) || !self.grid.is_walkable(goal) {
            return Vec::new();
        }

        let mut open: BTreeSet<(u32, u64, GridCoordinate)> = BTreeSet::new();
        let mut open_keys: HashMap<GridCoordinate, (u32, u64)> = HashMap::new();
        let mut g_score: HashMap<GridCoordinate, u32> = HashMap::new();
        let mut came_from: HashMap<GridCoordinate, GridCoordinate> = HashMap::new();
        let mut seq: u64 = 0;

        let start_f = start.manhattan_distance(goal);
        g_score.insert(start, 0);
        open.insert((start_f, seq, start));
        open_keys.insert(start, (start_f, seq));

        let mut expanded: usize = 0;
        while let Some((_, _, current)) = open.pop_first() {
            open_keys.remove(&current);

            if current == goal {
                trace!(?start, ?goal, expanded, "path found");
                return reconstruct_path(&came_from, current);
            }
            expanded = expanded.saturating_add(1);

            let Some(&current_g) = g_score.get(&current) else {
                continue;
            };
            let tentative_g = current_g.saturating_add(1);

            for neighbor in current.neighbors() {
                if !self.grid.is_walkable(neighbor) {
                    continue;
                }

                let is_better = g_score
                    .get(&neighbor)
                    .is_none_or(|&existing| tentative_g < existing);
                if !is_better {
                    continue;
                }

                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);

                if let Some((old_f, old_seq)) = open_keys.remove(&neighbor) {
                    open.remove(&(old_f, old_seq, neighbor));
                }
                seq = seq.saturating_add(1);
                let f = tentative_g.saturating_add(neighbor.manhattan_distance(goal));
                open.insert((f, seq, neighbor));
                open_keys.insert(neighbor, (f, seq));
            }
        }

        trace!(?start, ?goal, expanded, "no path");
        Vec::new()
    }
}

/// Walk back-pointers from `current` to the start and return the path
/// in start-to-goal order.
fn reconstruct_path(
    came_from: &HashMap<GridCoordinate, GridCoordinate>,
    mut current: GridCoordinate,
) -> Vec<GridCoordinate> {
    let mut path = VecDeque::new();
    path.push_front(current);
    while let Some(&predecessor) = came_from.get(&current) {
        path.push_front(predecessor);
        current = predecessor;
    }
    path.into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn open_grid(half_extent: i32) -> ObstacleGrid {
        ObstacleGrid::new(half_extent).unwrap()
    }

    fn cell(x: i32, y: i32) -> GridCoordinate {
        GridCoordinate::new(x, y)
    }

    /// Breadth-first distance, used as an oracle for path length.
    fn bfs_distance(grid: &ObstacleGrid, start: GridCoordinate, goal: GridCoordinate) -> Option<usize> {
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return None;
        }
        let mut seen = HashMap::new();
        let mut queue = VecDeque::new();
        seen.insert(start, 0_usize);
        queue.push_back(start);
        while let Some(c) = queue.pop_front() {
            let d = seen[&c];
            if c == goal {
                return Some(d);
            }
            for n in c.neighbors() {
                if grid.is_walkable(n) && !seen.contains_key(&n) {
                    seen.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }
        None
    }

    fn assert_valid_path(grid: &ObstacleGrid, path: &[GridCoordinate]) {
        for c in path {
            assert!(grid.is_walkable(*c), "{c:?} is not walkable");
        }
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "{pair:?} not adjacent");
        }
    }

    #[test]
    fn straight_line_has_manhattan_length() {
        let pf = Pathfinder::new(open_grid(10));
        let start = cell(-3, 2);
        let goal = cell(4, -5);
        let path = pf.find_path_between(start, goal);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), start.manhattan_distance(goal) as usize + 1);
        assert_valid_path(pf.grid(), &path);
    }

    #[test]
    fn same_cell_is_single_step_path() {
        let pf = Pathfinder::new(open_grid(5));
        assert_eq!(pf.find_path_between(cell(1, 1), cell(1, 1)), vec![cell(1, 1)]);
    }

    #[test]
    fn real_valued_endpoints_are_rounded() {
        let pf = Pathfinder::new(open_grid(5));
        let path = pf.find_path(
            PlanarPoint { x: 0.4, z: -1.6 },
            PlanarPoint { x: 2.5, z: 0.0 },
        );
        assert_eq!(path.first(), Some(&cell(0, -2)));
        assert_eq!(path.last(), Some(&cell(2, 0)));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn routes_around_a_wall() {
        let mut grid = open_grid(5);
        for y in -4..=4 {
            grid.add_obstacle(0.0, f64::from(y)).unwrap();
        }
        let pf = Pathfinder::new(grid);
        let start = cell(-2, 0);
        let goal = cell(2, 0);
        let path = pf.find_path_between(start, goal);
        assert_valid_path(pf.grid(), &path);
        assert_eq!(path.len(), bfs_distance(pf.grid(), start, goal).unwrap() + 1);
        assert!(path.len() > start.manhattan_distance(goal) as usize + 1);
    }

    #[test]
    fn blocked_endpoints_yield_empty_path() {
        let mut grid = open_grid(5);
        grid.add_obstacle(1.0, 1.0).unwrap();
        let pf = Pathfinder::new(grid);
        assert!(pf.find_path_between(cell(1, 1), cell(3, 3)).is_empty());
        assert!(pf.find_path_between(cell(3, 3), cell(1, 1)).is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_yield_empty_path() {
        let pf = Pathfinder::new(open_grid(5));
        assert!(pf.find_path_between(cell(0, 0), cell(6, 0)).is_empty());
        assert!(
            pf.find_path(
                PlanarPoint { x: f64::NAN, z: 0.0 },
                PlanarPoint { x: 1.0, z: 0.0 }
            )
            .is_empty()
        );
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let mut grid = open_grid(5);
        for (x, y) in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            grid.add_obstacle(x, y).unwrap();
        }
        let pf = Pathfinder::new(grid);
        assert!(pf.find_path_between(cell(3, 3), cell(0, 0)).is_empty());
    }

    #[test]
    fn ties_resolve_deterministically() {
        let pf = Pathfinder::new(open_grid(5));
        let a = pf.find_path_between(cell(0, 0), cell(3, 3));
        let b = pf.find_path_between(cell(0, 0), cell(3, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn random_obstacle_fields_match_bfs_oracle() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut next = move |bound: i32| rng.random_range(-bound..=bound);

        for _ in 0..40 {
            let mut grid = open_grid(6);
            for _ in 0..40 {
                grid.add_obstacle(f64::from(next(6)), f64::from(next(6))).unwrap();
            }
            let pf = Pathfinder::new(grid);
            for _ in 0..10 {
                let start = cell(next(6), next(6));
                let goal = cell(next(6), next(6));
                let path = pf.find_path_between(start, goal);
                match bfs_distance(pf.grid(), start, goal) {
                    Some(d) => {
                        assert_eq!(path.len(), d + 1);
                        assert_eq!(path.first(), Some(&start));
                        assert_eq!(path.last(), Some(&goal));
                        assert_valid_path(pf.grid(), &path);
                    }
                    None => assert!(path.is_empty()),
                }
            }
        }
    }
}
