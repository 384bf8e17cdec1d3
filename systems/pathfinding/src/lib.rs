#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* search over a walkability snapshot.
//!
//! The search is 4-connected with unit step cost and a Manhattan heuristic.
//! Nodes are closed the first time they are popped and never reopened, which
//! stays optimal only because every step costs the same. Ties on `g + h` are
//! broken by insertion order, so the earliest pushed node is expanded first.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
    hash::{Hash, Hasher},
};

use tilewalk_core::{CellCoord, WalkabilityGrid};

/// Search node tracked by the pathfinder.
///
/// Equality and hashing consider the coordinate only, so a cheaper node for
/// the same cell supersedes the previous one.
#[derive(Clone, Copy, Debug)]
pub struct PathNode {
    /// Cell represented by the node.
    pub cell: CellCoord,
    /// Cost accumulated from the source.
    pub g: u32,
    /// Heuristic estimate to the destination.
    pub h: u32,
    /// Arena index of the predecessor node.
    pub parent: Option<usize>,
}

impl PathNode {
    /// Estimated total cost through this node.
    #[must_use]
    pub const fn f(&self) -> u32 {
        self.g + self.h
    }
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for PathNode {}

impl Hash for PathNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.hash(state);
    }
}

/// Reusable A* workspace.
#[derive(Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<PathNode>,
    open: BinaryHeap<Reverse<(u32, u64, usize)>>,
    closed: HashSet<CellCoord>,
    best: HashMap<CellCoord, usize>,
    sequence: u64,
}

impl Pathfinder {
    /// Computes the shortest waypoint list from `source` to `destination`.
    ///
    /// The list includes both endpoints. An empty list means no route exists.
    /// The source is expanded even when it is not walkable; every other cell
    /// on the path is walkable.
    pub fn find_path(
        &mut self,
        grid: &WalkabilityGrid,
        source: CellCoord,
        destination: CellCoord,
    ) -> Vec<CellCoord> {
        let (columns, rows) = grid.dimensions();
        if source.column() >= columns || source.row() >= rows {
            return Vec::new();
        }
        if source == destination {
            return vec![source];
        }
        if !grid.is_walkable(destination) {
            log::debug!("destination {destination:?} is blocked");
            return Vec::new();
        }

        self.reset();
        self.push(PathNode {
            cell: source,
            g: 0,
            h: source.manhattan_distance(destination),
            parent: None,
        });

        while let Some(Reverse((_, _, index))) = self.open.pop() {
            let current = self.nodes[index];
            if !self.closed.insert(current.cell) {
                continue;
            }
            if current.cell == destination {
                return self.reconstruct(index);
            }

            for neighbor in cardinal_neighbors(current.cell, columns, rows) {
                if self.closed.contains(&neighbor) || !grid.is_walkable(neighbor) {
                    continue;
                }

                let g = current.g + 1;
                let improves = self
                    .best
                    .get(&neighbor)
                    .map_or(true, |known| g < self.nodes[*known].g);
                if !improves {
                    continue;
                }

                self.push(PathNode {
                    cell: neighbor,
                    g,
                    h: neighbor.manhattan_distance(destination),
                    parent: Some(index),
                });
            }
        }

        log::debug!("no path from {source:?} to {destination:?}");
        Vec::new()
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.open.clear();
        self.closed.clear();
        self.best.clear();
        self.sequence = 0;
    }

    fn push(&mut self, node: PathNode) {
        let index = self.nodes.len();
        self.nodes.push(node);
        let _ = self.best.insert(node.cell, index);
        self.open.push(Reverse((node.f(), self.sequence, index)));
        self.sequence += 1;
    }

    fn reconstruct(&self, mut index: usize) -> Vec<CellCoord> {
        let mut path = vec![self.nodes[index].cell];
        while let Some(parent) = self.nodes[index].parent {
            path.push(self.nodes[parent].cell);
            index = parent;
        }
        path.reverse();
        path
    }
}

/// Convenience wrapper running a single search with a fresh workspace.
#[must_use]
pub fn find_path(
    grid: &WalkabilityGrid,
    source: CellCoord,
    destination: CellCoord,
) -> Vec<CellCoord> {
    Pathfinder::default().find_path(grid, source, destination)
}

/// Expansion order: up, left, right, down.
const STEPS: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

fn cardinal_neighbors(
    cell: CellCoord,
    columns: u32,
    rows: u32,
) -> impl Iterator<Item = CellCoord> {
    STEPS.into_iter().filter_map(move |(dx, dy)| {
        let column = u32::try_from(i64::from(cell.column()) + dx).ok()?;
        let row = u32::try_from(i64::from(cell.row()) + dy).ok()?;
        (column < columns && row < rows).then(|| CellCoord::new(column, row))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn path_nodes_compare_by_cell_only() {
        let cheap = PathNode {
            cell: CellCoord::new(2, 3),
            g: 1,
            h: 4,
            parent: None,
        };
        let expensive = PathNode {
            g: 9,
            parent: Some(7),
            ..cheap
        };
        assert_eq!(cheap, expensive);

        let mut set = HashSet::new();
        assert!(set.insert(cheap));
        assert!(!set.insert(expensive));
    }

    #[test]
    fn neighbors_are_yielded_up_left_right_down() {
        let neighbors: Vec<_> = cardinal_neighbors(CellCoord::new(1, 1), 3, 3).collect();
        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
            ]
        );
    }

    #[test]
    fn corner_neighbors_skip_outside_cells() {
        let neighbors: Vec<_> = cardinal_neighbors(CellCoord::new(0, 0), 2, 2).collect();
        assert_eq!(neighbors, vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]);
    }

    #[test]
    fn workspace_is_reused_between_searches() {
        let grid = WalkabilityGrid::open(4, 4);
        let mut pathfinder = Pathfinder::default();
        let first = pathfinder.find_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 3));
        let second = pathfinder.find_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 3));
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
    }
}
