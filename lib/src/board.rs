use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;

use crate::cell::Cell;
use crate::location::{Dimension, Location};
use crate::solution::Solution;
use crate::solver::{self, SolveFailure};
use crate::step::Direction;

/// Index of an [`Area`] within its board's partition.
pub type AreaId = usize;

/// A maximal set of cells connected through non-walled cardinal edges.
///
/// Like every row and column, an area must hold exactly K stars in a solution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Area {
    pub(crate) cells: Vec<Location>,
}

impl Area {
    /// The cells of this area, sorted row-major.
    pub fn cells(&self) -> &[Location] {
        &self.cells
    }

    /// The number of cells in this area.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether this area holds no cells. Never true for an area produced by decomposition.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// An N×N Star Battle board: the wall grid, the area partition derived from it,
/// and the number of stars K required in every row, column, and area.
///
/// [`Board`]s should be built using a [`BoardBuilder`](crate::builder::BoardBuilder)
/// and are immutable afterwards, so a single board may be shared by reference
/// across any number of search workers.
pub struct Board {
    pub(crate) size: Dimension,
    pub(crate) stars: usize,
    pub(crate) cells: Array2<Cell>,
    pub(crate) areas: Vec<Area>,
    pub(crate) area_lookup: Array2<AreaId>,
}

impl Board {
    /// The side length N of this board.
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// The number of stars K required in every row, column, and area.
    pub fn stars(&self) -> usize {
        self.stars
    }

    /// The areas of this board, ordered by discovery (row-major by their first cell).
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// The area owning `location`. O(1).
    pub fn area_for_cell(&self, location: Location) -> AreaId {
        self.area_lookup[location.as_index()]
    }

    /// Solves this board: constraint propagation to a fixpoint first, then a
    /// parallel backtracking search for whatever propagation could not decide.
    ///
    /// Returns [`SolveFailure::Unsatisfiable`] when no placement satisfies
    /// every row, column, and area constraint.
    pub fn solve(&self) -> Result<Solution, SolveFailure> {
        solver::solve(self)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.size.get() {
            for col in 0..self.size.get() {
                let id = self.area_lookup[(row, col)];
                write!(f, "{}", (b'A' + (id % 26) as u8) as char)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Express the wall grid as an undirected graph: a vertex per cell, an edge
/// wherever two cardinal neighbors have no wall on either side of their shared edge.
pub(crate) fn connectivity(cells: &Array2<Cell>) -> UnGraphMap<Location, ()> {
    let mut graph = UnGraphMap::with_capacity(cells.len(), 2 * cells.len());

    for (index, _) in cells.indexed_iter() {
        graph.add_node(Location::from(index));
    }

    for (index, cell) in cells.indexed_iter() {
        let location = Location::from(index);

        // add edges down and to the right, if possible
        for direction in [Direction::Down, Direction::Right] {
            let neighbor = direction.attempt_from(location);
            if let Some(other) = cells.get(neighbor.as_index()) {
                if !cell.wall_toward(direction) && !other.wall_toward(direction.invert()) {
                    graph.add_edge(location, neighbor, ());
                }
            }
        }
    }

    graph
}

/// Decompose the grid into its areas by flood fill: claim each unvisited cell's
/// connected component, repeat until every cell is claimed. Also builds the
/// cell→area lookup used for O(1) membership queries.
pub(crate) fn decompose(cells: &Array2<Cell>) -> (Vec<Area>, Array2<AreaId>) {
    let graph = connectivity(cells);
    let mut area_lookup = Array2::from_elem(cells.raw_dim(), AreaId::MAX);
    let mut areas: Vec<Area> = Vec::new();

    for (index, _) in cells.indexed_iter() {
        let start = Location::from(index);
        if area_lookup[start.as_index()] != AreaId::MAX {
            continue;
        }

        let id = areas.len();
        let mut collected = Vec::new();
        let mut stack = vec![start];
        area_lookup[start.as_index()] = id;

        while let Some(location) = stack.pop() {
            collected.push(location);

            for neighbor in graph.neighbors(location) {
                if area_lookup[neighbor.as_index()] == AreaId::MAX {
                    area_lookup[neighbor.as_index()] = id;
                    stack.push(neighbor);
                }
            }
        }

        collected.sort();
        areas.push(Area { cells: collected });
    }

    (areas, area_lookup)
}
