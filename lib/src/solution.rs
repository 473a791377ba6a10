use std::fmt::{Display, Formatter};

use itertools::{iproduct, Itertools};
use ndarray::Array2;

use crate::board::{AreaId, Board};
use crate::location::Location;

/// A tri-state assignment over a board's cells: `Some(true)` holds a star,
/// `Some(false)` is excluded, `None` is not yet decided.
///
/// A solution is logically owned by exactly one execution context at a time —
/// the propagation engine or one search branch — and is cloned, never aliased,
/// whenever two contexts must explore independently. Equality compares the
/// full grid row-major, which is the canonical form: two solutions agree on
/// their decided cells if and only if their grids are identical.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution {
    pub(crate) cells: Array2<Option<bool>>,
}

impl Solution {
    /// An all-unknown solution sized for `board`.
    pub fn empty(board: &Board) -> Self {
        Self {
            cells: Array2::from_elem((board.size(), board.size()), None),
        }
    }

    /// Read the tri-state value at `location`.
    pub fn get(&self, location: Location) -> Option<bool> {
        self.cells[location.as_index()]
    }

    pub(crate) fn set(&mut self, location: Location, value: Option<bool>) {
        self.cells[location.as_index()] = value;
    }

    /// Count the cells of `row` currently equal to `value`.
    pub fn count_in_row(&self, row: usize, value: Option<bool>) -> usize {
        self.cells.row(row).iter().filter(|cell| **cell == value).count()
    }

    /// Count the cells of `col` currently equal to `value`.
    pub fn count_in_column(&self, col: usize, value: Option<bool>) -> usize {
        self.cells.column(col).iter().filter(|cell| **cell == value).count()
    }

    /// Count the cells of `area` currently equal to `value`.
    pub fn count_in_area(&self, board: &Board, area: AreaId, value: Option<bool>) -> usize {
        board.areas()[area]
            .cells()
            .iter()
            .filter(|location| self.get(**location) == value)
            .count()
    }

    /// Whether no unknown cells remain.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// The single admissibility test used everywhere: whether `location` may
    /// hold a star given the current assignment.
    ///
    /// Fails if any of the 8 neighbors already holds a star, or if a star here
    /// would push the row, column, or area count past K. A star already at
    /// `location` is not counted twice.
    pub fn can_place_star(&self, board: &Board, location: Location) -> bool {
        for (dr, dc) in iproduct!(-1isize..=1, -1isize..=1) {
            if dr == 0 && dc == 0 {
                continue;
            }

            let neighbor = location.offset_by((dr, dc));
            if neighbor.in_bounds(board.size) && self.get(neighbor) == Some(true) {
                return false;
            }
        }

        let add = usize::from(self.get(location) != Some(true));
        let stars = board.stars();

        self.count_in_row(location.0, Some(true)) + add <= stars
            && self.count_in_column(location.1, Some(true)) + add <= stars
            && self.count_in_area(board, board.area_for_cell(location), Some(true)) + add <= stars
    }

    /// Write `assignments`, then falsify every still-unknown cell that can no
    /// longer hold a star.
    ///
    /// The cleanup pass is what lets one area's resolution cascade into row,
    /// column, and neighbor deductions across the whole grid.
    pub fn apply_known_cells(&mut self, board: &Board, assignments: &[(Location, bool)]) {
        for (location, value) in assignments {
            self.set(*location, Some(*value));
        }

        for (row, col) in iproduct!(0..board.size(), 0..board.size()) {
            let location = Location(row, col);
            if self.get(location).is_none() && !self.can_place_star(board, location) {
                self.set(location, Some(false));
            }
        }
    }

    /// Every decided cell with its value, row-major.
    ///
    /// This is the canonical exchange form: fed back through
    /// [`apply_known_cells`](Self::apply_known_cells) on a fresh solution of
    /// the same board it reproduces `self` exactly, and it is what renderers
    /// and answer-key checks consume.
    pub fn known_cells(&self) -> Vec<(Location, bool)> {
        self.cells
            .indexed_iter()
            .filter_map(|(index, cell)| cell.map(|value| (Location::from(index), value)))
            .collect_vec()
    }

    /// True iff this solution is complete, places exactly K·N stars, and every
    /// star individually still passes [`can_place_star`](Self::can_place_star).
    ///
    /// The per-star recheck defends against any inconsistency introduced by
    /// partial updates.
    pub fn verify(&self, board: &Board) -> bool {
        if !self.is_complete() {
            return false;
        }

        let placed = self.cells.iter().filter(|cell| **cell == Some(true)).count();
        if placed != board.stars() * board.size() {
            return false;
        }

        self.cells
            .indexed_iter()
            .filter(|(_, cell)| **cell == Some(true))
            .all(|(index, _)| self.can_place_star(board, Location::from(index)))
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                write!(f, "{}", match cell {
                    Some(true) => '*',
                    Some(false) => '.',
                    None => '?',
                })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
