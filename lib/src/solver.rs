use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::board::{AreaId, Board};
use crate::location::Location;
use crate::search;
use crate::solution::Solution;

/// Reasons a solve may fail.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum SolveFailure {
    /// No placement satisfies every row, column, and area constraint.
    ///
    /// This is an expected outcome for contradictory input, not a fault.
    #[error("no valid star placement exists")]
    Unsatisfiable,
}

/// A branch-local dead end: some area can no longer reach its star count.
///
/// Fatal to the current [`Solution`] instance only; the search level treats it
/// as "discard this branch, do not requeue it".
pub(crate) struct Contradiction;

/// Top level solve procedure for a board.
pub(crate) fn solve(board: &Board) -> Result<Solution, SolveFailure> {
    let mut solution = Solution::empty(board);
    let propagator = Propagator::new(board);

    if propagator.propagate(&mut solution).is_err() {
        return Err(SolveFailure::Unsatisfiable);
    }

    if solution.is_complete() {
        return match solution.verify(board) {
            true => Ok(solution),
            false => Err(SolveFailure::Unsatisfiable),
        };
    }

    let undecided = board.size() * board.size() - solution.known_cells().len();
    debug!(undecided, "propagation reached a fixpoint short of a full assignment");

    search::search(board, solution)
}

/// Exhaustively enumerate every completion of `area` consistent with `solution`.
///
/// Each candidate assigns a value to every cell of the area that was unknown on
/// entry, listed in the same order across candidates; a candidate is kept only
/// if the fully decided area holds exactly K stars. The indexed recursion
/// visits each assignment once, so the output carries no duplicates. An empty
/// output means the area is over-constrained — a contradiction upstream.
///
/// `solution` is mutated during the recursion but restored before returning.
pub(crate) fn solve_area(board: &Board, area: AreaId, solution: &mut Solution) -> Vec<Vec<(Location, bool)>> {
    let unknown = board.areas()[area]
        .cells()
        .iter()
        .copied()
        .filter(|location| solution.get(*location).is_none())
        .collect_vec();

    let mut candidates = Vec::new();
    enumerate(board, area, solution, &unknown, 0, &mut candidates);
    candidates
}

fn enumerate(
    board: &Board,
    area: AreaId,
    solution: &mut Solution,
    unknown: &[Location],
    depth: usize,
    candidates: &mut Vec<Vec<(Location, bool)>>,
) {
    let placed = solution.count_in_area(board, area, Some(true));

    if depth == unknown.len() {
        if placed == board.stars() {
            candidates.push(
                unknown
                    .iter()
                    .map(|location| (*location, solution.get(*location) == Some(true)))
                    .collect_vec(),
            );
        }
        return;
    }

    // too few undecided cells remain to reach the star count; the subtree is dead
    if placed + (unknown.len() - depth) < board.stars() {
        return;
    }

    let location = unknown[depth];

    solution.set(location, Some(false));
    enumerate(board, area, solution, unknown, depth + 1, candidates);
    solution.set(location, None);

    if solution.can_place_star(board, location) {
        solution.set(location, Some(true));
        enumerate(board, area, solution, unknown, depth + 1, candidates);
        solution.set(location, None);
    }
}

/// Runs the two deduction rules to a joint fixpoint over one [`Solution`].
pub(crate) struct Propagator<'a> {
    board: &'a Board,
}

impl<'a> Propagator<'a> {
    pub(crate) fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Alternate containment elimination and area resolution until neither
    /// changes the solution, then return it (possibly incomplete).
    ///
    /// Only logically entailed cells are ever committed, so the result does
    /// not depend on visitation order and a second run is a no-op.
    pub(crate) fn propagate(&self, solution: &mut Solution) -> Result<(), Contradiction> {
        loop {
            let eliminated = self.eliminate_contained(solution);
            let resolved = self.solve_fully_defined_areas(solution)?;

            if !eliminated && !resolved {
                return Ok(());
            }
        }
    }

    /// Structural eliminations that need no enumeration:
    ///
    /// (a) a row or column whose cells all belong to one area — the area's
    ///     cells outside that line can never hold the line's stars;
    /// (b) an area whose unknown cells all lie in one row or column — the
    ///     area's stars claim that line, so the rest of the line is excluded.
    ///
    /// Both rules only fire while the area has no known star yet; the
    /// conservatism prevents over-elimination once stars start landing.
    pub(crate) fn eliminate_contained(&self, solution: &mut Solution) -> bool {
        let board = self.board;
        let size = board.size();
        let mut excluded: Vec<Location> = Vec::new();

        for line in 0..size {
            let row_areas = (0..size)
                .map(|col| board.area_for_cell(Location(line, col)))
                .unique()
                .collect_vec();
            if let [area] = row_areas[..] {
                if solution.count_in_area(board, area, Some(true)) == 0 {
                    excluded.extend(board.areas()[area].cells().iter().copied().filter(|cell| cell.0 != line));
                }
            }

            let col_areas = (0..size)
                .map(|row| board.area_for_cell(Location(row, line)))
                .unique()
                .collect_vec();
            if let [area] = col_areas[..] {
                if solution.count_in_area(board, area, Some(true)) == 0 {
                    excluded.extend(board.areas()[area].cells().iter().copied().filter(|cell| cell.1 != line));
                }
            }
        }

        for (id, area) in board.areas().iter().enumerate() {
            if solution.count_in_area(board, id, Some(true)) != 0 {
                continue;
            }

            let unknown = area
                .cells()
                .iter()
                .copied()
                .filter(|location| solution.get(*location).is_none())
                .collect_vec();
            if unknown.is_empty() {
                continue;
            }

            if unknown.iter().map(|location| location.0).all_equal() {
                let row = unknown[0].0;
                excluded.extend((0..size).map(|col| Location(row, col)).filter(|cell| board.area_for_cell(*cell) != id));
            }

            if unknown.iter().map(|location| location.1).all_equal() {
                let col = unknown[0].1;
                excluded.extend((0..size).map(|row| Location(row, col)).filter(|cell| board.area_for_cell(*cell) != id));
            }
        }

        let mut changed = false;
        for location in excluded {
            if solution.get(location).is_none() {
                solution.set(location, Some(false));
                changed = true;
            }
        }

        changed
    }

    /// Resolve areas by exhaustive enumeration, fewest unknown cells first.
    ///
    /// Zero candidates is a contradiction. Otherwise only the assignments
    /// common to every candidate are committed (a lone candidate commits in
    /// full), and any commitment re-sorts the queue and restarts from the
    /// smallest area. Fixpoint is reached when a full pass commits nothing.
    /// The ordering is a convergence heuristic, not a correctness requirement.
    pub(crate) fn solve_fully_defined_areas(&self, solution: &mut Solution) -> Result<bool, Contradiction> {
        let board = self.board;
        let mut changed_any = false;

        'restart: loop {
            let order = (0..board.areas().len())
                .map(|id| (id, solution.count_in_area(board, id, None)))
                .sorted_by_key(|(_, unknown)| *unknown)
                .collect_vec();

            for (id, unknown) in order {
                if unknown == 0 {
                    // fully decided; anything but an exact star count is a dead branch
                    if solution.count_in_area(board, id, Some(true)) != board.stars() {
                        return Err(Contradiction);
                    }
                    continue;
                }

                let candidates = solve_area(board, id, solution);
                if candidates.is_empty() {
                    return Err(Contradiction);
                }

                let common = common_assignments(&candidates);
                if !common.is_empty() {
                    // consensus cells were unknown, so this always makes progress
                    solution.apply_known_cells(board, &common);
                    changed_any = true;
                    continue 'restart;
                }
            }

            break;
        }

        Ok(changed_any)
    }
}

/// The (cell, value) assignments shared by every candidate: definitely-true if
/// starred in all of them, definitely-false if starred in none.
fn common_assignments(candidates: &[Vec<(Location, bool)>]) -> Vec<(Location, bool)> {
    let Some((first, rest)) = candidates.split_first() else {
        return Vec::new();
    };

    first
        .iter()
        .enumerate()
        .filter(|(i, (_, value))| rest.iter().all(|candidate| candidate[*i].1 == *value))
        .map(|(_, assignment)| *assignment)
        .collect_vec()
}
