#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;

    use ndarray::Array2;
    use proptest::prelude::*;
    use strum::VariantArray;
    use unordered_pair::UnorderedPair;

    use crate::board::{self, Board};
    use crate::builder::{BoardBuilder, BoardError, BuilderInvalidReason};
    use crate::cell::Cell;
    use crate::location::Location;
    use crate::solution::Solution;
    use crate::solver::{solve_area, Propagator, SolveFailure};
    use crate::step::Direction;

    /// Five single-row areas; propagation alone cannot commit anything here.
    fn row_board() -> Board {
        BoardBuilder::from_region_rows(1, &[
            "AAAAA",
            "BBBBB",
            "CCCCC",
            "DDDDD",
            "EEEEE",
        ]).build().unwrap()
    }

    /// An irregular partition with a forced singleton area; propagation alone
    /// cascades all the way to the unique answer.
    fn cascade_board() -> Board {
        BoardBuilder::from_region_rows(1, &[
            "ABBBB",
            "CCBDD",
            "CCDDD",
            "ECEEE",
            "EEEEE",
        ]).build().unwrap()
    }

    #[test]
    fn decompose_region_rows() {
        let board = cascade_board();

        assert_eq!(board.to_string(), "ABBBB
CCBDD
CCDDD
ECEEE
EEEEE
");
        assert_eq!(board.areas().len(), 5);
        assert_eq!(board.area_for_cell(Location(0, 0)), 0);
        assert_eq!(board.area_for_cell(Location(1, 2)), 1);
        assert_eq!(board.area_for_cell(Location(3, 1)), 2);
        assert_eq!(board.areas()[0].cells(), &[Location(0, 0)]);
    }

    #[test]
    fn disconnect_is_symmetric() {
        let mut builder = BoardBuilder::with_size(NonZero::new(2).unwrap(), 1);
        builder
            .disconnect(UnorderedPair::from((Location(0, 0), Location(1, 0))))
            .disconnect(UnorderedPair::from((Location(1, 1), Location(0, 1))));
        let board = builder.build().unwrap();

        assert_eq!(board.to_string(), "AA
BB
");
        assert!(board.cells[(0, 0)].bottom);
        assert!(board.cells[(1, 0)].top);
        assert!(board.cells[(0, 1)].bottom);
        assert!(board.cells[(1, 1)].top);
    }

    #[test]
    fn disconnect_around_isolates_corner() {
        let mut builder = BoardBuilder::with_size(NonZero::new(2).unwrap(), 1);
        builder.disconnect_around(Location(0, 0), vec![Direction::Right, Direction::Down]);
        let board = builder.build().unwrap();

        assert_eq!(board.to_string(), "AB
BB
");
        assert_eq!(board.areas()[0].cells(), &[Location(0, 0)]);
    }

    #[test]
    fn non_adjacent_disconnect_does_nothing() {
        let mut builder = BoardBuilder::with_size(NonZero::new(3).unwrap(), 1);
        builder.disconnect(UnorderedPair::from((Location(0, 0), Location(2, 2))));

        assert!(builder.is_valid().is_none());
        // still one big area, caught at build time
        assert!(matches!(
            builder.build(),
            Err(BoardError::AreaCountMismatch { size: 3, found: 1 })
        ));
    }

    #[test]
    fn out_of_bounds_disconnect_invalidates() {
        let mut builder = BoardBuilder::with_size(NonZero::new(3).unwrap(), 1);
        builder.disconnect(UnorderedPair::from((Location(0, 0), Location(0, 3))));

        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::FeatureOutOfBounds]));
        assert!(matches!(builder.build(), Err(BoardError::Invalid(_))));
    }

    #[test]
    fn malformed_region_rows_invalidate() {
        let builder = BoardBuilder::from_region_rows(1, &["AB", "ABC"]);
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::MalformedRegionData]));

        let builder = BoardBuilder::from_region_rows(1, &[]);
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::MalformedRegionData]));
    }

    #[test]
    fn star_placement_cascades() {
        let board = row_board();
        let mut solution = Solution::empty(&board);
        solution.apply_known_cells(&board, &[(Location(0, 0), true)]);

        assert_eq!(solution.to_string(), "*....
..???
.????
.????
.????
");
        // excluded by adjacency, by the row count, and by the column count
        assert_eq!(solution.get(Location(1, 1)), Some(false));
        assert_eq!(solution.get(Location(0, 4)), Some(false));
        assert_eq!(solution.get(Location(4, 0)), Some(false));
        assert!(!solution.can_place_star(&board, Location(1, 1)));
        assert!(solution.can_place_star(&board, Location(1, 2)));

        // the cleanup pass never leaves an unknown cell that could not hold a star
        for (index, _) in board.cells.indexed_iter() {
            let location = Location::from(index);
            assert!(solution.get(location).is_some() || solution.can_place_star(&board, location));
        }
    }

    #[test]
    fn known_cells_round_trip() {
        let board = row_board();
        let mut solution = Solution::empty(&board);
        solution.apply_known_cells(&board, &[(Location(0, 0), true)]);

        let mut replayed = Solution::empty(&board);
        replayed.apply_known_cells(&board, &solution.known_cells());

        assert_eq!(replayed, solution);
    }

    #[test]
    fn enumerate_single_star_row() {
        let board = row_board();
        let mut solution = Solution::empty(&board);

        let candidates = solve_area(&board, 0, &mut solution);
        assert_eq!(candidates.len(), 5);
        assert!(candidates.iter().all(|candidate| candidate.iter().filter(|(_, starred)| *starred).count() == 1));
        // try/undo enumeration must leave the solution untouched
        assert_eq!(solution, Solution::empty(&board));

        solution.apply_known_cells(&board, &[(Location(0, 0), false)]);
        let candidates = solve_area(&board, 0, &mut solution);
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn enumerate_overconstrained_area_is_empty() {
        let board = cascade_board();
        let mut solution = Solution::empty(&board);

        // a star next to the singleton area leaves it with no cell for its own
        solution.apply_known_cells(&board, &[(Location(0, 1), true)]);
        let candidates = solve_area(&board, 0, &mut solution);
        assert!(candidates.is_empty());
    }

    #[test]
    fn containment_elimination() {
        let board = cascade_board();
        let mut solution = Solution::empty(&board);

        let changed = Propagator::new(&board).eliminate_contained(&mut solution);

        assert!(changed);
        // the singleton area pins its row and column; the bottom row pins its area
        assert_eq!(solution.to_string(), "?....
.????
.????
.?...
.????
");
    }

    #[test]
    fn propagation_alone_solves_cascade() {
        let board = cascade_board();
        let mut solution = Solution::empty(&board);

        assert!(Propagator::new(&board).propagate(&mut solution).is_ok());
        assert!(solution.is_complete());
        assert!(solution.verify(&board));
        assert_eq!(solution.to_string(), "*....
..*..
....*
.*...
...*.
");

        assert_eq!(board.solve().unwrap(), solution);
    }

    #[test]
    fn propagation_is_idempotent() {
        let board = row_board();
        let propagator = Propagator::new(&board);

        let mut once = Solution::empty(&board);
        assert!(propagator.propagate(&mut once).is_ok());

        let mut twice = once.clone();
        assert!(propagator.propagate(&mut twice).is_ok());
        assert_eq!(once, twice);
    }

    #[test]
    fn search_finishes_what_propagation_cannot() {
        let board = row_board();

        // every area admits five candidates with no common forced cell, so the
        // fixpoint commits nothing and the parallel search takes over
        let mut stalled = Solution::empty(&board);
        assert!(Propagator::new(&board).propagate(&mut stalled).is_ok());
        assert_eq!(stalled, Solution::empty(&board));

        let solution = board.solve().unwrap();
        assert!(solution.verify(&board));
        for line in 0..board.size() {
            assert_eq!(solution.count_in_row(line, Some(true)), 1);
            assert_eq!(solution.count_in_column(line, Some(true)), 1);
        }
    }

    #[test]
    fn solve_block_partition() {
        let board = BoardBuilder::from_region_rows(1, &[
            "AAAABBBB",
            "AAAABBBB",
            "CCCCDDDD",
            "CCCCDDDD",
            "EEEEFFFF",
            "EEEEFFFF",
            "GGGGHHHH",
            "GGGGHHHH",
        ]).build().unwrap();

        let solution = board.solve().unwrap();
        assert!(solution.verify(&board));
        for line in 0..board.size() {
            assert_eq!(solution.count_in_row(line, Some(true)), 1);
            assert_eq!(solution.count_in_column(line, Some(true)), 1);
        }
        for area in 0..board.areas().len() {
            assert_eq!(solution.count_in_area(&board, area, Some(true)), 1);
        }
    }

    #[test]
    fn contradictory_board_is_unsatisfiable() {
        // a singleton area cannot hold two stars
        let board = BoardBuilder::from_region_rows(2, &[
            "AABBB",
            "AABBB",
            "AABBB",
            "CCDDD",
            "CCDDE",
        ]).build().unwrap();

        assert_eq!(board.solve(), Err(SolveFailure::Unsatisfiable));
    }

    #[test]
    fn verify_rejects_touching_stars() {
        let board = row_board();
        let mut solution = Solution::empty(&board);
        for (index, _) in board.cells.indexed_iter() {
            solution.set(Location::from(index), Some(false));
        }

        // one star per row, column, and area, but two of them touch diagonally
        for location in [Location(0, 0), Location(1, 1), Location(2, 4), Location(3, 2), Location(4, 3)] {
            solution.set(location, Some(true));
        }

        assert!(solution.is_complete());
        assert!(!solution.verify(&board));
        assert!(!solution.can_place_star(&board, Location(0, 0)));

        // moving the clash apart makes the same counts verifiable
        let mut solution = Solution::empty(&board);
        for (index, _) in board.cells.indexed_iter() {
            solution.set(Location::from(index), Some(false));
        }
        for location in [Location(0, 1), Location(1, 3), Location(2, 0), Location(3, 2), Location(4, 4)] {
            solution.set(location, Some(true));
        }

        assert!(solution.verify(&board));
    }

    proptest! {
        #[test]
        fn decomposition_partitions_grid(walls in proptest::collection::vec((0..6usize, 0..6usize, 0..2usize), 0..40)) {
            let size = NonZero::new(6).unwrap();
            let mut cells = Array2::from_shape_simple_fn((6, 6), Cell::default);

            for (row, col, axis) in walls {
                let location = Location(row, col);
                let direction = match axis {
                    0 => Direction::Right,
                    _ => Direction::Down,
                };

                let neighbor = direction.attempt_from(location);
                if neighbor.in_bounds(size) {
                    cells[location.as_index()].set_wall(direction);
                    cells[neighbor.as_index()].set_wall(direction.invert());
                }
            }

            let (areas, lookup) = board::decompose(&cells);

            // every cell is claimed by exactly one area, and the lookup agrees
            let mut seen = HashSet::new();
            for (id, area) in areas.iter().enumerate() {
                for location in area.cells() {
                    prop_assert!(seen.insert(*location));
                    prop_assert_eq!(lookup[location.as_index()], id);
                }
            }
            prop_assert_eq!(seen.len(), 36);

            // every area is internally 4-connected without crossing a wall
            for area in areas.iter() {
                let members: HashSet<Location> = area.cells().iter().copied().collect();
                let mut reached = HashSet::from([area.cells()[0]]);
                let mut stack = vec![area.cells()[0]];

                while let Some(location) = stack.pop() {
                    for direction in Direction::VARIANTS {
                        let neighbor = direction.attempt_from(location);
                        if members.contains(&neighbor)
                            && !cells[location.as_index()].wall_toward(*direction)
                            && reached.insert(neighbor)
                        {
                            stack.push(neighbor);
                        }
                    }
                }

                prop_assert_eq!(reached.len(), area.len());
            }
        }
    }
}
