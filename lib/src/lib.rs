#![warn(missing_docs)]

//! # `starbattle`
//!
//! A solver for [Star Battle](https://krazydad.com/starbattle/) logic puzzles: an N×N grid is
//! partitioned by walls into N irregular areas, and a solution places exactly K stars in every
//! row, every column, and every area, with no two stars touching, even diagonally.
//!
//! Begin by building a board object using [`BoardBuilder`](builder::BoardBuilder) — either from
//! explicit walls via [`disconnect`](builder::BoardBuilder::disconnect), or from rows of region
//! letters via [`from_region_rows`](builder::BoardBuilder::from_region_rows). Then call
//! [`solve()`](Board::solve), yielding a [`Solution`] or
//! [`Unsatisfiable`](SolveFailure::Unsatisfiable).
//!
//! # Internals
//! The wall grid is expressed as an undirected connectivity graph and decomposed into its areas
//! by flood fill. Solving then runs a tri-state constraint propagation fixpoint: cheap
//! containment eliminations alternate with exhaustive enumeration of the least-undecided areas,
//! committing only the assignments every enumeration agrees on. Most published puzzles collapse
//! entirely under propagation; whatever remains is finished by a branch-and-bound search
//! distributed over a fixed pool of worker threads sharing a work queue and a one-slot result
//! channel. Each branch owns a private copy of the tri-state grid, so the only shared mutable
//! state is the pair of queues.

pub use board::{Area, AreaId, Board};
pub use location::Location;
pub use solution::Solution;
pub use solver::SolveFailure;
pub use step::Direction;

pub(crate) mod board;
mod tests;
pub(crate) mod cell;
pub(crate) mod location;
pub(crate) mod search;
pub(crate) mod solution;
pub(crate) mod solver;
pub(crate) mod step;
pub mod builder;
