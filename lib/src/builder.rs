use std::num::NonZero;

use itertools::{iproduct, Itertools};
use ndarray::Array2;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::board::{self, Board};
use crate::cell::Cell;
use crate::location::{Dimension, Location};
use crate::step::Direction;

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// A wall was placed against a location outside the bounds specified on the builder.
    FeatureOutOfBounds,
    /// Region data did not describe a square grid of the declared size.
    MalformedRegionData,
}

/// Reasons a builder cannot be converted into a playable [`Board`].
#[derive(Debug, Error)]
pub enum BoardError {
    /// The builder entered an invalid state while features were being placed.
    #[error("builder is in an invalid state: {0:?}")]
    Invalid(Vec<BuilderInvalidReason>),
    /// The walls decompose the grid into a number of areas other than the side
    /// length, so the board cannot be a Star Battle puzzle.
    #[error("grid of size {size} decomposed into {found} areas")]
    AreaCountMismatch {
        /// The side length N, which is also the required number of areas.
        size: usize,
        /// The number of areas the walls actually produce.
        found: usize,
    },
}

/// A builder for [`Board`]s.
///
/// Walls may be declared directly with [`disconnect`](Self::disconnect) and
/// [`disconnect_around`](Self::disconnect_around), or derived from rows of
/// region letters with [`from_region_rows`](Self::from_region_rows).
/// Builders mutate themselves while building but can be [`Clone`]d to save
/// their state at some point.
#[derive(Clone)]
pub struct BoardBuilder {
    size: Dimension,
    stars: usize,
    cells: Array2<Cell>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl BoardBuilder {
    /// Construct a new wall-free builder for a `size`×`size` grid requiring
    /// `stars` stars per row, column, and area.
    pub fn with_size(size: NonZero<usize>, stars: usize) -> Self {
        Self {
            size,
            stars,
            cells: Array2::from_shape_simple_fn((size.get(), size.get()), Cell::default),
            invalid_reasons: Default::default(),
        }
    }

    /// Derive a builder from rows of region letters, one character per cell:
    /// two cardinal neighbors with different characters are walled apart.
    ///
    /// This is the run-length-free form of the encoding used by published
    /// puzzle collections. The builder becomes invalid with
    /// [`MalformedRegionData`](BuilderInvalidReason::MalformedRegionData) if
    /// `rows` is empty or not square.
    pub fn from_region_rows(stars: usize, rows: &[&str]) -> Self {
        let Some(size) = NonZero::new(rows.len()) else {
            let mut builder = Self::with_size(NonZero::<usize>::MIN, stars);
            builder.invalid_reasons.push(BuilderInvalidReason::MalformedRegionData);
            return builder;
        };

        let mut builder = Self::with_size(size, stars);
        if rows.iter().any(|row| row.len() != size.get()) {
            builder.invalid_reasons.push(BuilderInvalidReason::MalformedRegionData);
            return builder;
        }

        let grid = rows.iter().map(|row| row.as_bytes()).collect_vec();
        for (row, col) in iproduct!(0..size.get(), 0..size.get()) {
            let location = Location(row, col);

            if col + 1 < size.get() && grid[row][col] != grid[row][col + 1] {
                builder.disconnect(UnorderedPair::from((location, Location(row, col + 1))));
            }

            if row + 1 < size.get() && grid[row][col] != grid[row + 1][col] {
                builder.disconnect(UnorderedPair::from((location, Location(row + 1, col))));
            }
        }

        builder
    }

    /// Disconnect the two `locations`, i.e. place a wall between them.
    ///
    /// The wall is recorded on both cells at once, keeping the wall grid symmetric.
    /// If the two locations are not adjacent, this function does nothing and does not invalidate the builder.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if either location is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn disconnect(&mut self, locations: UnorderedPair<Location>) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        for location in [locations.0, locations.1] {
            if !location.in_bounds(self.size) {
                self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
                return self;
            }
        }

        let Some(direction) = Direction::between(locations.0, locations.1) else {
            return self;
        };

        self.cells[locations.0.as_index()].set_wall(direction);
        self.cells[locations.1.as_index()].set_wall(direction.invert());

        self
    }

    /// Shorthand for multiple calls to [`Self::disconnect`], with the same conditions.
    ///
    /// Disconnects cells neighboring `location`.
    pub fn disconnect_around(&mut self, location: Location, directions: Vec<Direction>) -> &mut Self {
        for direction in directions {
            self.disconnect(UnorderedPair::from((location, direction.attempt_from(location))));
        }

        self
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Board`], decomposing the grid
    /// into its areas and validating the partition eagerly: a grid whose walls
    /// produce a number of areas other than N is rejected here, rather than
    /// surfacing later as a spurious "unsatisfiable".
    pub fn build(&self) -> Result<Board, BoardError> {
        if !self.invalid_reasons.is_empty() {
            return Err(BoardError::Invalid(self.invalid_reasons.clone()));
        }

        let (areas, area_lookup) = board::decompose(&self.cells);
        if areas.len() != self.size.get() {
            return Err(BoardError::AreaCountMismatch {
                size: self.size.get(),
                found: areas.len(),
            });
        }

        Ok(Board {
            size: self.size,
            stars: self.stars,
            cells: self.cells.clone(),
            areas,
            area_lookup,
        })
    }
}
