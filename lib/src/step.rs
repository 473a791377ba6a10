use strum::VariantArray;

use crate::location::Location;

/// A cardinal step between two adjacent cells.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Direction {
    /// Toward the previous row.
    Up,
    /// Toward the next row.
    Down,
    /// Toward the previous column.
    Left,
    /// Toward the next column.
    Right,
}

impl Direction {
    /// Attempt the step from `location` in the direction specified by `self` and return the resultant [`Location`].
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((-1, 0)),
            Self::Down => location.offset_by((1, 0)),
            Self::Left => location.offset_by((0, -1)),
            Self::Right => location.offset_by((0, 1)),
        }
    }

    /// Invert the direction specified by `self`.
    pub fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Determine the direction from `a` to `b` by calling [`attempt_from`](Self::attempt_from) until one works.
    ///
    /// Returns [`None`] if the two locations are not cardinally adjacent.
    pub fn between(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|direction| direction.attempt_from(a) == b).copied()
    }
}
