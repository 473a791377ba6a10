use std::num::NonZero;

use ndarray::Ix;

type Coord = usize;
pub(crate) type Dimension = NonZero<Coord>;

/// A location `(row, col)` on a board. The top left corner is `Location(0, 0)`.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.0, self.1)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    pub(crate) fn in_bounds(&self, size: Dimension) -> bool {
        self.0 < size.get() && self.1 < size.get()
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.0, value.1)
    }
}
