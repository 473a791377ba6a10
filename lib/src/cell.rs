use crate::step::Direction;

/// One square of the grid, recording which of its four sides carry a wall.
///
/// A wall toward some direction means the cell is not connected to its neighbor
/// there for the purpose of area decomposition. Walls stay symmetric because
/// they are only ever placed on both sides of an edge at once.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Cell {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) top: bool,
    pub(crate) bottom: bool,
}

impl Cell {
    pub(crate) fn wall_toward(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.top,
            Direction::Down => self.bottom,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub(crate) fn set_wall(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.top = true,
            Direction::Down => self.bottom = true,
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
        }
    }
}
