/// Cell values and grid coordinates.
/// Cell semantics are queried via methods so the meaning of each value
/// lives in one place.

use super::serpent::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Empty,
    Wall,     // Border, static obstacle or windmill blade
    Corner,   // The four border corners
    Grow,     // Extends the serpent on its next advance
    Poison,   // Removes the tail segment
    Gate,     // One end of the teleport pair (replaces a Wall)
    Boost,    // Movement interval 0.1s for a while
    Slow,     // Movement interval 0.4s for a while
}

impl Cell {
    /// Does entering this cell end the run?
    pub fn is_lethal(self) -> bool {
        matches!(self, Cell::Wall | Cell::Corner)
    }

    /// Is this one of the four pickup kinds?
    pub fn is_item(self) -> bool {
        matches!(self, Cell::Grow | Cell::Poison | Cell::Boost | Cell::Slow)
    }

    /// Can a new occupant (item, gate exit) be written here?
    pub fn is_open(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

/// Signed grid coordinate. Signed so that stepping off the top or left
/// edge yields a position the grid reports as out of bounds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// The neighbouring position one cell in `dir`.
    pub fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        Pos { x: self.x + dx, y: self.y + dy }
    }

    /// Offset by an arbitrary vector (used by windmill arms).
    pub fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos { x: self.x + dx, y: self.y + dy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_walls_and_corners_are_lethal() {
        assert!(Cell::Wall.is_lethal());
        assert!(Cell::Corner.is_lethal());
        for c in [Cell::Empty, Cell::Grow, Cell::Poison, Cell::Gate, Cell::Boost, Cell::Slow] {
            assert!(!c.is_lethal(), "{c:?}");
        }
    }

    #[test]
    fn gate_is_not_an_item() {
        assert!(!Cell::Gate.is_item());
        assert!(Cell::Boost.is_item());
    }

    #[test]
    fn step_follows_screen_axes() {
        let p = Pos::new(10, 10);
        assert_eq!(p.step(Direction::Up), Pos::new(10, 9));
        assert_eq!(p.step(Direction::Down), Pos::new(10, 11));
        assert_eq!(p.step(Direction::Left), Pos::new(9, 10));
        assert_eq!(p.step(Direction::Right), Pos::new(11, 10));
    }

    #[test]
    fn step_off_origin_goes_negative() {
        assert_eq!(Pos::new(0, 0).step(Direction::Up), Pos::new(0, -1));
    }
}
