/// Grid coordinates, movement directions and player intents.
///
/// Movement is expressed as a pure `(dx, dy)` displacement so the same
/// vector drives the player step and, when pushing, the box step.

use std::fmt;

/// A cell coordinate. Zero-indexed; `(0, 0)` is the top-left corner.
///
/// Signed so that `pos + delta` next to the grid edge stays representable;
/// bounds are checked against the level, not the type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Cell reached by stepping `(dx, dy)` from here.
    pub fn offset(self, (dx, dy): (i32, i32)) -> Position {
        Position { x: self.x + dx, y: self.y + dy }
    }

    /// Displacement that takes `from` to `self`.
    pub fn delta_from(self, from: Position) -> (i32, i32) {
        (self.x - from.x, self.y - from.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four unit moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    pub const ALL: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}

impl fmt::Display for MoveDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDir::Up => write!(f, "Up"),
            MoveDir::Down => write!(f, "Down"),
            MoveDir::Left => write!(f, "Left"),
            MoveDir::Right => write!(f, "Right"),
        }
    }
}

/// What the presentation layer asks the session to do.
/// Keyboard, gamepad and any future input source all reduce to these.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Start,
    Move(MoveDir),
    Undo,
    Reset,
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_are_unit_steps() {
        for dir in MoveDir::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(dx.abs() + dy.abs(), 1, "{dir} is not a unit step");
        }
    }

    #[test]
    fn offset_and_delta_are_inverse() {
        let from = Position::new(3, 4);
        for dir in MoveDir::ALL {
            let to = from.offset(dir.delta());
            assert_eq!(to.delta_from(from), dir.delta());
        }
    }

    #[test]
    fn offset_may_leave_the_grid() {
        let edge = Position::new(0, 0);
        assert_eq!(edge.offset(MoveDir::Left.delta()), Position::new(-1, 0));
        assert_eq!(edge.offset(MoveDir::Up.delta()), Position::new(0, -1));
    }
}
