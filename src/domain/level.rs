/// Level: one puzzle layout plus its mutable state.
///
/// A level is a plain owned value. Cloning it is the snapshot mechanism
/// (undo history, pristine backups) and `==` is deep equality, so no
/// serialization round-trip is ever needed to copy or compare state.
///
/// ## Text format (XSB)
///   '#' = Wall          ' ' = Floor ('-' and '_' also accepted)
///   '.' = Goal          '$' = Box          '*' = Box on goal
///   '@' = Player        '+' = Player on goal

use std::collections::BTreeSet;
use std::fmt;

use super::entity::Position;
use super::tile::CellKind;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Level {
    pub width: usize,
    pub height: usize,
    pub player: Position,
    /// Ordered, no duplicates. Order carries no meaning for the rules.
    pub boxes: Vec<Position>,
    pub goals: BTreeSet<Position>,
    pub walls: BTreeSet<Position>,
}

// ── Construction ──

impl Level {
    /// Empty `width × height` floor with the player at `player`.
    pub fn new(width: usize, height: usize, player: Position) -> Self {
        Level {
            width,
            height,
            player,
            boxes: vec![],
            goals: BTreeSet::new(),
            walls: BTreeSet::new(),
        }
    }

    /// Wall in the outermost ring of cells.
    pub fn with_border(mut self) -> Self {
        let (w, h) = (self.width as i32, self.height as i32);
        for x in 0..w {
            self.walls.insert(Position::new(x, 0));
            self.walls.insert(Position::new(x, h - 1));
        }
        for y in 1..h - 1 {
            self.walls.insert(Position::new(0, y));
            self.walls.insert(Position::new(w - 1, y));
        }
        self
    }

    pub fn with_walls(mut self, cells: &[(i32, i32)]) -> Self {
        self.walls.extend(cells.iter().map(|&(x, y)| Position::new(x, y)));
        self
    }

    pub fn with_boxes(mut self, cells: &[(i32, i32)]) -> Self {
        for &(x, y) in cells {
            let pos = Position::new(x, y);
            if !self.boxes.contains(&pos) {
                self.boxes.push(pos);
            }
        }
        self
    }

    pub fn with_goals(mut self, cells: &[(i32, i32)]) -> Self {
        self.goals.extend(cells.iter().map(|&(x, y)| Position::new(x, y)));
        self
    }

    /// Parse a single level in XSB format.
    ///
    /// Width is the longest line; shorter lines are padded with floor.
    /// Exactly one player is required.
    pub fn from_text(text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        if lines.is_empty() {
            return Err("empty level".to_string());
        }

        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err("level has no columns".to_string());
        }

        let mut level = Level::new(width, height, Position::default());
        let mut player = None;

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let kind = CellKind::from_xsb_char(ch).ok_or_else(|| {
                    format!("unexpected character {:?} at column {}, row {}", ch, x + 1, y + 1)
                })?;
                if kind == CellKind::Wall {
                    level.walls.insert(pos);
                }
                if kind.has_goal() {
                    level.goals.insert(pos);
                }
                if kind.has_box() {
                    level.boxes.push(pos);
                }
                if kind.has_player() {
                    if player.is_some() {
                        return Err(format!("second player at {}", pos));
                    }
                    player = Some(pos);
                }
            }
        }

        level.player = player.ok_or_else(|| "level has no player".to_string())?;
        Ok(level)
    }
}

// ── Queries ──

impl Level {
    /// Is `pos` inside `[0, width) × [0, height)`?
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    pub fn is_goal(&self, pos: Position) -> bool {
        self.goals.contains(&pos)
    }

    #[inline]
    pub fn has_box(&self, pos: Position) -> bool {
        self.boxes.contains(&pos)
    }

    /// Number of boxes currently resting on a goal.
    pub fn boxes_on_goals(&self) -> usize {
        self.boxes.iter().filter(|b| self.goals.contains(b)).count()
    }

    /// Render category of the cell at `(x, y)`.
    ///
    /// Priority: wall, box-on-goal, player-on-goal, goal, box, player, empty.
    pub fn cell_at(&self, x: usize, y: usize) -> CellKind {
        let pos = Position::new(x as i32, y as i32);
        let is_box = self.has_box(pos);
        let is_goal = self.is_goal(pos);
        let is_player = self.player == pos;

        if self.walls.contains(&pos) {
            CellKind::Wall
        } else if is_box && is_goal {
            CellKind::BoxOnGoal
        } else if is_player && is_goal {
            CellKind::PlayerOnGoal
        } else if is_goal {
            CellKind::Goal
        } else if is_box {
            CellKind::Box
        } else if is_player {
            CellKind::Player
        } else {
            CellKind::Empty
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let row: String = (0..self.width).map(|x| self.cell_at(x, y).xsb_char()).collect();
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}
