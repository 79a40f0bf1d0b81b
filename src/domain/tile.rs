/// Cell categories exposed to the presentation layer.
/// Each cell of a level resolves to exactly one category; the
/// priority order lives in `Level::cell_at`, the glyphs live here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Empty,
    Wall,
    Goal,
    Box,
    BoxOnGoal,
    Player,
    PlayerOnGoal,
}

impl CellKind {
    /// Is there a goal under whatever occupies this cell?
    pub fn has_goal(self) -> bool {
        matches!(self, CellKind::Goal | CellKind::BoxOnGoal | CellKind::PlayerOnGoal)
    }

    pub fn has_box(self) -> bool {
        matches!(self, CellKind::Box | CellKind::BoxOnGoal)
    }

    pub fn has_player(self) -> bool {
        matches!(self, CellKind::Player | CellKind::PlayerOnGoal)
    }

    /// XSB character for this cell (`#`, `.`, `$`, `*`, `@`, `+`, space).
    pub fn xsb_char(self) -> char {
        match self {
            CellKind::Empty => ' ',
            CellKind::Wall => '#',
            CellKind::Goal => '.',
            CellKind::Box => '$',
            CellKind::BoxOnGoal => '*',
            CellKind::Player => '@',
            CellKind::PlayerOnGoal => '+',
        }
    }

    /// Inverse of `xsb_char`. `-` and `_` are accepted as floor.
    pub fn from_xsb_char(ch: char) -> Option<CellKind> {
        match ch {
            ' ' | '-' | '_' => Some(CellKind::Empty),
            '#' => Some(CellKind::Wall),
            '.' => Some(CellKind::Goal),
            '$' => Some(CellKind::Box),
            '*' => Some(CellKind::BoxOnGoal),
            '@' => Some(CellKind::Player),
            '+' => Some(CellKind::PlayerOnGoal),
            _ => None,
        }
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Empty
    }
}
