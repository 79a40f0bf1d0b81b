/// Viewport into the level grid.
///
/// Stages run up to 22×22 cells, and each cell is two terminal columns
/// wide, so small terminals cannot show a whole stage. The camera keeps
/// the player centred and clamps to the level edges; a level smaller
/// than the viewport is centred instead (negative origin = padding).
///
/// `screen(vx, vy) = level(camera.x + vx, camera.y + vy)`

use crate::domain::entity::Position;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Camera {
    /// Level X of the top-left visible cell
    pub x: i32,
    /// Level Y of the top-left visible cell
    pub y: i32,
    /// Number of level columns visible
    pub view_w: usize,
    /// Number of level rows visible
    pub view_h: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera::default()
    }

    /// Snap to `target`, clamped to a `level_w` × `level_h` grid.
    pub fn center_on(&mut self, target: Position, level_w: usize, level_h: usize) {
        if self.view_w == 0 || self.view_h == 0 { return; }
        self.x = center_axis(target.x, level_w, self.view_w);
        self.y = center_axis(target.y, level_h, self.view_h);
    }

    /// Viewport cell showing `pos`, if it is visible.
    #[allow(dead_code)]
    pub fn level_to_view(&self, pos: Position) -> Option<(usize, usize)> {
        let vx = pos.x - self.x;
        let vy = pos.y - self.y;
        if vx < 0 || vy < 0 || vx >= self.view_w as i32 || vy >= self.view_h as i32 {
            return None;
        }
        Some((vx as usize, vy as usize))
    }

    /// Level position under viewport cell (vx, vy). May lie outside the level.
    pub fn view_to_level(&self, vx: usize, vy: usize) -> Position {
        Position::new(self.x + vx as i32, self.y + vy as i32)
    }
}

fn center_axis(target: i32, level_len: usize, view_len: usize) -> i32 {
    let (level_len, view_len) = (level_len as i32, view_len as i32);
    if level_len <= view_len {
        -((view_len - level_len) / 2)
    } else {
        (target - view_len / 2).clamp(0, level_len - view_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(view_w: usize, view_h: usize) -> Camera {
        Camera { view_w, view_h, ..Camera::new() }
    }

    #[test]
    fn small_level_is_centred() {
        let mut c = cam(20, 14);
        c.center_on(Position::new(1, 1), 10, 10);
        assert_eq!((c.x, c.y), (-5, -2));
        assert_eq!(c.level_to_view(Position::new(0, 0)), Some((5, 2)));
    }

    #[test]
    fn large_level_follows_player_and_clamps() {
        let mut c = cam(10, 10);
        c.center_on(Position::new(11, 11), 22, 22);
        assert_eq!((c.x, c.y), (6, 6));

        c.center_on(Position::new(1, 1), 22, 22);
        assert_eq!((c.x, c.y), (0, 0));

        c.center_on(Position::new(21, 20), 22, 22);
        assert_eq!((c.x, c.y), (12, 12));
    }

    #[test]
    fn offscreen_positions_are_hidden() {
        let mut c = cam(10, 10);
        c.center_on(Position::new(11, 11), 22, 22);
        assert_eq!(c.level_to_view(Position::new(5, 11)), None);
        assert_eq!(c.level_to_view(Position::new(6, 15)), Some((0, 9)));
        assert_eq!(c.view_to_level(0, 9), Position::new(6, 15));
    }

    #[test]
    fn zero_viewport_leaves_camera_alone() {
        let mut c = cam(0, 0);
        c.center_on(Position::new(11, 11), 22, 22);
        assert_eq!((c.x, c.y), (0, 0));
    }
}
