/// Movement and push rules.
///
/// Pure functions over a `Level`. Queries never mutate; `apply_move`
/// mutates but never validates. Callers pair them:
/// `check_move` (or `is_valid_move`) first, then `apply_move`.
///
/// ## Move table
/// ┌───────────────────────────────────┬──────────┬────────────────┐
/// │ Target cell                       │ Result   │ Notes          │
/// ├───────────────────────────────────┼──────────┼────────────────┤
/// │ outside the grid                  │ DENY     │ OutOfBounds    │
/// │ wall                              │ DENY     │ WallAhead      │
/// │ box, box destination off grid     │ DENY     │ OutOfBounds    │
/// │ box, box destination wall         │ DENY     │ Blocked        │
/// │ box, box destination another box  │ DENY     │ Blocked        │
/// │ box, box destination free         │ PUSH     │ one box only   │
/// │ floor or goal                     │ WALK     │                │
/// └───────────────────────────────────┴──────────┴────────────────┘
///
/// The push vector is always `target - player`, so a single displacement
/// moves both the player and the pushed box.

use thiserror::Error;

use super::entity::Position;
use super::level::Level;

/// What an accepted move does.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveKind {
    Walk,
    Push { box_index: usize },
}

/// Why a move was refused. Refusals never change the level.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum MoveRejected {
    #[error("target is outside the level")]
    OutOfBounds,
    #[error("wall ahead")]
    WallAhead,
    #[error("box cannot be pushed")]
    Blocked,
}

#[inline]
pub fn is_wall(level: &Level, pos: Position) -> bool {
    level.walls.contains(&pos)
}

/// Index of the box at `pos`, scanning `level.boxes` in order.
pub fn box_index_at(level: &Level, pos: Position) -> Option<usize> {
    level.boxes.iter().position(|&b| b == pos)
}

/// Can box `box_index` move one `push` step? The destination must be
/// inside the grid, not a wall, and not holding another box.
/// An unknown `box_index` cannot be pushed.
#[allow(dead_code)]
pub fn can_push_box(level: &Level, box_index: usize, push: (i32, i32)) -> bool {
    push_destination(level, box_index, push).is_ok()
}

fn push_destination(level: &Level, box_index: usize, push: (i32, i32)) -> Result<Position, MoveRejected> {
    let dest = match level.boxes.get(box_index) {
        Some(b) => b.offset(push),
        None => return Err(MoveRejected::Blocked),
    };
    if !level.contains(dest) {
        return Err(MoveRejected::OutOfBounds);
    }
    if is_wall(level, dest) || level.has_box(dest) {
        return Err(MoveRejected::Blocked);
    }
    Ok(dest)
}

/// Classify a player move to `target`.
pub fn check_move(level: &Level, target: Position) -> Result<MoveKind, MoveRejected> {
    if !level.contains(target) {
        return Err(MoveRejected::OutOfBounds);
    }
    if is_wall(level, target) {
        return Err(MoveRejected::WallAhead);
    }
    match box_index_at(level, target) {
        Some(box_index) => {
            let push = target.delta_from(level.player);
            push_destination(level, box_index, push)?;
            Ok(MoveKind::Push { box_index })
        }
        None => Ok(MoveKind::Walk),
    }
}

#[inline]
#[allow(dead_code)]
pub fn is_valid_move(level: &Level, target: Position) -> bool {
    check_move(level, target).is_ok()
}

/// Move the player to `target`, pushing the box there (if any) by the
/// same displacement. Returns the index of the pushed box.
///
/// No validation: `target` must already have passed `check_move`.
pub fn apply_move(level: &mut Level, target: Position) -> Option<usize> {
    let delta = target.delta_from(level.player);
    let pushed = box_index_at(level, target);
    if let Some(i) = pushed {
        level.boxes[i] = level.boxes[i].offset(delta);
    }
    level.player = target;
    pushed
}

/// Every box rests on a goal. Spare empty goals don't matter.
pub fn check_win(level: &Level) -> bool {
    level.boxes.iter().all(|b| level.goals.contains(b))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::MoveDir;

    fn level(rows: &[&str]) -> Level {
        Level::from_text(&rows.join("\n")).unwrap()
    }

    fn step(l: &Level, dir: MoveDir) -> Position {
        l.player.offset(dir.delta())
    }

    /// Validate then apply, the way the session does.
    fn try_move(l: &mut Level, dir: MoveDir) -> Result<MoveKind, MoveRejected> {
        let target = step(l, dir);
        let kind = check_move(l, target)?;
        apply_move(l, target);
        Ok(kind)
    }

    // ── Queries ──

    #[test]
    fn wall_lookup() {
        let l = level(&["#@ #"]);
        assert!(is_wall(&l, Position::new(0, 0)));
        assert!(!is_wall(&l, Position::new(2, 0)));
    }

    #[test]
    fn box_index_scans_in_order() {
        let l = level(&["@$ $"]);
        assert_eq!(box_index_at(&l, Position::new(1, 0)), Some(0));
        assert_eq!(box_index_at(&l, Position::new(3, 0)), Some(1));
        assert_eq!(box_index_at(&l, Position::new(2, 0)), None);
    }

    // ── Walking ──

    #[test]
    fn walk_onto_floor() {
        let mut l = level(&["#@ #"]);
        assert_eq!(try_move(&mut l, MoveDir::Right), Ok(MoveKind::Walk));
        assert_eq!(l.player, Position::new(2, 0));
    }

    #[test]
    fn walk_onto_goal() {
        let mut l = level(&["#@.#"]);
        assert_eq!(try_move(&mut l, MoveDir::Right), Ok(MoveKind::Walk));
        assert_eq!(l.player, Position::new(2, 0));
    }

    #[test]
    fn wall_blocks_player() {
        let mut l = level(&["#@#"]);
        let before = l.clone();
        assert_eq!(try_move(&mut l, MoveDir::Right), Err(MoveRejected::WallAhead));
        assert_eq!(l, before);
    }

    #[test]
    fn grid_edge_blocks_player() {
        let mut l = level(&["@ "]);
        assert_eq!(try_move(&mut l, MoveDir::Left), Err(MoveRejected::OutOfBounds));
        assert_eq!(try_move(&mut l, MoveDir::Up), Err(MoveRejected::OutOfBounds));
        assert_eq!(l.player, Position::new(0, 0));
    }

    // ── Pushing ──

    #[test]
    fn push_moves_box_by_same_delta() {
        let mut l = level(&[
            "#####",
            "#@$ #",
            "#####",
        ]);
        assert_eq!(try_move(&mut l, MoveDir::Right), Ok(MoveKind::Push { box_index: 0 }));
        assert_eq!(l.player, Position::new(2, 1));
        assert_eq!(l.boxes, vec![Position::new(3, 1)]);
    }

    #[test]
    fn push_vertically() {
        let mut l = level(&[
            "###",
            "#@#",
            "#$#",
            "# #",
            "###",
        ]);
        assert!(try_move(&mut l, MoveDir::Down).is_ok());
        assert_eq!(l.boxes, vec![Position::new(1, 3)]);
        assert_eq!(try_move(&mut l, MoveDir::Down), Err(MoveRejected::Blocked));
    }

    #[test]
    fn box_against_wall_is_blocked() {
        let mut l = level(&["#@$#"]);
        let before = l.clone();
        assert!(!can_push_box(&l, 0, MoveDir::Right.delta()));
        assert_eq!(try_move(&mut l, MoveDir::Right), Err(MoveRejected::Blocked));
        assert_eq!(l, before);
    }

    #[test]
    fn two_boxes_in_a_row_are_blocked() {
        let mut l = level(&["#@$$ #"]);
        let before = l.clone();
        assert!(!is_valid_move(&l, step(&l, MoveDir::Right)));
        assert_eq!(try_move(&mut l, MoveDir::Right), Err(MoveRejected::Blocked));
        assert_eq!(l, before);
    }

    #[test]
    fn box_at_grid_edge_is_out_of_bounds() {
        let l = level(&["@$"]);
        assert_eq!(check_move(&l, Position::new(1, 0)), Err(MoveRejected::OutOfBounds));
    }

    #[test]
    fn can_push_box_checks_destination_only() {
        let l = level(&[
            "#####",
            "# $ #",
            "#@  #",
            "#####",
        ]);
        // box at (2,1); any free neighbour is a legal destination
        assert!(can_push_box(&l, 0, MoveDir::Right.delta()));
        assert!(can_push_box(&l, 0, MoveDir::Down.delta()));
        assert!(!can_push_box(&l, 0, MoveDir::Up.delta()));
    }

    #[test]
    fn unknown_box_index_cannot_be_pushed() {
        let l = level(&["#@$ #"]);
        assert!(!can_push_box(&l, 5, (1, 0)));
        assert!(!can_push_box(&l, 1, MoveDir::Right.delta()));
        assert!(can_push_box(&l, 0, MoveDir::Right.delta()));
    }

    #[test]
    fn push_onto_goal() {
        let mut l = level(&["#@$.#"]);
        assert!(try_move(&mut l, MoveDir::Right).is_ok());
        assert_eq!(l.boxes_on_goals(), 1);
        assert!(check_win(&l));
    }

    #[test]
    fn apply_move_reports_pushed_box() {
        let mut l = level(&["#@ $ #"]);
        assert_eq!(apply_move(&mut l, Position::new(2, 0)), None);
        assert_eq!(apply_move(&mut l, Position::new(3, 0)), Some(0));
        assert_eq!(l.boxes[0], Position::new(4, 0));
    }

    // ── Win ──

    #[test]
    fn win_requires_every_box_on_goal() {
        let l = level(&["#@*$.#"]);
        assert!(!check_win(&l));
        let l = level(&["#@**#"]);
        assert!(check_win(&l));
    }

    #[test]
    fn spare_goals_do_not_block_win() {
        let l = level(&["#@*..#"]);
        assert!(check_win(&l));
    }

    #[test]
    fn win_ignores_box_order() {
        let mut l = level(&["#@*$.#"]);
        l.boxes.reverse();
        assert!(!check_win(&l));
        l.boxes = vec![Position::new(4, 0), Position::new(2, 0)];
        assert!(check_win(&l));
    }

    // ── Invariants over a walk ──

    #[test]
    fn boxes_never_overlap_or_enter_walls() {
        let mut l = level(&[
            "#######",
            "#     #",
            "# $$$ #",
            "#  @  #",
            "#######",
        ]);
        let script = [
            MoveDir::Up, MoveDir::Up, MoveDir::Left, MoveDir::Up, MoveDir::Right,
            MoveDir::Right, MoveDir::Down, MoveDir::Left, MoveDir::Left, MoveDir::Up,
            MoveDir::Right, MoveDir::Down, MoveDir::Down, MoveDir::Left, MoveDir::Up,
        ];
        for dir in script {
            let target = step(&l, dir);
            if try_move(&mut l, dir).is_ok() {
                assert_eq!(l.player, target);
            }
            for (i, b) in l.boxes.iter().enumerate() {
                assert!(!is_wall(&l, *b), "box {i} in wall at {b}");
                assert!(l.contains(*b));
                assert_eq!(box_index_at(&l, *b), Some(i), "boxes overlap at {b}");
            }
            assert!(!is_wall(&l, l.player));
        }
    }
}
