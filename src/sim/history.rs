/// Undo history: a bounded stack of level snapshots.
///
/// A snapshot is a full clone of the level taken strictly before a move
/// mutates it. Restoring pops the newest snapshot and hands it back
/// whole, so an undo is an exact inverse of one accepted move.
///
/// Capacity equals the undo budget. Older snapshots are unreachable once
/// the budget is spent, so pushing onto a full stack drops the oldest.

use std::collections::VecDeque;

use crate::domain::level::Level;

#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<Level>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record `level` as it is now.
    pub fn capture(&mut self, level: &Level) {
        if self.capacity == 0 {
            return;
        }
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(level.clone());
    }

    /// Take the most recent snapshot.
    pub fn restore(&mut self) -> Option<Level> {
        self.snapshots.pop_back()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Position;

    fn level_with_player_at(x: i32) -> Level {
        Level::new(8, 1, Position::new(x, 0))
    }

    #[test]
    fn restore_is_last_in_first_out() {
        let mut h = History::new(2);
        h.capture(&level_with_player_at(1));
        h.capture(&level_with_player_at(2));
        assert_eq!(h.restore().map(|l| l.player.x), Some(2));
        assert_eq!(h.restore().map(|l| l.player.x), Some(1));
        assert!(h.restore().is_none());
    }

    #[test]
    fn full_stack_drops_oldest() {
        let mut h = History::new(2);
        for x in 1..=5 {
            h.capture(&level_with_player_at(x));
        }
        assert_eq!(h.len(), 2);
        assert_eq!(h.restore().map(|l| l.player.x), Some(5));
        assert_eq!(h.restore().map(|l| l.player.x), Some(4));
        assert!(h.is_empty());
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut h = History::new(0);
        h.capture(&level_with_player_at(1));
        assert!(h.is_empty());
        assert!(h.restore().is_none());
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut h = History::new(2);
        let mut level = level_with_player_at(1);
        h.capture(&level);
        level.player = Position::new(6, 0);
        assert_eq!(h.restore(), Some(level_with_player_at(1)));
    }

    #[test]
    fn clear_empties() {
        let mut h = History::new(2);
        h.capture(&level_with_player_at(1));
        h.clear();
        assert!(h.is_empty());
    }
}
