/// Events emitted by session operations.
/// The presentation layer consumes these for sound and status text.

use crate::domain::entity::Position;
use crate::domain::rules::MoveRejected;

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    LevelLoaded { index: usize },
    LevelReset { index: usize },
    GameRestarted,
    PlayerMoved { to: Position },
    BoxPushed { box_index: usize, to: Position, on_goal: bool },
    MoveBlocked(MoveRejected),
    Undone { remaining: u32 },
    StageCleared { stage: usize },
    AllStagesCleared,
    AdvanceCancelled,
    TimerStopped,
}
