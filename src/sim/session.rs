/// Session: the owned state of one play-through.
///
/// ## Level sets
///   - `initial_levels`: the catalog as loaded. **Never mutated.**
///   - `levels`:         working copies, mutated in place by every move.
/// `reset_level` clones one pristine level back over its working copy;
/// `restart_game` clones them all.
///
/// ## Phases
///   Title ──start──▶ Playing(current_level) ──restart──▶ Title
///
/// Clearing a stage schedules the advance to the next one. While that
/// advance is pending, moves and undo are refused so input cannot touch
/// a level that is about to be replaced. Clearing the final stage shows
/// the all-clear message and stays in Playing.
///
/// ## Ordering inside `attempt_move`
///   validate → snapshot into history → apply → redraw → win check
///
/// Every operation is total: refusals come back as `ActionRejected` and
/// leave the session untouched.

use std::time::Duration;

use thiserror::Error;

use crate::config::RulesConfig;
use crate::domain::entity::{Intent, MoveDir};
use crate::domain::level::Level;
use crate::domain::rules::{self, MoveKind, MoveRejected};
use crate::domain::tile::CellKind;
use super::catalog;
use super::event::GameEvent;
use super::history::History;
use super::schedule::{self, Advance, AdvanceSchedule, Stopwatch};

pub const ALL_CLEAR_MESSAGE: &str = "All stages clear! Congratulations!";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum ActionRejected {
    #[error("game has not started")]
    NotPlaying,
    #[error("game already started")]
    AlreadyPlaying,
    #[error("stage transition pending")]
    TransitionPending,
    #[error("nothing to undo")]
    NoHistory,
    #[error("undo budget exhausted")]
    UndoExhausted,
    #[error(transparent)]
    Move(#[from] MoveRejected),
}

pub struct Session {
    // ── Levels ──
    levels: Vec<Level>,
    initial_levels: Vec<Level>,
    current_level: usize,

    // ── Undo ──
    history: History,
    undo_remaining: u32,

    // ── Flow ──
    rules: RulesConfig,
    phase: Phase,
    advance: AdvanceSchedule,
    all_cleared: bool,
    stopwatch: Stopwatch,

    // ── Output to presentation ──
    message: String,
    events: Vec<GameEvent>,
    redraw: bool,
}

// ── Construction ──

impl Session {
    /// Start a session over `levels` (falls back to the built-in stages
    /// when empty).
    pub fn new(levels: Vec<Level>, rules: RulesConfig) -> Self {
        let levels = if levels.is_empty() {
            tracing::warn!("no levels supplied, using built-in stages");
            catalog::builtin_levels()
        } else {
            levels
        };

        Session {
            initial_levels: levels.clone(),
            levels,
            current_level: 0,
            history: History::new(rules.max_undo as usize),
            undo_remaining: rules.max_undo,
            phase: Phase::Title,
            advance: AdvanceSchedule::new(),
            all_cleared: false,
            stopwatch: Stopwatch::new(),
            rules,
            message: String::new(),
            events: vec![],
            redraw: true,
        }
    }
}

// ── Controller operations ──

impl Session {
    /// Dispatch one presentation intent.
    pub fn handle(&mut self, intent: Intent) -> Result<(), ActionRejected> {
        match intent {
            Intent::Start => self.start_game(),
            Intent::Move(dir) => self.attempt_move(dir).map(|_| ()),
            Intent::Undo => self.undo().map(|_| ()),
            Intent::Reset => {
                if self.phase != Phase::Playing {
                    return Err(ActionRejected::NotPlaying);
                }
                self.reset_level();
                Ok(())
            }
            Intent::Restart => {
                self.restart_game();
                Ok(())
            }
        }
    }

    /// Title → Playing at stage 1, stopwatch from zero.
    pub fn start_game(&mut self) -> Result<(), ActionRejected> {
        if self.phase == Phase::Playing {
            return Err(ActionRejected::AlreadyPlaying);
        }
        self.phase = Phase::Playing;
        self.stopwatch.restart();
        tracing::info!(levels = self.levels.len(), "game started");
        self.load_level(0);
        Ok(())
    }

    /// Make `index` the active stage. The working copy is kept as is.
    /// Returns false (and changes nothing) for an out-of-range index.
    pub fn load_level(&mut self, index: usize) -> bool {
        if index >= self.levels.len() {
            tracing::warn!(index, count = self.levels.len(), "ignoring load of unknown level");
            return false;
        }
        self.current_level = index;
        self.begin_attempt();
        tracing::info!(stage = index + 1, "level loaded");
        self.events.push(GameEvent::LevelLoaded { index });
        true
    }

    /// Restore the active stage from its pristine copy.
    /// Other stages and the stopwatch are untouched.
    pub fn reset_level(&mut self) {
        let index = self.current_level;
        self.levels[index] = self.initial_levels[index].clone();
        self.begin_attempt();
        tracing::info!(stage = index + 1, "level reset");
        self.events.push(GameEvent::LevelReset { index });
    }

    /// Restore every stage, return to stage 1 and the title screen.
    pub fn restart_game(&mut self) {
        self.levels = self.initial_levels.clone();
        self.current_level = 0;
        self.begin_attempt();
        self.stopwatch.reset();
        self.phase = Phase::Title;
        tracing::info!("game restarted");
        self.events.push(GameEvent::GameRestarted);
    }

    /// Step the player one cell in `dir`, pushing a box if one is there.
    pub fn attempt_move(&mut self, dir: MoveDir) -> Result<MoveKind, ActionRejected> {
        if self.phase != Phase::Playing {
            return Err(ActionRejected::NotPlaying);
        }
        if self.advance.is_pending() {
            return Err(ActionRejected::TransitionPending);
        }

        let level = &self.levels[self.current_level];
        let target = level.player.offset(dir.delta());
        let kind = match rules::check_move(level, target) {
            Ok(kind) => kind,
            Err(rejected) => {
                self.events.push(GameEvent::MoveBlocked(rejected));
                return Err(rejected.into());
            }
        };

        // Snapshot strictly before mutation.
        self.history.capture(&self.levels[self.current_level]);
        let level = &mut self.levels[self.current_level];
        rules::apply_move(level, target);
        self.redraw = true;

        self.events.push(GameEvent::PlayerMoved { to: target });
        if let MoveKind::Push { box_index } = kind {
            let to = level.boxes[box_index];
            let on_goal = level.is_goal(to);
            self.events.push(GameEvent::BoxPushed { box_index, to, on_goal });
        }

        // Win check strictly after mutation. Once every stage is cleared
        // the final stage stays open and never re-announces.
        if !self.all_cleared && rules::check_win(&self.levels[self.current_level]) {
            self.on_win();
        }
        Ok(kind)
    }

    /// Roll the active stage back one accepted move.
    /// Returns the undo budget left afterwards.
    pub fn undo(&mut self) -> Result<u32, ActionRejected> {
        if self.advance.is_pending() {
            return Err(ActionRejected::TransitionPending);
        }
        if self.undo_remaining == 0 {
            return Err(ActionRejected::UndoExhausted);
        }
        let snapshot = self.history.restore().ok_or(ActionRejected::NoHistory)?;

        self.levels[self.current_level] = snapshot;
        self.undo_remaining -= 1;
        self.redraw = true;
        self.events.push(GameEvent::Undone { remaining: self.undo_remaining });
        Ok(self.undo_remaining)
    }

    /// Announce the clear and schedule what comes next.
    fn on_win(&mut self) {
        let stage = self.stage_number();
        let boxes = self.level().boxes.len();
        let is_last = self.current_level + 1 >= self.levels.len();

        tracing::info!(stage, boxes, elapsed = %self.elapsed_text(), "stage cleared");
        self.events.push(GameEvent::StageCleared { stage });

        let action = if is_last {
            self.message = ALL_CLEAR_MESSAGE.to_string();
            Advance::AllCleared
        } else {
            self.message = clear_message(stage, boxes);
            Advance::NextLevel(self.current_level + 1)
        };
        self.advance.schedule(action, self.rules.next_level_delay);
        self.redraw = true;
    }

    /// Drop a scheduled stage advance. Returns whether one was pending.
    #[allow(dead_code)]
    pub fn cancel_pending_advance(&mut self) -> bool {
        match self.advance.cancel() {
            Some(_) => {
                tracing::debug!(stage = self.stage_number(), "pending advance cancelled");
                self.events.push(GameEvent::AdvanceCancelled);
                true
            }
            None => false,
        }
    }

    /// Advance session time by `dt`: stopwatch and deferred advance.
    pub fn tick(&mut self, dt: Duration) {
        if self.stopwatch.advance(dt) {
            self.redraw = true;
        }

        match self.advance.advance(dt) {
            Some(Advance::NextLevel(index)) => {
                // `index` is the 0-based next stage, i.e. the 1-based stage just left.
                if self.rules.timer_stop_after_stage == Some(index) {
                    self.stop_timer();
                }
                self.load_level(index);
            }
            Some(Advance::AllCleared) => {
                self.all_cleared = true;
                self.message = ALL_CLEAR_MESSAGE.to_string();
                self.stop_timer();
                self.redraw = true;
                tracing::info!(elapsed = %self.elapsed_text(), "all stages cleared");
                self.events.push(GameEvent::AllStagesCleared);
            }
            None => {}
        }
    }

    /// Shared by load / reset / restart: fresh history and budget,
    /// no message, nothing pending.
    fn begin_attempt(&mut self) {
        self.history.clear();
        self.undo_remaining = self.rules.max_undo;
        self.message.clear();
        self.advance.cancel();
        self.all_cleared = false;
        self.redraw = true;
    }

    fn stop_timer(&mut self) {
        if self.stopwatch.is_running() {
            self.stopwatch.stop();
            self.events.push(GameEvent::TimerStopped);
        }
    }
}

fn clear_message(stage: usize, boxes: usize) -> String {
    match boxes {
        1 => format!("Stage {} clear! The box is on its goal.", stage),
        n => format!("Stage {} clear! All {} boxes are on goals.", stage, n),
    }
}

// ── Render contract ──

impl Session {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Active stage, working copy.
    pub fn level(&self) -> &Level {
        &self.levels[self.current_level]
    }

    #[allow(dead_code)]
    pub fn pristine_level(&self, index: usize) -> Option<&Level> {
        self.initial_levels.get(index)
    }

    #[allow(dead_code)]
    pub fn level_index(&self) -> usize {
        self.current_level
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// 1-based.
    pub fn stage_number(&self) -> usize {
        self.current_level + 1
    }

    pub fn dimensions(&self) -> (usize, usize) {
        let level = self.level();
        (level.width, level.height)
    }

    pub fn cell_at(&self, x: usize, y: usize) -> CellKind {
        self.level().cell_at(x, y)
    }

    pub fn undo_remaining(&self) -> u32 {
        self.undo_remaining
    }

    #[allow(dead_code)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Empty when no message is showing.
    pub fn message(&self) -> &str {
        &self.message
    }

    #[allow(dead_code)]
    pub fn elapsed_seconds(&self) -> u64 {
        self.stopwatch.whole_seconds()
    }

    pub fn elapsed_text(&self) -> String {
        schedule::format_mm_ss(self.stopwatch.whole_seconds())
    }

    #[allow(dead_code)]
    pub fn is_timer_running(&self) -> bool {
        self.stopwatch.is_running()
    }

    #[allow(dead_code)]
    pub fn is_advance_pending(&self) -> bool {
        self.advance.is_pending()
    }

    pub fn all_cleared(&self) -> bool {
        self.all_cleared
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True once after any change that needs a redraw.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
