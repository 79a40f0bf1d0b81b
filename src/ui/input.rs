/// Keyboard input.
///
/// Every action in the game is discrete: one key press, one intent.
/// Held keys are not tracked; the terminal's own auto-repeat arrives as
/// `Repeat` events and is treated like a fresh press so holding an arrow
/// keeps walking.
///
/// Key map:
///   Arrows / WASD         →  Move
///   U / Z / Backspace     →  Undo
///   R                     →  Reset level
///   Enter / Space         →  Start
///   Esc                   →  Restart (back to title)
///   Q (title), Ctrl+C     →  Quit (handled by the main loop)

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{Intent, MoveDir};

pub struct InputState {
    /// Press/Repeat key events collected during the last drain.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the session tick.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.raw_events.push(key);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "terminal event read failed");
                    break;
                }
            }
        }
    }

    /// Intents for this frame's key presses, in arrival order.
    pub fn intents(&self) -> Vec<Intent> {
        self.raw_events.iter().filter_map(intent_for_key).collect()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(is_ctrl_c)
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Translate one key event. Keys with Ctrl/Alt held map to nothing.
pub fn intent_for_key(key: &KeyEvent) -> Option<Intent> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    let intent = match key.code {
        KeyCode::Up => Intent::Move(MoveDir::Up),
        KeyCode::Down => Intent::Move(MoveDir::Down),
        KeyCode::Left => Intent::Move(MoveDir::Left),
        KeyCode::Right => Intent::Move(MoveDir::Right),
        KeyCode::Backspace => Intent::Undo,
        KeyCode::Enter => Intent::Start,
        KeyCode::Esc => Intent::Restart,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Intent::Move(MoveDir::Up),
            's' => Intent::Move(MoveDir::Down),
            'a' => Intent::Move(MoveDir::Left),
            'd' => Intent::Move(MoveDir::Right),
            'u' | 'z' => Intent::Undo,
            'r' => Intent::Reset,
            ' ' => Intent::Start,
            _ => return None,
        },
        _ => return None,
    };
    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_move() {
        assert_eq!(intent_for_key(&key(KeyCode::Up)), Some(Intent::Move(MoveDir::Up)));
        assert_eq!(intent_for_key(&key(KeyCode::Char('a'))), Some(Intent::Move(MoveDir::Left)));
        assert_eq!(intent_for_key(&key(KeyCode::Char('D'))), Some(Intent::Move(MoveDir::Right)));
        assert_eq!(intent_for_key(&key(KeyCode::Char('s'))), Some(Intent::Move(MoveDir::Down)));
    }

    #[test]
    fn command_keys() {
        assert_eq!(intent_for_key(&key(KeyCode::Char('u'))), Some(Intent::Undo));
        assert_eq!(intent_for_key(&key(KeyCode::Char('z'))), Some(Intent::Undo));
        assert_eq!(intent_for_key(&key(KeyCode::Backspace)), Some(Intent::Undo));
        assert_eq!(intent_for_key(&key(KeyCode::Char('r'))), Some(Intent::Reset));
        assert_eq!(intent_for_key(&key(KeyCode::Enter)), Some(Intent::Start));
        assert_eq!(intent_for_key(&key(KeyCode::Char(' '))), Some(Intent::Start));
        assert_eq!(intent_for_key(&key(KeyCode::Esc)), Some(Intent::Restart));
    }

    #[test]
    fn unmapped_and_modified_keys_are_ignored() {
        assert_eq!(intent_for_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(intent_for_key(&key(KeyCode::Tab)), None);
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(intent_for_key(&ctrl_r), None);
    }

    #[test]
    fn ctrl_c_detected() {
        let mut input = InputState::new();
        input.raw_events.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
        assert!(input.intents().is_empty());
    }

    #[test]
    fn intents_keep_arrival_order() {
        let mut input = InputState::new();
        input.raw_events.push(key(KeyCode::Right));
        input.raw_events.push(key(KeyCode::Char('u')));
        input.raw_events.push(key(KeyCode::Down));
        assert_eq!(
            input.intents(),
            vec![Intent::Move(MoveDir::Right), Intent::Undo, Intent::Move(MoveDir::Down)],
        );
    }
}
