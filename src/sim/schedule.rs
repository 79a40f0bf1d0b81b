/// Time-driven session state: the stopwatch and the deferred advance.
///
/// Nothing here reads the wall clock. The main loop measures each frame
/// and feeds the delta in through `Session::tick`, which keeps every
/// timing rule testable with plain `Duration`s.
///
/// ## Deferred advance
///   - `schedule()` replaces any pending task and hands out a fresh token.
///   - `cancel()` drops the pending task.
///   - `advance(dt)` counts down and yields the task exactly once when due.
/// A token names one scheduling; a fired or cancelled token is never
/// handed out again.

use std::time::Duration;

// ══════════════════════════════════════════════════════════════
// Stopwatch
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Stopwatch {
    elapsed: Duration,
    running: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Stopwatch::default()
    }

    /// Zero and start.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Zero and stop.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = false;
    }

    /// Add `dt` if running. Returns true when the whole-second count changed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }
        let before = self.whole_seconds();
        self.elapsed += dt;
        self.whole_seconds() != before
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn whole_seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }
}

/// `MM:SS`, zero-padded. Minutes are not capped at 59 or 99.
pub fn format_mm_ss(whole_seconds: u64) -> String {
    format!("{:02}:{:02}", whole_seconds / 60, whole_seconds % 60)
}

// ══════════════════════════════════════════════════════════════
// Deferred advance
// ══════════════════════════════════════════════════════════════

/// Identifies one scheduled advance.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AdvanceToken(u64);

/// What happens when the delay after a clear runs out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Advance {
    /// Load this stage index.
    NextLevel(usize),
    /// The final stage was cleared.
    AllCleared,
}

#[derive(Clone, Debug)]
struct Pending {
    token: AdvanceToken,
    action: Advance,
    remaining: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct AdvanceSchedule {
    pending: Option<Pending>,
    next_token: u64,
}

impl AdvanceSchedule {
    pub fn new() -> Self {
        AdvanceSchedule::default()
    }

    /// Schedule `action` after `delay`, replacing any pending one.
    pub fn schedule(&mut self, action: Advance, delay: Duration) -> AdvanceToken {
        let token = AdvanceToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(Pending { token, action, remaining: delay });
        token
    }

    /// Drop the pending advance. Returns its token if there was one.
    pub fn cancel(&mut self) -> Option<AdvanceToken> {
        self.pending.take().map(|p| p.token)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Count down by `dt`; returns the action once it is due.
    pub fn advance(&mut self, dt: Duration) -> Option<Advance> {
        let pending = self.pending.as_mut()?;
        pending.remaining = pending.remaining.saturating_sub(dt);
        if pending.remaining.is_zero() {
            self.pending.take().map(|p| p.action)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn stopwatch_counts_only_while_running() {
        let mut sw = Stopwatch::new();
        assert!(!sw.advance(ms(1500)));
        assert_eq!(sw.whole_seconds(), 0);

        sw.restart();
        assert!(!sw.advance(ms(900)));
        assert!(sw.advance(ms(200)));
        assert_eq!(sw.whole_seconds(), 1);

        sw.stop();
        sw.advance(ms(5000));
        assert_eq!(sw.whole_seconds(), 1);
    }

    #[test]
    fn stopwatch_reset_zeroes_and_stops() {
        let mut sw = Stopwatch::new();
        sw.restart();
        sw.advance(ms(3000));
        sw.reset();
        assert_eq!(sw.whole_seconds(), 0);
        assert!(!sw.is_running());
    }

    #[test]
    fn mm_ss_formatting() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(59), "00:59");
        assert_eq!(format_mm_ss(61), "01:01");
        assert_eq!(format_mm_ss(3600 + 65), "61:05");
        assert_eq!(format_mm_ss(100 * 60), "100:00");
    }

    #[test]
    fn advance_fires_once_when_due() {
        let mut s = AdvanceSchedule::new();
        s.schedule(Advance::NextLevel(1), ms(1000));
        assert_eq!(s.advance(ms(400)), None);
        assert_eq!(s.advance(ms(400)), None);
        assert_eq!(s.advance(ms(400)), Some(Advance::NextLevel(1)));
        assert!(!s.is_pending());
        assert_eq!(s.advance(ms(1000)), None);
    }

    #[test]
    fn zero_delay_fires_on_next_tick() {
        let mut s = AdvanceSchedule::new();
        s.schedule(Advance::AllCleared, Duration::ZERO);
        assert_eq!(s.advance(Duration::ZERO), Some(Advance::AllCleared));
    }

    #[test]
    fn schedule_replaces_pending() {
        let mut s = AdvanceSchedule::new();
        let first = s.schedule(Advance::NextLevel(1), ms(100));
        let second = s.schedule(Advance::NextLevel(2), ms(100));
        assert_ne!(first, second);
        assert_eq!(s.advance(ms(100)), Some(Advance::NextLevel(2)));
        assert_eq!(s.cancel(), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let mut s = AdvanceSchedule::new();
        let token = s.schedule(Advance::NextLevel(3), ms(100));
        assert_eq!(s.cancel(), Some(token));
        assert_eq!(s.cancel(), None);
        assert_eq!(s.advance(ms(1000)), None);
    }
}
