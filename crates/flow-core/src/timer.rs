//! Session countdown timer
//!
//! A fixed-length countdown gating the zen-mode fade: idle until the first
//! keystroke of a session, then ticking down once per elapsed second, then
//! frozen at zero until an explicit reset. The shell drives `tick()` from
//! its event loop.

/// Fixed freewriting session length in seconds (15 minutes).
pub const SESSION_SECONDS: u32 = 900;

/// Countdown phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    /// Terminal display state, remaining frozen at 0
    Expired,
}

/// The countdown state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimer {
    phase: TimerPhase,
    remaining: u32,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            remaining: SESSION_SECONDS,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> TimerPhase {
        self.phase
    }

    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self.phase, TimerPhase::Expired)
    }

    /// Start the countdown on the first content change after a reset.
    ///
    /// Only arms when idle at the full session length; a countdown that was
    /// manually stopped partway is not restarted by further typing.
    pub fn auto_arm(&mut self) -> bool {
        if self.phase == TimerPhase::Idle && self.remaining == SESSION_SECONDS {
            self.phase = TimerPhase::Running;
            true
        } else {
            false
        }
    }

    /// Advance the countdown by one elapsed second.
    pub fn tick(&mut self) {
        if self.phase != TimerPhase::Running {
            return;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.phase = TimerPhase::Expired;
        }
    }

    /// Return to idle at the full session length.
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.remaining = SESSION_SECONDS;
    }
}

/// Render seconds as a `MM:SS` clock.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starts_idle_at_full_length() {
        let timer = SessionTimer::new();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.remaining(), 900);
    }

    #[test]
    fn auto_arm_only_from_full_idle() {
        let mut timer = SessionTimer::new();
        assert!(timer.auto_arm());
        assert_eq!(timer.phase(), TimerPhase::Running);

        // Already running: no-op.
        assert!(!timer.auto_arm());
    }

    #[test]
    fn each_tick_decrements_by_one() {
        let mut timer = SessionTimer::new();
        timer.auto_arm();
        timer.tick();
        timer.tick();
        assert_eq!(timer.remaining(), 898);
    }

    #[test]
    fn ticks_are_ignored_while_idle() {
        let mut timer = SessionTimer::new();
        timer.tick();
        assert_eq!(timer.remaining(), 900);
    }

    #[test]
    fn expires_at_zero_and_freezes() {
        let mut timer = SessionTimer::new();
        timer.auto_arm();
        for _ in 0..900 {
            timer.tick();
        }
        assert_eq!(timer.remaining(), 0);
        assert!(timer.is_expired());

        // Frozen: further ticks and auto-arm change nothing.
        timer.tick();
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.auto_arm());
        assert_eq!(timer.phase(), TimerPhase::Expired);
    }

    #[test]
    fn reset_returns_to_full_idle() {
        let mut timer = SessionTimer::new();
        timer.auto_arm();
        timer.tick();
        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.remaining(), 900);

        // Armable again after reset.
        assert!(timer.auto_arm());
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(900), "15:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }
}
