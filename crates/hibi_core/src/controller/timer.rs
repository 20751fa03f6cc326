//! Timer state machine and one-shot scheduled reset.
//!
//! # Invariants
//! - Phases move `Idle -> Running <-> Paused -> Completed -> Idle` only.
//! - A rejected press leaves the state untouched.
//! - Elapsed time counts running time only; paused spans are excluded.
//! - Nothing here is persisted; a reload always starts from `Idle`.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

impl Display for TimerPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Button presses accepted by the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
    Finish,
    Acknowledge,
}

impl Display for TimerAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Finish => "finish",
            Self::Acknowledge => "acknowledge",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    InvalidTransition {
        from: TimerPhase,
        action: TimerAction,
    },
}

impl Display for TimerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, action } => {
                write!(f, "timer cannot {action} while {from}")
            }
        }
    }
}

impl Error for TimerError {}

/// Wall-clock record of one completed timer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRun {
    pub started_at: i64,
    pub stopped_at: i64,
    /// Running time, excluding pauses.
    pub elapsed_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running {
        started_at: i64,
        resumed_at: i64,
        banked_ms: i64,
    },
    Paused {
        started_at: i64,
        banked_ms: i64,
    },
    Completed(TimerRun),
}

/// Stopwatch, or countdown when started with a target.
#[derive(Debug, Clone)]
pub struct Timer {
    state: TimerState,
    target_ms: Option<i64>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            target_ms: None,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        match self.state {
            TimerState::Idle => TimerPhase::Idle,
            TimerState::Running { .. } => TimerPhase::Running,
            TimerState::Paused { .. } => TimerPhase::Paused,
            TimerState::Completed(_) => TimerPhase::Completed,
        }
    }

    pub fn target_ms(&self) -> Option<i64> {
        self.target_ms
    }

    /// The finished run while `Completed`.
    pub fn completed_run(&self) -> Option<TimerRun> {
        match self.state {
            TimerState::Completed(run) => Some(run),
            _ => None,
        }
    }

    pub fn elapsed_ms(&self, now: i64) -> i64 {
        match self.state {
            TimerState::Idle => 0,
            TimerState::Running {
                resumed_at,
                banked_ms,
                ..
            } => banked_ms + (now - resumed_at).max(0),
            TimerState::Paused { banked_ms, .. } => banked_ms,
            TimerState::Completed(run) => run.elapsed_ms,
        }
    }

    /// Countdown time left; `None` for a stopwatch.
    pub fn remaining_ms(&self, now: i64) -> Option<i64> {
        self.target_ms
            .map(|target| (target - self.elapsed_ms(now)).max(0))
    }

    /// `target_ms` of `None` runs as a stopwatch until `finish`.
    pub fn start(&mut self, now: i64, target_ms: Option<i64>) -> Result<(), TimerError> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running {
                    started_at: now,
                    resumed_at: now,
                    banked_ms: 0,
                };
                self.target_ms = target_ms.filter(|target| *target > 0);
                Ok(())
            }
            _ => Err(self.reject(TimerAction::Start)),
        }
    }

    pub fn pause(&mut self, now: i64) -> Result<(), TimerError> {
        match self.state {
            TimerState::Running { started_at, .. } => {
                self.state = TimerState::Paused {
                    started_at,
                    banked_ms: self.elapsed_ms(now),
                };
                Ok(())
            }
            _ => Err(self.reject(TimerAction::Pause)),
        }
    }

    pub fn resume(&mut self, now: i64) -> Result<(), TimerError> {
        match self.state {
            TimerState::Paused {
                started_at,
                banked_ms,
            } => {
                self.state = TimerState::Running {
                    started_at,
                    resumed_at: now,
                    banked_ms,
                };
                Ok(())
            }
            _ => Err(self.reject(TimerAction::Resume)),
        }
    }

    /// Ends the run early (or a stopwatch run) from `Running` or `Paused`.
    pub fn finish(&mut self, now: i64) -> Result<TimerRun, TimerError> {
        match self.state {
            TimerState::Running { started_at, .. } | TimerState::Paused { started_at, .. } => {
                let run = TimerRun {
                    started_at,
                    stopped_at: now.max(started_at),
                    elapsed_ms: self.elapsed_ms(now),
                };
                self.state = TimerState::Completed(run);
                Ok(run)
            }
            _ => Err(self.reject(TimerAction::Finish)),
        }
    }

    pub fn acknowledge(&mut self) -> Result<(), TimerError> {
        match self.state {
            TimerState::Completed(_) => {
                self.state = TimerState::Idle;
                self.target_ms = None;
                Ok(())
            }
            _ => Err(self.reject(TimerAction::Acknowledge)),
        }
    }

    /// Completes a running countdown whose target has elapsed.
    ///
    /// Returns the run exactly once, at the poll that observes completion.
    /// The stop time is the instant the target was reached, not `now`.
    pub fn poll(&mut self, now: i64) -> Option<TimerRun> {
        let (
            TimerState::Running {
                started_at,
                resumed_at,
                banked_ms,
            },
            Some(target),
        ) = (self.state, self.target_ms)
        else {
            return None;
        };
        if self.elapsed_ms(now) < target {
            return None;
        }

        let run = TimerRun {
            started_at,
            stopped_at: resumed_at + (target - banked_ms),
            elapsed_ms: target,
        };
        self.state = TimerState::Completed(run);
        Some(run)
    }

    fn reject(&self, action: TimerAction) -> TimerError {
        TimerError::InvalidTransition {
            from: self.phase(),
            action,
        }
    }
}

/// Single scheduled deadline: fires once on `poll`, or is cleared by `cancel`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduledReset {
    due_at: Option<i64>,
}

impl ScheduledReset {
    /// Replaces any pending deadline.
    pub fn schedule(&mut self, now: i64, delay_ms: i64) {
        self.due_at = Some(now + delay_ms.max(0));
    }

    /// Returns whether a pending deadline was cleared.
    pub fn cancel(&mut self) -> bool {
        self.due_at.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<i64> {
        self.due_at
    }

    pub fn poll(&mut self, now: i64) -> bool {
        match self.due_at {
            Some(due_at) if now >= due_at => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScheduledReset, Timer, TimerAction, TimerError, TimerPhase, TimerRun};

    #[test]
    fn full_cycle_with_pause_excludes_paused_time() {
        let mut timer = Timer::new();
        timer.start(0, None).expect("start");
        timer.pause(1_000).expect("pause");
        assert_eq!(timer.elapsed_ms(50_000), 1_000);

        timer.resume(10_000).expect("resume");
        let run = timer.finish(12_000).expect("finish");
        assert_eq!(
            run,
            TimerRun {
                started_at: 0,
                stopped_at: 12_000,
                elapsed_ms: 3_000
            }
        );
        assert_eq!(timer.phase(), TimerPhase::Completed);

        timer.acknowledge().expect("acknowledge");
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn invalid_press_is_rejected_without_state_change() {
        let mut timer = Timer::new();
        assert_eq!(
            timer.pause(0),
            Err(TimerError::InvalidTransition {
                from: TimerPhase::Idle,
                action: TimerAction::Pause
            })
        );
        assert_eq!(timer.phase(), TimerPhase::Idle);

        timer.start(0, None).expect("start");
        assert!(timer.start(1, None).is_err());
        assert!(timer.acknowledge().is_err());
        assert_eq!(timer.phase(), TimerPhase::Running);
    }

    #[test]
    fn countdown_completes_once_at_target() {
        let mut timer = Timer::new();
        timer.start(1_000, Some(180_000)).expect("start");
        assert_eq!(timer.poll(100_000), None);
        assert_eq!(timer.remaining_ms(100_000), Some(81_000));

        let run = timer.poll(500_000).expect("completes");
        assert_eq!(run.stopped_at, 181_000);
        assert_eq!(run.elapsed_ms, 180_000);
        assert_eq!(timer.poll(600_000), None);
        assert_eq!(timer.remaining_ms(600_000), Some(0));
    }

    #[test]
    fn paused_countdown_does_not_complete() {
        let mut timer = Timer::new();
        timer.start(0, Some(10_000)).expect("start");
        timer.pause(5_000).expect("pause");
        assert_eq!(timer.poll(60_000), None);

        timer.resume(60_000).expect("resume");
        let run = timer.poll(66_000).expect("completes");
        assert_eq!(run.stopped_at, 65_000);
    }

    #[test]
    fn scheduled_reset_fires_once_or_cancels() {
        let mut reset = ScheduledReset::default();
        reset.schedule(0, 180_000);
        assert!(!reset.poll(179_999));
        assert!(reset.poll(180_000));
        assert!(!reset.poll(400_000));

        reset.schedule(0, 10);
        assert!(reset.cancel());
        assert!(!reset.poll(100));
        assert!(!reset.cancel());
    }
}
