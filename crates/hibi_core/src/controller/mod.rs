//! User-action orchestration.
//!
//! # Responsibility
//! - Validate input before it reaches the store.
//! - Drive the mutate, save, render cycle.
//! - Host the timer state machine for timer-style apps.

pub mod app;
pub mod input;
pub mod timer;

pub use app::{Controller, Outcome, ViewPrefs, DEFAULT_RESET_DELAY_MS, TIMER_CATEGORY};
pub use input::InputError;
pub use timer::{ScheduledReset, Timer, TimerAction, TimerError, TimerPhase, TimerRun};
