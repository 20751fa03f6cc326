//! Core of the Hibi habit and mood trackers.
//! One load, mutate, save, render cycle shared by every tracker app.

pub mod clock;
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigError, InsertPosition};
pub use controller::{
    Controller, InputError, Outcome, ScheduledReset, Timer, TimerError, TimerPhase, TimerRun,
    ViewPrefs,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Entry, EntryFields, EntryFlag, EntryId, EntryPatch, EntryValidationError};
pub use model::id::{IdGenerator, SequentialIds, UuidIds};
pub use render::{escape_html, format_date, format_duration, Filter, Renderer, SortOrder, ViewState};
pub use storage::{KvError, KvStore, MemoryKv, PersistenceAdapter, SqliteKv, StorageKey};
pub use store::{AddError, Store};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
