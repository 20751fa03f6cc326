//! App controller: validate, mutate, save, render.
//!
//! # Responsibility
//! - Own one app's store, persistence adapter, renderer, and UI state.
//! - Run every user action through the same synchronous cycle.
//!
//! # Invariants
//! - Rejected input never reaches the store and never triggers a save.
//! - Every applied mutation is followed by exactly one save and one render.
//! - `view()` always reflects the latest state.

use super::input::{normalize_category, validate_text, validate_window, InputError};
use super::timer::{ScheduledReset, Timer, TimerError, TimerPhase, TimerRun};
use crate::clock::Clock;
use crate::config::{AppConfig, ConfigError};
use crate::model::entry::{
    Entry, EntryFields, EntryFlag, EntryId, EntryPatch, EntryValidationError,
};
use crate::model::id::IdGenerator;
use crate::render::view::{Filter, Renderer, ViewState};
use crate::storage::adapter::PersistenceAdapter;
use crate::storage::key::StorageKey;
use crate::storage::kv::KvStore;
use crate::store::{AddError, Store};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Delay before a completed timer returns to idle on its own.
pub const DEFAULT_RESET_DELAY_MS: i64 = 3 * 60 * 1000;
const DEFAULT_TIMER_LABEL: &str = "タイマー";
pub const TIMER_CATEGORY: &str = "timer";

/// Result of one user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Input was rejected; the cue is already part of the rendered view.
    Rejected(InputError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// View preferences persisted next to the entry list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPrefs {
    pub filter: Filter,
}

pub struct Controller<K: KvStore, I: IdGenerator, C: Clock> {
    config: AppConfig,
    store: Store<I, C>,
    persistence: PersistenceAdapter<K>,
    renderer: Renderer,
    prefs_key: StorageKey,
    view: ViewState,
    timer: Timer,
    timer_label: String,
    reset: ScheduledReset,
    reset_delay_ms: i64,
    output: String,
}

impl<K: KvStore, I: IdGenerator, C: Clock> Controller<K, I, C> {
    /// Startup: load, initialize the store, render.
    pub fn start(config: AppConfig, kv: K, ids: I, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let key = config.storage_key()?;
        let prefs_key = config.prefs_key()?;
        let renderer = Renderer::new(config.app_name.as_str(), config.utc_offset()?);

        let persistence = PersistenceAdapter::new(kv, key);
        let entries = persistence.load();
        let prefs: ViewPrefs = persistence.load_record(&prefs_key);
        info!(
            "event=app_start module=controller status=ok key={} count={}",
            persistence.key(),
            entries.len()
        );

        let store = Store::with_entries(entries, ids, clock, config.insert_position);
        let view = ViewState {
            filter: prefs.filter,
            sort_order: config.sort_order,
            cue: None,
        };

        let mut controller = Self {
            config,
            store,
            persistence,
            renderer,
            prefs_key,
            view,
            timer: Timer::new(),
            timer_label: DEFAULT_TIMER_LABEL.to_string(),
            reset: ScheduledReset::default(),
            reset_delay_ms: DEFAULT_RESET_DELAY_MS,
            output: String::new(),
        };
        controller.render();
        Ok(controller)
    }

    pub fn with_reset_delay(mut self, delay_ms: i64) -> Self {
        self.reset_delay_ms = delay_ms.max(0);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn entries(&self) -> &[Entry] {
        self.store.entries()
    }

    pub fn store(&self) -> &Store<I, C> {
        &self.store
    }

    pub fn persistence(&self) -> &PersistenceAdapter<K> {
        &self.persistence
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// Latest rendered markup.
    pub fn view(&self) -> &str {
        &self.output
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn pending_reset(&self) -> &ScheduledReset {
        &self.reset
    }

    /// Form submit: creates one entry.
    pub fn submit(&mut self, fields: EntryFields) -> Outcome {
        let text = match validate_text(&fields.text, self.config.max_text_chars) {
            Ok(text) => text,
            Err(err) => return self.reject("add", err),
        };
        if let Err(err) = validate_window(fields.started_at, fields.stopped_at) {
            return self.reject("add", err);
        }

        let added = self.store.insert(EntryFields {
            text,
            category: normalize_category(fields.category.as_deref()),
            ..fields
        })
        .map(|_| ());
        match added {
            Ok(_) => self.commit("add"),
            Err(err) => self.reject("add", unrecorded(err)),
        }
    }

    /// Replaces the text of one entry.
    pub fn edit_text(&mut self, id: &EntryId, text: &str) -> Outcome {
        self.update(id, EntryPatch::text(text))
    }

    pub fn update(&mut self, id: &EntryId, mut patch: EntryPatch) -> Outcome {
        if let Some(text) = patch.text.take() {
            match validate_text(&text, self.config.max_text_chars) {
                Ok(text) => patch.text = Some(text),
                Err(err) => return self.reject("update", err),
            }
        }
        if let Some(category) = patch.category.take() {
            patch.category = Some(normalize_category(category.as_deref()));
        }
        if let Some(current) = self.store.get(id) {
            let next = current.patched(&patch);
            if let Err(err) = validate_window(next.started_at, next.stopped_at) {
                return self.reject("update", err);
            }
        }

        self.store.update(id, &patch);
        self.commit("update")
    }

    pub fn remove(&mut self, id: &EntryId) -> Outcome {
        self.store.remove(id);
        self.commit("remove")
    }

    pub fn toggle(&mut self, id: &EntryId, flag: EntryFlag) -> Outcome {
        self.store.toggle(id, flag);
        self.commit("toggle")
    }

    /// Whole-list reset.
    pub fn clear(&mut self) -> Outcome {
        self.store.clear();
        self.commit("clear")
    }

    /// Switches the filter tab and remembers it across sessions.
    pub fn set_filter(&mut self, filter: Filter) {
        self.view.filter = filter;
        let prefs = ViewPrefs {
            filter: self.view.filter.clone(),
        };
        self.persistence.save_record(&self.prefs_key, &prefs);
        self.render();
    }

    /// Dismisses the inline cue without other changes.
    pub fn dismiss_cue(&mut self) {
        if self.view.cue.take().is_some() {
            self.render();
        }
    }

    /// Starts a stopwatch, or a countdown when `target_ms` is set.
    pub fn start_timer(&mut self, label: &str, target_ms: Option<i64>) -> Result<(), TimerError> {
        let now = self.store.clock().now_ms();
        self.timer.start(now, target_ms)?;
        self.timer_label = validate_text(label, self.config.max_text_chars)
            .unwrap_or_else(|_| DEFAULT_TIMER_LABEL.to_string());
        self.reset.cancel();
        self.log_timer("start");
        Ok(())
    }

    pub fn pause_timer(&mut self) -> Result<(), TimerError> {
        let now = self.store.clock().now_ms();
        self.timer.pause(now)?;
        self.log_timer("pause");
        Ok(())
    }

    pub fn resume_timer(&mut self) -> Result<(), TimerError> {
        let now = self.store.clock().now_ms();
        self.timer.resume(now)?;
        self.log_timer("resume");
        Ok(())
    }

    /// Stops the timer and records the run as an entry.
    pub fn finish_timer(&mut self) -> Result<TimerRun, TimerError> {
        let now = self.store.clock().now_ms();
        let run = self.timer.finish(now)?;
        self.record_run(run);
        Ok(run)
    }

    /// Returns a completed timer to idle and clears its pending reset.
    pub fn acknowledge_timer(&mut self) -> Result<(), TimerError> {
        self.timer.acknowledge()?;
        self.reset.cancel();
        self.log_timer("acknowledge");
        Ok(())
    }

    /// Advances time-driven state: countdown completion and the scheduled
    /// reset. Returns the run completed by this tick, if any.
    pub fn tick(&mut self) -> Option<TimerRun> {
        let now = self.store.clock().now_ms();
        let completed = self.timer.poll(now);
        if let Some(run) = completed {
            self.record_run(run);
        }

        if self.reset.poll(now) && self.timer.phase() == TimerPhase::Completed {
            let _ = self.timer.acknowledge();
            self.log_timer("auto_reset");
        }
        completed
    }

    fn record_run(&mut self, run: TimerRun) {
        let added = self.store.insert(EntryFields {
            text: self.timer_label.clone(),
            category: Some(TIMER_CATEGORY.to_string()),
            started_at: Some(run.started_at),
            stopped_at: Some(run.stopped_at),
        })
        .map(|_| ());
        self.reset.schedule(run.stopped_at, self.reset_delay_ms);
        self.log_timer("complete");
        match added {
            Ok(_) => {
                self.commit("timer_record");
            }
            Err(err) => {
                warn!(
                    "event=controller_action module=controller status=error action=timer_record error={err}"
                );
                self.render();
            }
        }
    }

    fn reject(&mut self, action: &'static str, err: InputError) -> Outcome {
        debug!(
            "event=controller_action module=controller status=rejected action={action} error_code={}",
            err.code()
        );
        self.view.cue = Some(err.cue());
        self.render();
        Outcome::Rejected(err)
    }

    fn commit(&mut self, action: &'static str) -> Outcome {
        self.view.cue = None;
        self.persistence.save(self.store.entries());
        self.render();
        debug!(
            "event=controller_action module=controller status=ok action={action} count={}",
            self.store.len()
        );
        Outcome::Applied
    }

    fn render(&mut self) {
        self.output = self.renderer.render(self.store.entries(), &self.view);
    }

    fn log_timer(&self, transition: &'static str) {
        debug!(
            "event=timer_transition module=controller status=ok transition={transition} phase={}",
            self.timer.phase()
        );
    }
}

fn unrecorded(err: AddError) -> InputError {
    match err {
        AddError::Invalid(EntryValidationError::InvalidTimeWindow { start, stop }) => {
            InputError::InvalidTimeWindow { start, stop }
        }
        AddError::Invalid(EntryValidationError::EmptyId) | AddError::IdExhausted { .. } => {
            InputError::IdUnavailable
        }
    }
}
