//! In-memory owner of one app's entry list.
//!
//! # Responsibility
//! - Hold the canonical ordered entry list for a session.
//! - Apply add/remove/update/toggle/clear mutations.
//!
//! # Invariants
//! - Ids come only from the injected `IdGenerator`; an id already present in
//!   the list is never handed out twice.
//! - Timestamps come only from the injected `Clock`.
//! - "Entry not found" is a no-op, not an error.
//! - Every stored entry passes `Entry::validate`; a mutation that would break
//!   it is dropped.

use crate::clock::Clock;
use crate::config::InsertPosition;
use crate::model::entry::{
    Entry, EntryFields, EntryFlag, EntryId, EntryPatch, EntryValidationError,
};
use crate::model::id::IdGenerator;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attempts before giving up on a generator that keeps colliding.
const MAX_ID_ATTEMPTS: usize = 8;

/// Why `Store::insert` left the list unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddError {
    /// The generator only produced blank or already-used ids.
    IdExhausted { attempts: usize },
    Invalid(EntryValidationError),
}

impl Display for AddError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdExhausted { attempts } => {
                write!(f, "no unused id after {attempts} attempts")
            }
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AddError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IdExhausted { .. } => None,
            Self::Invalid(err) => Some(err),
        }
    }
}

pub struct Store<I: IdGenerator, C: Clock> {
    entries: Vec<Entry>,
    ids: I,
    clock: C,
    insert_position: InsertPosition,
    last_created: Option<EntryId>,
}

impl<I: IdGenerator, C: Clock> Store<I, C> {
    pub fn new(ids: I, clock: C, insert_position: InsertPosition) -> Self {
        Self::with_entries(Vec::new(), ids, clock, insert_position)
    }

    /// Re-hydrates a store from a previously loaded list.
    pub fn with_entries(
        entries: Vec<Entry>,
        ids: I,
        clock: C,
        insert_position: InsertPosition,
    ) -> Self {
        Self {
            entries,
            ids,
            clock,
            insert_position,
            last_created: None,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Id of the entry created by the most recent successful `add`.
    pub fn last_created(&self) -> Option<&EntryId> {
        self.last_created.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Creates an entry with a fresh id and the current time.
    pub fn add(&mut self, fields: EntryFields) -> &[Entry] {
        let _ = self.insert(fields);
        &self.entries
    }

    /// Like `add`, but reports the created entry or why nothing was added.
    pub fn insert(&mut self, fields: EntryFields) -> Result<&Entry, AddError> {
        let Some(id) = self.fresh_id() else {
            warn!("event=store_add module=store status=error error_code=id_exhausted");
            return Err(AddError::IdExhausted {
                attempts: MAX_ID_ATTEMPTS,
            });
        };

        let entry = Entry::from_fields(id, self.clock.now_ms(), fields);
        if let Err(err) = entry.validate() {
            warn!("event=store_add module=store status=rejected error={err}");
            return Err(AddError::Invalid(err));
        }

        self.last_created = Some(entry.id.clone());
        let index = match self.insert_position {
            InsertPosition::Append => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
            InsertPosition::Prepend => {
                self.entries.insert(0, entry);
                0
            }
        };
        debug!(
            "event=store_add module=store status=ok count={}",
            self.entries.len()
        );
        Ok(&self.entries[index])
    }

    pub fn remove(&mut self, id: &EntryId) -> &[Entry] {
        self.entries.retain(|entry| &entry.id != id);
        &self.entries
    }

    pub fn update(&mut self, id: &EntryId, patch: &EntryPatch) -> &[Entry] {
        if let Some(entry) = self.entries.iter_mut().find(|entry| &entry.id == id) {
            let next = entry.patched(patch);
            match next.validate() {
                Ok(()) => *entry = next,
                Err(err) => warn!("event=store_update module=store status=rejected error={err}"),
            }
        }
        &self.entries
    }

    pub fn toggle(&mut self, id: &EntryId, flag: EntryFlag) -> &[Entry] {
        if let Some(entry) = self.entries.iter_mut().find(|entry| &entry.id == id) {
            entry.toggle(flag);
        }
        &self.entries
    }

    /// Whole-list reset.
    pub fn clear(&mut self) -> &[Entry] {
        self.entries.clear();
        self.last_created = None;
        &self.entries
    }

    fn fresh_id(&self) -> Option<EntryId> {
        (0..MAX_ID_ATTEMPTS)
            .map(|_| self.ids.next_id())
            .find(|id| !id.as_str().trim().is_empty() && self.get(id).is_none())
    }
}
