//! Entry id generation strategies.
//!
//! The store never builds ids itself; it asks an injected `IdGenerator`.

use super::entry::EntryId;
use std::cell::Cell;
use uuid::Uuid;

/// Source of fresh, unique entry ids.
pub trait IdGenerator {
    fn next_id(&self) -> EntryId;
}

/// Random UUID v4 ids, the production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> EntryId {
        EntryId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic `<prefix>-<n>` ids for tests and replays.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("entry")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> EntryId {
        let n = self.next.get();
        self.next.set(n + 1);
        EntryId::new(format!("{}-{n}", self.prefix))
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for &T {
    fn next_id(&self) -> EntryId {
        (**self).next_id()
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for Box<T> {
    fn next_id(&self) -> EntryId {
        (**self).next_id()
    }
}
