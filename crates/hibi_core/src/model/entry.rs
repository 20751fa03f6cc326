//! Entry domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by todo/mood/timer-log projections.
//! - Provide patch and flag helpers used by the store.
//!
//! # Invariants
//! - `id` is never empty and never reassigned after creation.
//! - `stopped_at` is not earlier than `started_at` when both are set.
//! - The persisted JSON shape is flat and uses camelCase field names.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque unique identifier of one entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Wraps a raw id string without validation.
    ///
    /// Validation happens in `Entry::validate`, so a blank id can exist here
    /// but never inside a stored entry.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Boolean fields that a user can flip with one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFlag {
    /// Completion flag of todo-like entries.
    Done,
    /// Keeps the entry at the top of the rendered list.
    Pinned,
}

/// Model validation errors for entry invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyId,
    InvalidTimeWindow { start: i64, stop: i64 },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "entry id must not be empty"),
            Self::InvalidTimeWindow { start, stop } => {
                write!(f, "stopped_at ({stop}) must be >= started_at ({start})")
            }
        }
    }
}

impl Error for EntryValidationError {}

/// Canonical persisted record.
///
/// Every app uses this one shape; fields that a given app never touches stay
/// at their defaults, and unset optional fields are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEntry")]
pub struct Entry {
    pub id: EntryId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// User-entered label.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub done: bool,
    pub pinned: bool,
    /// Unix epoch milliseconds. Set by timer-style apps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    /// Unix epoch milliseconds. Must be >= `started_at` when both are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<i64>,
}

/// Deserialization shadow of `Entry`; converted through `validate`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: EntryId,
    created_at: i64,
    text: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    started_at: Option<i64>,
    #[serde(default)]
    stopped_at: Option<i64>,
}

impl TryFrom<RawEntry> for Entry {
    type Error = EntryValidationError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let entry = Entry {
            id: raw.id,
            created_at: raw.created_at,
            text: raw.text,
            category: raw.category,
            done: raw.done,
            pinned: raw.pinned,
            started_at: raw.started_at,
            stopped_at: raw.stopped_at,
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl Entry {
    /// Builds an entry from user fields plus a generated id and timestamp.
    pub fn from_fields(id: EntryId, created_at: i64, fields: EntryFields) -> Self {
        Self {
            id,
            created_at,
            text: fields.text,
            category: fields.category,
            done: false,
            pinned: false,
            started_at: fields.started_at,
            stopped_at: fields.stopped_at,
        }
    }

    /// Checks model invariants.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(EntryValidationError::EmptyId);
        }
        if let (Some(start), Some(stop)) = (self.started_at, self.stopped_at) {
            if stop < start {
                return Err(EntryValidationError::InvalidTimeWindow { start, stop });
            }
        }
        Ok(())
    }

    pub fn flag(&self, flag: EntryFlag) -> bool {
        match flag {
            EntryFlag::Done => self.done,
            EntryFlag::Pinned => self.pinned,
        }
    }

    pub fn toggle(&mut self, flag: EntryFlag) {
        match flag {
            EntryFlag::Done => self.done = !self.done,
            EntryFlag::Pinned => self.pinned = !self.pinned,
        }
    }

    /// Elapsed milliseconds between start and stop, when both are recorded.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => Some(stop - start),
            _ => None,
        }
    }

    /// Returns a copy with `patch` merged in. `id` and `created_at` never change.
    pub fn patched(&self, patch: &EntryPatch) -> Self {
        let mut next = self.clone();
        if let Some(text) = &patch.text {
            next.text = text.clone();
        }
        if let Some(category) = &patch.category {
            next.category = category.clone();
        }
        if let Some(done) = patch.done {
            next.done = done;
        }
        if let Some(pinned) = patch.pinned {
            next.pinned = pinned;
        }
        if let Some(started_at) = patch.started_at {
            next.started_at = started_at;
        }
        if let Some(stopped_at) = patch.stopped_at {
            next.stopped_at = stopped_at;
        }
        next
    }
}

/// User-editable fields supplied when creating an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub text: String,
    pub category: Option<String>,
    pub started_at: Option<i64>,
    pub stopped_at: Option<i64>,
}

impl EntryFields {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Partial update merged into an existing entry.
///
/// Outer `None` means "leave unchanged"; for optional fields the inner
/// `None` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub text: Option<String>,
    pub category: Option<Option<String>>,
    pub done: Option<bool>,
    pub pinned: Option<bool>,
    pub started_at: Option<Option<i64>>,
    pub stopped_at: Option<Option<i64>>,
}

impl EntryPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}
