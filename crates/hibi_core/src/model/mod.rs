//! Domain model shared by every tracker app.
//!
//! # Responsibility
//! - Define the canonical entry shape persisted by each app.
//! - Define how fresh entry ids are produced.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId`.
//! - Deletion is a hard removal from the list; there are no tombstones.

pub mod entry;
pub mod id;
