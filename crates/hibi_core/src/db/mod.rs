//! SQLite file behind `SqliteKv`.
//!
//! # Responsibility
//! - Open the database a set of apps shares and bring its `kv` table to the
//!   schema this build writes.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No record is read or written before the schema is current.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use migrations::KvSchema;
pub use open::open_db;

/// Where a key-value database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    Memory,
}

impl DbTarget {
    /// Short label for log lines.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

impl Display for DbTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}
