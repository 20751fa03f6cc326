//! Local key-value persistence for app records.
//!
//! # Responsibility
//! - Define the key-value contract (`KvStore`) and its backends.
//! - Translate entry lists and settings records to/from stored JSON strings.
//!
//! # Invariants
//! - Every record lives under a versioned `<appName>_v<N>` key.
//! - Reads and writes through `PersistenceAdapter` never surface errors.

pub mod adapter;
pub mod key;
pub mod kv;
pub mod sqlite_kv;

pub use adapter::PersistenceAdapter;
pub use key::{StorageKey, StorageKeyError};
pub use kv::{KvError, KvResult, KvStore, MemoryKv};
pub use sqlite_kv::SqliteKv;
