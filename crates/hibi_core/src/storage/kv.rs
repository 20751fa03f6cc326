//! Key-value persistence contract and the in-memory implementation.
//!
//! # Responsibility
//! - Define the minimal string-to-string storage surface apps persist into.
//! - Provide a quota-aware in-memory backend for tests and ephemeral runs.
//!
//! # Invariants
//! - A failed `set` leaves the previous value untouched.
//! - `keys` returns keys in ascending order.

use crate::db::DbTarget;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

#[derive(Debug)]
pub enum KvError {
    /// Write would exceed the backend's byte quota.
    QuotaExceeded { key: String, needed: usize, quota: usize },
    /// The database file could not be opened or configured.
    Open {
        target: DbTarget,
        source: rusqlite::Error,
    },
    /// The `kv` schema is not the one this build writes.
    SchemaMismatch { found: u32, expected: u32 },
    Sqlite(rusqlite::Error),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded { key, needed, quota } => write!(
                f,
                "storage quota exceeded writing `{key}`: needs {needed} bytes, quota {quota}"
            ),
            Self::Open { target, source } => {
                write!(f, "failed to open kv database `{target}`: {source}")
            }
            Self::SchemaMismatch { found, expected } if found > expected => write!(
                f,
                "kv schema v{found} was written by a newer build; this build supports v{expected}"
            ),
            Self::SchemaMismatch { found, expected } => {
                write!(f, "kv schema v{found} is not upgraded to v{expected}")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::QuotaExceeded { .. } | Self::SchemaMismatch { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Local string key-value storage, the equivalent of a browser's local store.
pub trait KvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> KvResult<()>;
    fn remove(&mut self, key: &str) -> KvResult<()>;
    fn keys(&self) -> KvResult<Vec<String>>;
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        (**self).keys()
    }
}

/// In-memory store with an optional total byte quota (keys + values).
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    values: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            values: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes currently held, counting keys and values.
    pub fn used_bytes(&self) -> usize {
        self.values.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self.values.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(KvError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        self.values.remove(key);
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvError, KvStore, MemoryKv};

    #[test]
    fn set_get_remove() {
        let mut kv = MemoryKv::new();
        kv.set("todo_v1", "[]").expect("set");
        assert_eq!(kv.get("todo_v1").expect("get").as_deref(), Some("[]"));

        kv.remove("todo_v1").expect("remove");
        assert_eq!(kv.get("todo_v1").expect("get"), None);
        kv.remove("todo_v1").expect("removing a missing key is fine");
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let mut kv = MemoryKv::with_quota(16);
        kv.set("k", "small").expect("fits");

        let err = kv.set("k", "much too large for quota").unwrap_err();
        assert!(matches!(err, KvError::QuotaExceeded { quota: 16, .. }));
        assert_eq!(kv.get("k").expect("get").as_deref(), Some("small"));
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        let mut kv = MemoryKv::with_quota(10);
        kv.set("k", "123456789").expect("exactly at quota");
        kv.set("k", "987654321").expect("replacing same size still fits");
        assert_eq!(kv.used_bytes(), 10);
    }

    #[test]
    fn keys_are_sorted() {
        let mut kv = MemoryKv::new();
        kv.set("b_v1", "[]").expect("set");
        kv.set("a_v1", "[]").expect("set");
        assert_eq!(kv.keys().expect("keys"), vec!["a_v1", "b_v1"]);
    }
}
