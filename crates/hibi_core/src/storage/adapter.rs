//! Persistence adapter between an app's entry list and a key-value store.
//!
//! # Responsibility
//! - Serialize the entry list to JSON under one versioned key.
//! - Re-hydrate it on startup.
//!
//! # Invariants
//! - `load` never fails: absence, corrupt JSON, invalid entries, and duplicate
//!   ids all yield an empty list.
//! - `save` never fails: write errors are logged and swallowed.
//! - Logs carry keys, counts, and error kinds only, never entry text.

use super::key::StorageKey;
use super::kv::KvStore;
use crate::model::entry::Entry;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

pub struct PersistenceAdapter<K: KvStore> {
    kv: K,
    key: StorageKey,
}

impl<K: KvStore> PersistenceAdapter<K> {
    pub fn new(kv: K, key: StorageKey) -> Self {
        Self { kv, key }
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn into_inner(self) -> K {
        self.kv
    }

    /// Writes the full list. Best-effort.
    pub fn save(&mut self, entries: &[Entry]) {
        let key = self.key.to_string();
        let payload = match serde_json::to_string(entries) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("event=storage_save module=storage status=error key={key} error_code=serialize_failed error={err}");
                return;
            }
        };

        match self.kv.set(&key, &payload) {
            Ok(()) => debug!(
                "event=storage_save module=storage status=ok key={key} count={} bytes={}",
                entries.len(),
                payload.len()
            ),
            Err(err) => warn!(
                "event=storage_save module=storage status=error key={key} error_code=write_failed error={err}"
            ),
        }
    }

    /// Reads the list back, falling back to empty on any failure.
    pub fn load(&self) -> Vec<Entry> {
        let key = self.key.to_string();
        let raw = match self.kv.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=storage_load module=storage status=empty key={key}");
                return Vec::new();
            }
            Err(err) => {
                warn!("event=storage_load module=storage status=fallback key={key} error_code=read_failed error={err}");
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Vec<Entry>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=fallback key={key} error_code=parse_failed line={} column={}",
                    err.line(),
                    err.column()
                );
                return Vec::new();
            }
        };

        let mut seen = HashSet::with_capacity(entries.len());
        if !entries.iter().all(|entry| seen.insert(entry.id.clone())) {
            warn!("event=storage_load module=storage status=fallback key={key} error_code=duplicate_id");
            return Vec::new();
        }

        debug!(
            "event=storage_load module=storage status=ok key={key} count={}",
            entries.len()
        );
        entries
    }

    /// Reads a settings-like object record.
    ///
    /// Fields absent from the stored JSON are filled in only when `T` carries
    /// `#[serde(default)]`; anything unreadable yields `T::default()`.
    pub fn load_record<T: DeserializeOwned + Default>(&self, key: &StorageKey) -> T {
        let key = key.to_string();
        match self.kv.get(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("event=record_load module=storage status=fallback key={key} error_code=parse_failed error={err}");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(err) => {
                warn!("event=record_load module=storage status=fallback key={key} error_code=read_failed error={err}");
                T::default()
            }
        }
    }

    /// Writes a settings-like object record. Best-effort.
    pub fn save_record<T: Serialize>(&mut self, key: &StorageKey, record: &T) {
        let key = key.to_string();
        let result = serde_json::to_string(record)
            .map_err(|err| err.to_string())
            .and_then(|payload| self.kv.set(&key, &payload).map_err(|err| err.to_string()));
        if let Err(err) = result {
            warn!("event=record_save module=storage status=error key={key} error={err}");
        }
    }

    /// Keys left behind by older versions of this app, newest first.
    pub fn stale_keys(&self) -> Vec<StorageKey> {
        let keys = match self.kv.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!("event=stale_keys module=storage status=error error={err}");
                return Vec::new();
            }
        };

        let mut stale: Vec<StorageKey> = keys
            .iter()
            .filter_map(|raw| StorageKey::parse(raw).ok())
            .filter(|candidate| self.key.supersedes(candidate))
            .collect();
        stale.sort_by(|a, b| b.version().cmp(&a.version()));
        if !stale.is_empty() {
            info!(
                "event=stale_keys module=storage status=ok key={} stale_count={}",
                self.key,
                stale.len()
            );
        }
        stale
    }
}
