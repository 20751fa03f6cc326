//! Schema steps for the `kv` table.
//!
//! # Invariants
//! - Step versions are strictly increasing, starting at 1.
//! - Pending steps run in one transaction; a failed step leaves the file at
//!   its previous version.

use crate::storage::kv::{KvError, KvResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct KvStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const KV_STEPS: &[KvStep] = &[KvStep {
    version: 1,
    name: "kv_table",
    sql: include_str!("0001_kv.sql"),
}];

/// Schema version this build reads and writes.
pub fn latest_version() -> u32 {
    KV_STEPS.last().map_or(0, |step| step.version)
}

/// What opening a database did to its `kv` schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KvSchema {
    /// Version found in the file before any step ran.
    pub found: u32,
    /// Version the file is at now.
    pub current: u32,
}

impl KvSchema {
    pub fn upgraded(&self) -> bool {
        self.found < self.current
    }
}

/// Brings `conn` to `latest_version()`.
///
/// A file written by a newer build is rejected untouched.
pub fn upgrade_kv_schema(conn: &mut Connection) -> KvResult<KvSchema> {
    let found = kv_schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(KvError::SchemaMismatch {
            found,
            expected: latest,
        });
    }

    let pending: Vec<&KvStep> = KV_STEPS.iter().filter(|step| step.version > found).collect();
    if pending.is_empty() {
        return Ok(KvSchema {
            found,
            current: found,
        });
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))?;
        info!(
            "event=kv_schema module=db status=applied version={} step={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    Ok(KvSchema {
        found,
        current: latest,
    })
}

pub(crate) fn kv_schema_version(conn: &Connection) -> KvResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, upgrade_kv_schema, KvSchema};
    use crate::storage::kv::KvError;
    use rusqlite::Connection;

    #[test]
    fn fresh_file_is_upgraded_then_left_alone() {
        let mut conn = Connection::open_in_memory().expect("connection");

        let first = upgrade_kv_schema(&mut conn).expect("upgrade");
        assert_eq!(
            first,
            KvSchema {
                found: 0,
                current: latest_version()
            }
        );
        assert!(first.upgraded());

        let second = upgrade_kv_schema(&mut conn).expect("no-op");
        assert!(!second.upgraded());
        assert_eq!(second.current, latest_version());
    }

    #[test]
    fn newer_file_is_rejected() {
        let mut conn = Connection::open_in_memory().expect("connection");
        conn.execute_batch("PRAGMA user_version = 42;").expect("pragma");

        assert!(matches!(
            upgrade_kv_schema(&mut conn),
            Err(KvError::SchemaMismatch { found: 42, .. })
        ));
    }
}
