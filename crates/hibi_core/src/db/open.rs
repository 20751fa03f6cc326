//! Connection bootstrap for the key-value database.
//!
//! # Invariants
//! - Returned connections have a current `kv` schema.
//! - Every open emits one `db_open` start event and one ok/error event.

use super::migrations::{upgrade_kv_schema, KvSchema};
use super::DbTarget;
use crate::storage::kv::{KvError, KvResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the database at `target` and upgrades its schema.
pub fn open_db(target: &DbTarget) -> KvResult<(Connection, KvSchema)> {
    let started_at = Instant::now();
    let mode = target.mode();
    info!("event=db_open module=db status=start mode={mode}");

    match connect(target) {
        Ok(opened) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} schema_from={} schema_to={}",
                started_at.elapsed().as_millis(),
                opened.1.found,
                opened.1.current
            );
            Ok(opened)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn connect(target: &DbTarget) -> KvResult<(Connection, KvSchema)> {
    let opened = match target {
        DbTarget::File(path) => Connection::open(path),
        DbTarget::Memory => Connection::open_in_memory(),
    };
    let mut conn = opened.map_err(|source| KvError::Open {
        target: target.clone(),
        source,
    })?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|source| KvError::Open {
            target: target.clone(),
            source,
        })?;

    let schema = upgrade_kv_schema(&mut conn)?;
    Ok((conn, schema))
}
