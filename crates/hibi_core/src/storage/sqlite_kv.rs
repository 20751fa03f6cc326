//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist app records into the `kv` table of a migrated database.
//!
//! # Invariants
//! - Construction rejects connections whose schema is not migrated.
//! - `set` is an upsert; the previous value survives a failed write.

use super::kv::{KvError, KvResult, KvStore};
use crate::db::migrations::{kv_schema_version, latest_version};
use crate::db::{open_db, DbTarget, KvSchema};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteKv {
    conn: Connection,
    schema: KvSchema,
}

impl SqliteKv {
    /// Wraps a connection whose `kv` schema is already current.
    pub fn try_new(conn: Connection) -> KvResult<Self> {
        let version = kv_schema_version(&conn)?;
        if version != latest_version() {
            return Err(KvError::SchemaMismatch {
                found: version,
                expected: latest_version(),
            });
        }
        Ok(Self {
            conn,
            schema: KvSchema {
                found: version,
                current: version,
            },
        })
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Self::open_target(&DbTarget::File(path.as_ref().to_path_buf()))
    }

    pub fn open_in_memory() -> KvResult<Self> {
        Self::open_target(&DbTarget::Memory)
    }

    fn open_target(target: &DbTarget) -> KvResult<Self> {
        let (conn, schema) = open_db(target)?;
        if schema.upgraded() {
            info!(
                "event=kv_open module=storage status=upgraded mode={} schema_from={} schema_to={}",
                target.mode(),
                schema.found,
                schema.current
            );
        }
        Ok(Self { conn, schema })
    }

    /// Schema versions seen when this store was opened.
    pub fn schema(&self) -> KvSchema {
        self.schema
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get::<_, String>(0)?);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKv;
    use crate::storage::kv::{KvError, KvStore};
    use rusqlite::Connection;

    #[test]
    fn set_overwrites_existing_value() {
        let mut kv = SqliteKv::open_in_memory().expect("open");
        kv.set("todo_v1", "[]").expect("first set");
        kv.set("todo_v1", "[1]").expect("second set");

        assert_eq!(kv.get("todo_v1").expect("get").as_deref(), Some("[1]"));
        assert_eq!(kv.keys().expect("keys"), vec!["todo_v1"]);
    }

    #[test]
    fn in_memory_open_reports_the_upgrade() {
        let kv = SqliteKv::open_in_memory().expect("open");
        assert_eq!(kv.schema().found, 0);
        assert!(kv.schema().upgraded());
    }

    #[test]
    fn rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().expect("raw connection");
        let result = SqliteKv::try_new(conn);
        assert!(matches!(
            result,
            Err(KvError::SchemaMismatch {
                found: 0,
                expected: 1
            })
        ));
    }
}
