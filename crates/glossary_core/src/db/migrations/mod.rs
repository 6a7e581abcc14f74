//! Embedded schema migrations for the glossary store.
//!
//! # Responsibility
//! - Keep the ordered list of SQL scripts compiled into the binary.
//! - Bring a connection from its recorded schema version up to the latest.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one per script.
//! - All pending scripts and the `PRAGMA user_version` bump share one
//!   transaction.
//! - `term_history` never cascades from `terms`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "term_history",
        sql: include_str!("0002_term_history.sql"),
    },
];

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Upgrades `conn` to [`latest_version`] and returns the versions applied.
///
/// An up-to-date database yields an empty list without opening a transaction.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Migration` naming the first script that failed; nothing is committed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let from_version = read_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        run_migration(&tx, migration)?;
    }
    tx.commit()?;

    let applied: Vec<u32> = pending.iter().map(|migration| migration.version).collect();
    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        from_version,
        latest,
        applied.len()
    );
    Ok(applied)
}

fn run_migration(tx: &Transaction<'_>, migration: &Migration) -> DbResult<()> {
    tx.execute_batch(migration.sql)
        .and_then(|()| {
            tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
        })
        .map_err(|source| DbError::Migration {
            version: migration.version,
            name: migration.name,
            source,
        })
}

fn read_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
