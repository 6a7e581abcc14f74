//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//! - Own the unit-of-work boundary: every multi-statement write runs in one
//!   transaction that is committed or rolled back before the call returns.
//!
//! # Invariants
//! - Write paths validate model input before any SQL mutation.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateName`) in
//!   addition to DB transport errors.

pub mod category_repo;
pub mod history_repo;
pub mod term_repo;
pub mod user_repo;

use crate::repo::term_repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Fails with `MissingRequiredTable` unless every table in `tables` exists.
pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
