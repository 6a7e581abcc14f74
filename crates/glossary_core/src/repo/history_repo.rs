//! Term history repository: append-only audit trail.
//!
//! # Responsibility
//! - Append audit rows inside a caller-owned transaction.
//! - Read audit rows globally or per term, annotated for display.
//!
//! # Invariants
//! - Rows are never updated or deleted by this module.
//! - Reads tolerate `term_id` and `changed_by` values that no longer resolve.
//! - Ordering is `changed_at DESC, id DESC`; ids come from `AUTOINCREMENT`, so a
//!   deleted term's id is never reassigned to a new term.

use crate::model::history::{
    HistoryAction, HistoryEntry, HistoryId, NewHistoryEntry, DELETED_TERM_PREFIX,
    UNKNOWN_USER_LABEL,
};
use crate::model::term::TermId;
use crate::repo::ensure_tables;
use crate::repo::term_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const HISTORY_SELECT_SQL: &str = "SELECT
    h.id AS id,
    h.term_id AS term_id,
    h.term_name AS term_name_snapshot,
    h.action_type AS action_type,
    h.field_name AS field_name,
    h.old_value AS old_value,
    h.new_value AS new_value,
    h.changed_by AS changed_by,
    h.changed_at AS changed_at,
    u.username AS changer_name,
    t.name AS current_term_name
FROM term_history h
LEFT JOIN users u ON u.id = h.changed_by
LEFT JOIN terms t ON t.id = h.term_id";

/// Repository interface for audit trail reads.
pub trait HistoryRepository {
    /// Newest-first entries across all terms, at most `limit` rows.
    fn list_all(&self, limit: u32) -> RepoResult<Vec<HistoryEntry>>;
    /// Newest-first entries for one term id, including deleted terms.
    fn list_by_term(&self, term_id: TermId) -> RepoResult<Vec<HistoryEntry>>;
}

/// SQLite-backed history reader.
pub struct SqliteHistoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHistoryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["term_history", "terms", "users"])?;
        Ok(Self { conn })
    }
}

impl HistoryRepository for SqliteHistoryRepository<'_> {
    fn list_all(&self, limit: u32) -> RepoResult<Vec<HistoryEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{HISTORY_SELECT_SQL}
             ORDER BY h.changed_at DESC, h.id DESC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_history_row(row)?);
        }
        Ok(entries)
    }

    fn list_by_term(&self, term_id: TermId) -> RepoResult<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HISTORY_SELECT_SQL}
             WHERE h.term_id = ?1
             ORDER BY h.changed_at DESC, h.id DESC;"
        ))?;
        let mut rows = stmt.query([term_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_history_row(row)?);
        }
        Ok(entries)
    }
}

/// Inserts one audit row using the caller's connection or transaction.
pub(crate) fn append_history(
    conn: &Connection,
    entry: &NewHistoryEntry,
) -> RepoResult<HistoryId> {
    conn.execute(
        "INSERT INTO term_history (
            term_id,
            term_name,
            action_type,
            field_name,
            old_value,
            new_value,
            changed_by,
            changed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            entry.term_id,
            entry.term_name.as_str(),
            entry.action.as_str(),
            entry.field_name.as_deref(),
            entry.old_value.as_deref(),
            entry.new_value.as_deref(),
            entry.changed_by,
            entry.changed_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<HistoryEntry> {
    let action_text: String = row.get("action_type")?;
    let action = HistoryAction::parse(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid action `{action_text}` in term_history.action_type"
        ))
    })?;

    let term_name_snapshot: String = row.get("term_name_snapshot")?;
    let term_name = match row.get::<_, Option<String>>("current_term_name")? {
        Some(current) => current,
        None => format!("{DELETED_TERM_PREFIX}{term_name_snapshot}"),
    };
    let changer_name = row
        .get::<_, Option<String>>("changer_name")?
        .unwrap_or_else(|| UNKNOWN_USER_LABEL.to_string());

    Ok(HistoryEntry {
        id: row.get("id")?,
        term_id: row.get("term_id")?,
        term_name_snapshot,
        action,
        field_name: row.get("field_name")?,
        old_value: row.get("old_value")?,
        new_value: row.get("new_value")?,
        changed_by: row.get("changed_by")?,
        changed_at: row.get("changed_at")?,
        changer_name,
        term_name,
    })
}
