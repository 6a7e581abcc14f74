//! Term aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the `Term` aggregate: term row, synonym set and category links.
//! - Diff stored state against desired state and append audit rows.
//! - Hydrate terms with synonyms, categories and creator name on read.
//!
//! # Invariants
//! - Every write runs in one immediate transaction; term row, synonyms, links
//!   and history rows commit together or not at all.
//! - Synonym and category-link sets are replaced wholesale on update.
//! - Category link changes never produce history rows.
//! - `updated_at` strictly increases on every successful update.
//! - Deleting a missing term is a no-op without a history row.

use crate::db::{now_epoch_ms, DbError};
use crate::model::category::{CategoryId, CategoryValidationError};
use crate::model::history::NewHistoryEntry;
use crate::model::term::{Term, TermDraft, TermFields, TermId, TermValidationError};
use crate::model::user::{UserId, UserValidationError};
use crate::model::ValidationError;
use crate::repo::category_repo::parse_category_row;
use crate::repo::ensure_tables;
use crate::repo::history_repo::append_history;
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const TERM_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.name AS name,
    t.definition AS definition,
    t.example AS example,
    t.created_by AS created_by,
    u.username AS creator_name,
    t.created_at AS created_at,
    t.updated_at AS updated_at
FROM terms t
LEFT JOIN users u ON u.id = t.created_by";

const REQUIRED_TABLES: &[&str] = &[
    "users",
    "categories",
    "terms",
    "synonyms",
    "term_categories",
    "term_history",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for glossary persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    NotFound { entity: &'static str, id: i64 },
    DuplicateName(String),
    MissingRequiredTable(&'static str),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateName(name) => write!(f, "name already in use: `{name}`"),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::DuplicateName(_)
            | Self::MissingRequiredTable(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TermValidationError> for RepoError {
    fn from(value: TermValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<CategoryValidationError> for RepoError {
    fn from(value: CategoryValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermListQuery {
    /// Case-insensitive substring matched against name, definition and
    /// synonyms, whitespace included. Empty disables the filter.
    pub search_text: String,
    /// Only terms linked to this category.
    pub category_id: Option<CategoryId>,
}

impl TermListQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Repository interface for the term aggregate.
pub trait TermRepository {
    /// Lists hydrated terms ordered by name.
    fn list_terms(&self, query: &TermListQuery) -> RepoResult<Vec<Term>>;
    /// Gets one hydrated term; `None` when absent.
    fn get_term(&self, id: TermId) -> RepoResult<Option<Term>>;
    /// Creates a term with synonyms and links and records one `create` entry.
    fn create_term(
        &mut self,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> RepoResult<TermId>;
    /// Replaces a term's state and records one `update` entry per changed
    /// field. Returns the number of entries written.
    fn update_term(
        &mut self,
        id: TermId,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> RepoResult<usize>;
    /// Records a `delete` entry and removes the term. Returns `false` when the
    /// term did not exist.
    fn delete_term(&mut self, id: TermId, editor_id: UserId) -> RepoResult<bool>;
}

/// SQLite-backed term aggregate repository.
pub struct SqliteTermRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTermRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    /// Borrows the underlying connection for read-side collaborators.
    pub fn connection(&self) -> &Connection {
        &*self.conn
    }

    fn begin_write(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl TermRepository for SqliteTermRepository<'_> {
    fn list_terms(&self, query: &TermListQuery) -> RepoResult<Vec<Term>> {
        let mut sql = format!("{TERM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.search_text.is_empty() {
            sql.push_str(
                " AND (
                    t.name LIKE ? ESCAPE '\\'
                    OR t.definition LIKE ? ESCAPE '\\'
                    OR EXISTS (
                        SELECT 1
                        FROM synonyms s
                        WHERE s.term_id = t.id
                          AND s.synonym_name LIKE ? ESCAPE '\\'
                    )
                )",
            );
            let pattern = like_contains_pattern(&query.search_text);
            for _ in 0..3 {
                bind_values.push(Value::Text(pattern.clone()));
            }
        }

        if let Some(category_id) = query.category_id {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM term_categories tc
                    WHERE tc.term_id = t.id
                      AND tc.category_id = ?
                )",
            );
            bind_values.push(Value::Integer(category_id));
        }

        sql.push_str(" ORDER BY t.name ASC, t.id ASC");

        let tx = self.conn.unchecked_transaction()?;
        let terms = {
            let mut stmt = tx.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut terms = Vec::new();
            while let Some(row) = rows.next()? {
                let mut term = parse_term_row(row)?;
                hydrate_term(&tx, &mut term)?;
                terms.push(term);
            }
            terms
        };
        tx.commit()?;

        Ok(terms)
    }

    fn get_term(&self, id: TermId) -> RepoResult<Option<Term>> {
        let tx = self.conn.unchecked_transaction()?;
        let term = load_term(&tx, id)?;
        tx.commit()?;
        Ok(term)
    }

    fn create_term(
        &mut self,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> RepoResult<TermId> {
        let started_at = Instant::now();
        let result = self.create_term_in_tx(draft, editor_id, category_ids);
        match &result {
            Ok(term_id) => info!(
                "event=term_create module=repo status=ok term_id={} editor_id={} history_rows=1 duration_ms={}",
                term_id,
                editor_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_write_error("term_create", None, editor_id, started_at, err),
        }
        result
    }

    fn update_term(
        &mut self,
        id: TermId,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> RepoResult<usize> {
        let started_at = Instant::now();
        let result = self.update_term_in_tx(id, draft, editor_id, category_ids);
        match &result {
            Ok(history_rows) => info!(
                "event=term_update module=repo status=ok term_id={} editor_id={} history_rows={} duration_ms={}",
                id,
                editor_id,
                history_rows,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_write_error("term_update", Some(id), editor_id, started_at, err),
        }
        result
    }

    fn delete_term(&mut self, id: TermId, editor_id: UserId) -> RepoResult<bool> {
        let started_at = Instant::now();
        let result = self.delete_term_in_tx(id, editor_id);
        match &result {
            Ok(deleted) => info!(
                "event=term_delete module=repo status=ok term_id={} editor_id={} deleted={} duration_ms={}",
                id,
                editor_id,
                deleted,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_write_error("term_delete", Some(id), editor_id, started_at, err),
        }
        result
    }
}

impl SqliteTermRepository<'_> {
    fn create_term_in_tx(
        &mut self,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> RepoResult<TermId> {
        let fields = draft.normalize()?;

        let tx = self.begin_write()?;
        let now = now_epoch_ms();
        tx.execute(
            "INSERT INTO terms (
                name,
                definition,
                example,
                created_by,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                fields.name.as_str(),
                fields.definition.as_str(),
                fields.example.as_deref(),
                editor_id,
                now,
            ],
        )?;
        let term_id = tx.last_insert_rowid();

        insert_synonyms(&tx, term_id, &fields.synonyms)?;
        insert_category_links(&tx, term_id, category_ids)?;
        append_history(
            &tx,
            &NewHistoryEntry::created(term_id, &fields.name, editor_id, now),
        )?;

        tx.commit()?;
        Ok(term_id)
    }

    fn update_term_in_tx(
        &mut self,
        id: TermId,
        draft: &TermDraft,
        editor_id: UserId,
        category_ids: &[CategoryId],
    ) -> RepoResult<usize> {
        let fields = draft.normalize()?;

        let tx = self.begin_write()?;
        let now = now_epoch_ms();
        let current = load_term(&tx, id)?.ok_or(RepoError::NotFound { entity: "term", id })?;
        let changes = TermFields::from(&current).diff(&fields);

        tx.execute(
            "UPDATE terms
             SET
                name = ?2,
                definition = ?3,
                example = ?4,
                updated_at = MAX(?5, updated_at + 1)
             WHERE id = ?1;",
            params![
                id,
                fields.name.as_str(),
                fields.definition.as_str(),
                fields.example.as_deref(),
                now,
            ],
        )?;

        tx.execute("DELETE FROM synonyms WHERE term_id = ?1;", [id])?;
        insert_synonyms(&tx, id, &fields.synonyms)?;

        tx.execute("DELETE FROM term_categories WHERE term_id = ?1;", [id])?;
        insert_category_links(&tx, id, category_ids)?;

        let history_rows = changes.len();
        for change in changes {
            append_history(
                &tx,
                &NewHistoryEntry::updated(id, &fields.name, change, editor_id, now),
            )?;
        }

        tx.commit()?;
        Ok(history_rows)
    }

    fn delete_term_in_tx(&mut self, id: TermId, editor_id: UserId) -> RepoResult<bool> {
        let tx = self.begin_write()?;
        let name: Option<String> = tx
            .query_row("SELECT name FROM terms WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(name) = name else {
            return Ok(false);
        };

        append_history(
            &tx,
            &NewHistoryEntry::deleted(id, &name, editor_id, now_epoch_ms()),
        )?;
        tx.execute("DELETE FROM terms WHERE id = ?1;", [id])?;

        tx.commit()?;
        Ok(true)
    }
}

/// Builds a `LIKE` pattern matching `text` literally anywhere in a value.
///
/// `\` is the escape character; callers must pair it with `ESCAPE '\'`.
pub fn like_contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn load_term(conn: &Connection, id: TermId) -> RepoResult<Option<Term>> {
    let mut stmt = conn.prepare(&format!("{TERM_SELECT_SQL} WHERE t.id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        let mut term = parse_term_row(row)?;
        hydrate_term(conn, &mut term)?;
        return Ok(Some(term));
    }
    Ok(None)
}

fn parse_term_row(row: &Row<'_>) -> RepoResult<Term> {
    let id: TermId = row.get("id")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name in terms.name for id {id}"
        )));
    }

    Ok(Term {
        id,
        name,
        definition: row.get("definition")?,
        example: row.get("example")?,
        created_by: row.get("created_by")?,
        creator_name: row.get("creator_name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        synonyms: Vec::new(),
        categories: Vec::new(),
    })
}

fn hydrate_term(conn: &Connection, term: &mut Term) -> RepoResult<()> {
    term.synonyms = load_synonyms(conn, term.id)?;

    let mut stmt = conn.prepare(
        "SELECT
            c.id AS id,
            c.name AS name,
            c.description AS description,
            c.color AS color
         FROM categories c
         INNER JOIN term_categories tc ON tc.category_id = c.id
         WHERE tc.term_id = ?1
         ORDER BY c.name ASC, c.id ASC;",
    )?;
    let mut rows = stmt.query([term.id])?;
    let mut categories = Vec::new();
    while let Some(row) = rows.next()? {
        categories.push(parse_category_row(row)?);
    }
    term.categories = categories;
    Ok(())
}

fn load_synonyms(conn: &Connection, term_id: TermId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT synonym_name
         FROM synonyms
         WHERE term_id = ?1
         ORDER BY synonym_name ASC;",
    )?;
    let mut rows = stmt.query([term_id])?;
    let mut synonyms = Vec::new();
    while let Some(row) = rows.next()? {
        synonyms.push(row.get(0)?);
    }
    Ok(synonyms)
}

fn insert_synonyms(
    conn: &Connection,
    term_id: TermId,
    synonyms: &BTreeSet<String>,
) -> RepoResult<()> {
    let mut stmt =
        conn.prepare("INSERT INTO synonyms (term_id, synonym_name) VALUES (?1, ?2);")?;
    for synonym in synonyms {
        stmt.execute(params![term_id, synonym.as_str()])?;
    }
    Ok(())
}

fn insert_category_links(
    conn: &Connection,
    term_id: TermId,
    category_ids: &[CategoryId],
) -> RepoResult<()> {
    let unique: BTreeSet<CategoryId> = category_ids.iter().copied().collect();
    let mut stmt =
        conn.prepare("INSERT INTO term_categories (term_id, category_id) VALUES (?1, ?2);")?;
    for category_id in unique {
        stmt.execute(params![term_id, category_id])?;
    }
    Ok(())
}

fn log_write_error(
    event: &str,
    term_id: Option<TermId>,
    editor_id: UserId,
    started_at: Instant,
    err: &RepoError,
) {
    let error_code = match err {
        RepoError::Validation(_) => "validation_failed",
        RepoError::NotFound { .. } => "not_found",
        _ => "persistence_failed",
    };
    let term_id = term_id.map_or_else(|| "none".to_string(), |id| id.to_string());
    error!(
        "event={} module=repo status=error term_id={} editor_id={} duration_ms={} error_code={}",
        event,
        term_id,
        editor_id,
        started_at.elapsed().as_millis(),
        error_code
    );
}
