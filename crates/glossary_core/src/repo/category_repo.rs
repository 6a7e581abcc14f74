//! Category repository.
//!
//! # Responsibility
//! - Resolve categories for term hydration and filters.
//! - Provide simple category CRUD for admin callers.
//!
//! # Invariants
//! - Category names are unique; violations surface as `DuplicateName`.
//! - Deleting a category removes its term links (FK cascade) but never terms.

use crate::model::category::{Category, CategoryDraft, CategoryId};
use crate::repo::ensure_tables;
use crate::repo::term_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{ffi, params, Connection, Row};

/// Repository interface for the category collaborator.
pub trait CategoryRepository {
    fn resolve_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// All categories ordered by name.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn create_category(&self, draft: &CategoryDraft) -> RepoResult<CategoryId>;
    fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> RepoResult<()>;
    /// Deletes a category and its links. Missing ids are a no-op.
    fn delete_category(&self, id: CategoryId) -> RepoResult<bool>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["categories", "term_categories"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn resolve_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, color
             FROM categories
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, color
             FROM categories
             ORDER BY name ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn create_category(&self, draft: &CategoryDraft) -> RepoResult<CategoryId> {
        let (name, description, color) = draft.normalized()?;
        self.conn
            .execute(
                "INSERT INTO categories (name, description, color) VALUES (?1, ?2, ?3);",
                params![name.as_str(), description.as_str(), color.as_str()],
            )
            .map_err(|err| map_unique_violation(err, &name))?;

        let id = self.conn.last_insert_rowid();
        info!(
            "event=category_create module=repo status=ok category_id={}",
            id
        );
        Ok(id)
    }

    fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> RepoResult<()> {
        let (name, description, color) = draft.normalized()?;
        let changed = self
            .conn
            .execute(
                "UPDATE categories
                 SET name = ?2, description = ?3, color = ?4
                 WHERE id = ?1;",
                params![id, name.as_str(), description.as_str(), color.as_str()],
            )
            .map_err(|err| map_unique_violation(err, &name))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category",
                id,
            });
        }
        Ok(())
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        info!(
            "event=category_delete module=repo status=ok category_id={} deleted={}",
            id,
            changed > 0
        );
        Ok(changed > 0)
    }
}

/// Decodes a row selecting `id, name, description, color`.
pub(crate) fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
    })
}

fn map_unique_violation(err: rusqlite::Error, name: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateName(name.to_string())
        }
        _ => err.into(),
    }
}
