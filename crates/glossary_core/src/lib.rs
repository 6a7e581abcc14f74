//! Core domain logic for the shared glossary store.
//! This crate is the single source of truth for term, synonym, category and
//! audit-trail invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{open_store, StoreConfig};
pub use db::{open_db, open_db_in_memory, seed_defaults, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryDraft, CategoryId, CategoryValidationError};
pub use model::history::{HistoryAction, HistoryEntry, HistoryId};
pub use model::term::{
    normalize_synonyms, render_synonyms, FieldChange, Term, TermDraft, TermField, TermFields,
    TermId, TermValidationError,
};
pub use model::user::{User, UserId, UserRole, UserValidationError};
pub use model::ValidationError;
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::history_repo::{HistoryRepository, SqliteHistoryRepository};
pub use repo::term_repo::{
    RepoError, RepoResult, SqliteTermRepository, TermListQuery, TermRepository,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::history_service::{HistoryListResult, HistoryService};
pub use service::term_service::{TermService, TermServiceError, TermUpdate};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
